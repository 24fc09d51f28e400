pub mod backend;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod net;
pub mod protocol;

pub use config::{CliConfig, Config};
pub use errors::{ConnectError, SessionError};
pub use gateway::{Listener, ProxySession};
