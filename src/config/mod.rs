pub mod cli;
#[allow(clippy::module_inception)]
pub mod config;
pub mod pools;
pub mod types;

pub use cli::CliConfig;
pub use config::{BackendSettings, Config, ConfigError, DEFAULT_LISTEN_PORT};
pub use pools::{AddrError, BackendAddr, Pool};
pub use types::{ConnectStrategy, LogLevel, PoolRole};
