pub mod listener;
pub mod session;

pub use listener::Listener;
pub use session::{ProxySession, SessionStats, handle_client};

// Gateway orchestration module; keep line framing in net/ and routing rules in protocol/.
