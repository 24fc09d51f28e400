pub mod backend_connection;
pub mod connector;

pub use backend_connection::BackendConnection;
pub use connector::connect_pool;
