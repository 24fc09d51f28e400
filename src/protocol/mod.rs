//! Tracker line protocol: only the bits the proxy routes on.

pub mod failover;
pub mod response;

pub use failover::{FailoverDecision, FailoverPolicy};
pub use response::ResponseStatus;
