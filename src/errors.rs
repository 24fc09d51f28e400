use std::{io, time::Duration};
use thiserror::Error;

use crate::config::{BackendAddr, PoolRole};

// -----------------------------------------------------------------------------
// ----- ConnectError ----------------------------------------------------------

/// Why a pool could not hand out a backend connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("{role} pool has no members")]
    EmptyPool { role: PoolRole },

    #[error("connect to {addr} failed: {source}")]
    Unreachable { addr: BackendAddr, source: io::Error },

    #[error("connect to {addr} timed out after {after:?}")]
    TimedOut { addr: BackendAddr, after: Duration },

    #[error("all {tried} {role} candidates failed; last: {last}")]
    Exhausted {
        role: PoolRole,
        tried: usize,
        last: Box<ConnectError>,
    },
}

// -----------------------------------------------------------------------------
// ----- SessionError ----------------------------------------------------------

/// Anything that ends a proxy session early. Never escapes the session's task.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("tracker down in {role}: {source}")]
    BackendUnavailable { role: PoolRole, source: ConnectError },

    #[error("client i/o error: {source}")]
    Client { source: io::Error },

    #[error("{role} backend {peer} i/o error: {source}")]
    Backend {
        role: PoolRole,
        peer: String,
        source: io::Error,
    },

    #[error("{role} backend {peer} closed the connection mid-request")]
    BackendClosed { role: PoolRole, peer: String },

    #[error("{role} backend {peer} did not answer within {after:?}")]
    ResponseTimeout {
        role: PoolRole,
        peer: String,
        after: Duration,
    },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
