use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::warn;

use super::BackendConnection;
use crate::config::{BackendAddr, BackendSettings, ConnectStrategy, Pool};
use crate::errors::ConnectError;

// -----------------------------------------------------------------------------
// ----- connect_pool ----------------------------------------------------------

/// Opens one connection to `pool`, walking candidates per `settings.strategy`.
pub async fn connect_pool(
    pool: &Pool,
    settings: &BackendSettings,
) -> Result<BackendConnection, ConnectError> {
    let candidates = match settings.strategy {
        ConnectStrategy::Ordered => pool.members(),
        ConnectStrategy::FirstOnly => &pool.members()[..pool.members().len().min(1)],
    };

    let mut last = None;
    for addr in candidates {
        match connect_one(addr, settings).await {
            Ok(stream) => {
                let peer = stream
                    .peer_addr()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|_| addr.to_string());

                return Ok(BackendConnection::new(stream, pool.role(), peer)
                    .with_response_timeout(settings.response_timeout));
            }
            Err(e) => {
                if candidates.len() > 1 {
                    warn!("{} candidate {addr} unavailable: {e}", pool.role());
                }
                last = Some(e);
            }
        }
    }

    match last {
        None => Err(ConnectError::EmptyPool { role: pool.role() }),
        Some(e) if candidates.len() == 1 => Err(e),
        Some(e) => Err(ConnectError::Exhausted {
            role: pool.role(),
            tried: candidates.len(),
            last: Box::new(e),
        }),
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

async fn connect_one(
    addr: &BackendAddr,
    settings: &BackendSettings,
) -> Result<TcpStream, ConnectError> {
    let target = (addr.host.as_str(), addr.port);

    let res = match settings.connect_timeout {
        None => TcpStream::connect(target).await,
        Some(after) => timeout(after, TcpStream::connect(target))
            .await
            .map_err(|_| ConnectError::TimedOut {
                addr: addr.clone(),
                after,
            })?,
    };

    let stream = res.map_err(|source| ConnectError::Unreachable {
        addr: addr.clone(),
        source,
    })?;

    let _ = stream.set_nodelay(true);

    Ok(stream)
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
