use std::future::{Future, pending};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tracing::{error, info};

use super::session::handle_client;
use crate::config::Config;

// -----------------------------------------------------------------------------
// ----- Listener --------------------------------------------------------------

/// Accept loop: one spawned session per connection, no admission control.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    config: Arc<Config>,
}

impl Listener {
    pub fn bind(config: Arc<Config>) -> std::io::Result<Self> {
        let socket = if config.listen_addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };

        socket.set_reuseaddr(true)?;
        socket.bind(config.listen_addr)?;

        let inner = socket.listen(config.backlog)?;

        Ok(Self { inner, config })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    pub async fn serve(self) -> std::io::Result<()> {
        self.serve_until(pending::<()>()).await
    }

    /// Accepts until `shutdown` resolves. Sessions already running are left to finish.
    pub async fn serve_until<F: Future>(self, shutdown: F) -> std::io::Result<()> {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("listener on {} shutting down", self.local_addr()?);
                    break;
                }

                accept_res = self.inner.accept() => {
                    let (stream, peer) = match accept_res {
                        Ok(v) => v,
                        Err(e) => { error!("accept error: {e}"); continue; }
                    };

                    let _ = stream.set_nodelay(true);

                    let config = self.config.clone();
                    tokio::spawn(handle_client(stream, peer, config));
                }
            }
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
