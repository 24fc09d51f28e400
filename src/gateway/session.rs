use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, error};

use crate::backend::{BackendConnection, connect_pool};
use crate::config::{Config, PoolRole};
use crate::errors::SessionError;
use crate::net::LineStream;
use crate::protocol::FailoverDecision;

// -----------------------------------------------------------------------------
// ----- ProxySession ----------------------------------------------------------

/// One client connection plus the two tracker connections it owns for its lifetime.
#[derive(Debug)]
pub struct ProxySession<C, B = TcpStream> {
    client: LineStream<C>,
    client_peer: String,
    primary: BackendConnection<B>,
    secondary: BackendConnection<B>,
    config: Arc<Config>,
    stats: SessionStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub requests: u64,
    pub failovers: u64,
    pub suppressed: u64,
}

// -----------------------------------------------------------------------------
// ----- ProxySession: Static --------------------------------------------------

impl<C> ProxySession<C, TcpStream> {
    /// Connects to both pools, primary first. Either failing ends the session
    /// before the client is read from or written to.
    pub async fn open(
        client: C,
        client_peer: impl Into<String>,
        config: Arc<Config>,
    ) -> Result<Self, SessionError> {
        let primary = connect_pool(&config.primary, &config.backend)
            .await
            .map_err(|source| SessionError::BackendUnavailable {
                role: PoolRole::Primary,
                source,
            })?;

        let secondary = connect_pool(&config.secondary, &config.backend)
            .await
            .map_err(|source| SessionError::BackendUnavailable {
                role: PoolRole::Secondary,
                source,
            })?;

        Ok(Self::from_parts(client, client_peer, primary, secondary, config))
    }
}

impl<C, B> ProxySession<C, B> {
    pub fn from_parts(
        client: C,
        client_peer: impl Into<String>,
        primary: BackendConnection<B>,
        secondary: BackendConnection<B>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            client: LineStream::new(client),
            client_peer: client_peer.into(),
            primary,
            secondary,
            config,
            stats: SessionStats::default(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- ProxySession: Public --------------------------------------------------

impl<C, B> ProxySession<C, B>
where
    C: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    /// Serves requests one at a time until the client hangs up.
    ///
    /// Consumes the session, so every socket it owns is closed on return,
    /// whether the client left cleanly or a backend broke.
    pub async fn run(mut self) -> Result<SessionStats, SessionError> {
        debug!(
            "client {} bound to primary {} and secondary {}",
            self.client_peer,
            self.primary.peer(),
            self.secondary.peer()
        );

        loop {
            let request = match self.client.read_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(source) => return Err(SessionError::Client { source }),
            };

            let response = self.serve_request(&request).await?;

            self.client
                .write_line(&response)
                .await
                .map_err(|source| SessionError::Client { source })?;
        }

        let _ = self.client.shutdown().await;

        Ok(self.stats)
    }
}

// -----------------------------------------------------------------------------
// ----- ProxySession: Private -------------------------------------------------

impl<C, B> ProxySession<C, B>
where
    C: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    async fn serve_request(&mut self, request: &[u8]) -> Result<Bytes, SessionError> {
        self.stats.requests += 1;

        let primary_response = self.primary.forward(request).await?;

        match self.config.failover.decide(request, &primary_response) {
            FailoverDecision::PassThrough => Ok(primary_response),

            FailoverDecision::Suppressed { command } => {
                self.stats.suppressed += 1;
                debug!(
                    "client {}: not retrying '{}' against secondary",
                    self.client_peer,
                    String::from_utf8_lossy(command)
                );
                Ok(primary_response)
            }

            FailoverDecision::Retry { reason } => {
                self.stats.failovers += 1;
                debug!(
                    "client {}: primary answered {}, failing over",
                    self.client_peer,
                    String::from_utf8_lossy(reason)
                );
                self.secondary.forward(request).await
            }
        }
    }
}

// -----------------------------------------------------------------------------
// ----- handle_client ---------------------------------------------------------

/// Task body for one accepted connection. Errors are logged here and go no further.
pub async fn handle_client(stream: TcpStream, peer: SocketAddr, config: Arc<Config>) {
    let session = match ProxySession::open(stream, peer.to_string(), config.clone()).await {
        Ok(session) => session,
        Err(e) => {
            log_session_error(&config, peer, &e);
            return;
        }
    };

    match session.run().await {
        Ok(stats) => debug!(
            "client {peer} closed after {} requests ({} failed over, {} kept on primary)",
            stats.requests, stats.failovers, stats.suppressed
        ),
        Err(e) => log_session_error(&config, peer, &e),
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

fn log_session_error(config: &Config, peer: SocketAddr, err: &SessionError) {
    match err {
        SessionError::BackendUnavailable { role, .. } => {
            error!("{err}; pool {} (client {peer})", config.pool(*role));
        }
        _ => error!("client {peer} session aborted: {err}"),
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
