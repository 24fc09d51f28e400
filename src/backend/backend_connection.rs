use bytes::Bytes;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::config::PoolRole;
use crate::errors::SessionError;
use crate::net::LineStream;

// -----------------------------------------------------------------------------
// ----- BackendConnection -----------------------------------------------------

/// One live tracker connection owned by a single session.
#[derive(Debug)]
pub struct BackendConnection<S = TcpStream> {
    stream: LineStream<S>,
    role: PoolRole,
    peer: String,
    response_timeout: Option<Duration>,
}

impl<S> BackendConnection<S> {
    pub fn new(stream: S, role: PoolRole, peer: impl Into<String>) -> Self {
        Self {
            stream: LineStream::new(stream),
            role,
            peer: peer.into(),
            response_timeout: None,
        }
    }

    pub fn with_response_timeout(mut self, after: Option<Duration>) -> Self {
        self.response_timeout = after;
        self
    }

    pub fn role(&self) -> PoolRole {
        self.role
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }
}

// -----------------------------------------------------------------------------
// ----- BackendConnection: Public ---------------------------------------------

impl<S> BackendConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Sends `request` verbatim, flushes, and reads back exactly one response line.
    pub async fn forward(&mut self, request: &[u8]) -> Result<Bytes, SessionError> {
        debug!(
            "=> {} {}: {}",
            self.role,
            self.peer,
            String::from_utf8_lossy(request).trim_end()
        );

        match self.response_timeout {
            None => self.exchange(request).await,
            Some(after) => match timeout(after, self.exchange(request)).await {
                Ok(res) => res,
                Err(_) => Err(SessionError::ResponseTimeout {
                    role: self.role,
                    peer: self.peer.clone(),
                    after,
                }),
            },
        }
    }
}

// -----------------------------------------------------------------------------
// ----- BackendConnection: Private --------------------------------------------

impl<S> BackendConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn exchange(&mut self, request: &[u8]) -> Result<Bytes, SessionError> {
        self.stream
            .write_line(request)
            .await
            .map_err(|e| self.io_error(e))?;

        match self.stream.read_line().await {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(SessionError::BackendClosed {
                role: self.role,
                peer: self.peer.clone(),
            }),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Backend {
            role: self.role,
            peer: self.peer.clone(),
            source,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
