//! net/line_stream.rs
//!
//! Newline-framed reader/writer over any async byte stream.
//! Reads buffer into a `BytesMut` and split off one `\n`-terminated line at a time;
//! writes go out verbatim and are flushed before returning.

use bytes::{Bytes, BytesMut};
use memchr::memchr;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const READ_CAPACITY: usize = 4 * 1024;

/// Longest line accepted before the stream is declared broken.
pub const MAX_LINE_LEN: usize = 1024 * 1024;

// -----------------------------------------------------------------------------
// ----- LineStream ------------------------------------------------------------

#[derive(Debug)]
pub struct LineStream<S> {
    stream: S,
    inbox: BytesMut,
    // Bytes of `inbox` already known to hold no `\n`.
    scanned: usize,
    max_line_len: usize,
}

impl<S> LineStream<S> {
    pub fn new(stream: S) -> Self {
        Self::with_max_line_len(stream, MAX_LINE_LEN)
    }

    pub fn with_max_line_len(stream: S, max_line_len: usize) -> Self {
        Self {
            stream,
            inbox: BytesMut::with_capacity(READ_CAPACITY),
            scanned: 0,
            max_line_len,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- LineStream: Public Methods --------------------------------------------

impl<S> LineStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Next line including its `\n`.
    ///
    /// `Ok(None)` means the peer closed with nothing left buffered. A trailing
    /// fragment without a terminator is handed out as a final line.
    pub async fn read_line(&mut self) -> io::Result<Option<Bytes>> {
        loop {
            if let Some(pos) = memchr(b'\n', &self.inbox[self.scanned..]) {
                let end = self.scanned + pos + 1;
                self.scanned = 0;
                return Ok(Some(self.inbox.split_to(end).freeze()));
            }
            self.scanned = self.inbox.len();

            if self.inbox.len() > self.max_line_len {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line exceeds {} bytes without a terminator", self.max_line_len),
                ));
            }

            self.inbox.reserve(READ_CAPACITY);
            let n = self.stream.read_buf(&mut self.inbox).await?;
            if n == 0 {
                if self.inbox.is_empty() {
                    return Ok(None);
                }
                self.scanned = 0;
                return Ok(Some(self.inbox.split().freeze()));
            }
        }
    }

    pub async fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        self.stream.write_all(line).await?;
        self.stream.flush().await
    }

    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
