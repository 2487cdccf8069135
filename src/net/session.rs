//! Per-connection echo loop.
//!
//! # Responsibilities
//! - Read fixed-size chunks, transform them and write them back
//! - Count bytes transferred and report how the session ended
//! - Stop at the next read when shutdown fires
//!
//! # Design Decisions
//! - One reused read buffer, no framing
//! - A write is never interrupted; shutdown is only observed while waiting to read
//! - The stream is owned by the session and dropped exactly once on return

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::lifecycle::ShutdownSignal;
use crate::transform::Transform;

/// Size of the single read buffer each session reuses.
pub const CHUNK_SIZE: usize = 1024;

/// Global atomic counter for connection IDs.
/// Relaxed ordering is enough since we only need uniqueness.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an accepted connection, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// How a session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// Peer closed its write side (clean end-of-stream).
    PeerClosed,
    /// Shutdown fired while the session was waiting for data.
    Cancelled,
    /// A read or write failed.
    Failed(io::Error),
}

/// Outcome of one session.
#[derive(Debug)]
pub struct SessionSummary {
    /// Bytes read from the peer before the session ended.
    pub bytes_transferred: u64,
    /// Terminal status.
    pub end: SessionEnd,
}

impl SessionSummary {
    /// The error that ended the session, if any.
    pub fn error(&self) -> Option<&io::Error> {
        match &self.end {
            SessionEnd::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the session ended without an I/O error.
    pub fn is_ok(&self) -> bool {
        self.error().is_none()
    }
}

/// Run the read-transform-write loop until the peer closes, an I/O error
/// occurs, or shutdown fires while waiting for the next chunk.
pub async fn run_session<S, T>(mut stream: S, transform: &T, mut shutdown: ShutdownSignal) -> SessionSummary
where
    S: AsyncRead + AsyncWrite + Unpin,
    T: Transform + ?Sized,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut bytes_transferred: u64 = 0;

    let end = loop {
        let read = tokio::select! {
            biased;
            _ = shutdown.recv() => break SessionEnd::Cancelled,
            read = stream.read(&mut buf) => read,
        };

        let n = match read {
            Ok(0) => break SessionEnd::PeerClosed,
            Ok(n) => n,
            Err(e) => break SessionEnd::Failed(e),
        };
        bytes_transferred += n as u64;

        if let Err(e) = stream.write_all(&transform.apply(&buf[..n])).await {
            break SessionEnd::Failed(e);
        }
    };

    SessionSummary {
        bytes_transferred,
        end,
    }
}
