//! Per-port TCP listener with backpressure.
//!
//! # Responsibilities
//! - Bind one configured port
//! - Accept incoming TCP connections and spawn one session task each
//! - Enforce max_connections limit via semaphore
//! - Stop accepting as soon as shutdown fires

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::lifecycle::ShutdownSignal;
use crate::net::session::{run_session, ConnectionId, SessionEnd};
use crate::net::tracker::WorkTracker;
use crate::observability::metrics;
use crate::transform::Transform;

/// Pause after an accept error so a persistent failure (e.g. EMFILE) does
/// not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind the port.
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
    /// Failed to accept a connection.
    #[error("failed to accept: {0}")]
    Accept(#[source] std::io::Error),
}

/// Static association of a port with the transform its sessions apply.
#[derive(Clone)]
pub struct PortBinding {
    pub port: u16,
    pub transform: Arc<dyn Transform>,
}

impl PortBinding {
    pub fn new(port: u16, transform: Arc<dyn Transform>) -> Self {
        Self { port, transform }
    }
}

impl fmt::Debug for PortBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortBinding")
            .field("port", &self.port)
            .field("transform", &self.transform.name())
            .finish()
    }
}

/// Settings shared by every listener.
#[derive(Debug, Clone)]
pub struct ListenerOptions {
    /// Interface to bind (e.g. "0.0.0.0").
    pub host: String,
    /// Maximum concurrent sessions per listener.
    pub max_connections: usize,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            max_connections: 10_000,
        }
    }
}

/// A bound port that has not started accepting yet.
///
/// The listening socket is closed when the value is dropped, which happens
/// when [`PortListener::run`] returns.
pub struct PortListener {
    inner: TcpListener,
    binding: PortBinding,
    local_addr: SocketAddr,
    connection_limit: Arc<Semaphore>,
}

impl PortListener {
    /// Bind the binding's port on the configured host.
    pub async fn bind(binding: PortBinding, options: &ListenerOptions) -> Result<Self, ListenerError> {
        let port = binding.port;
        let inner = TcpListener::bind((options.host.as_str(), port))
            .await
            .map_err(|source| ListenerError::Bind { port, source })?;

        let local_addr = inner
            .local_addr()
            .map_err(|source| ListenerError::Bind { port, source })?;

        tracing::info!(
            address = %local_addr,
            transform = binding.transform.name(),
            max_connections = options.max_connections,
            "Listener bound"
        );

        Ok(Self {
            inner,
            binding,
            local_addr,
            connection_limit: Arc::new(Semaphore::new(options.max_connections)),
        })
    }

    /// Address the socket is actually bound to (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept a new connection, respecting the connection limit.
    ///
    /// Waits while the limit is reached. The returned permit must be held for
    /// the connection's lifetime. Cancel-safe.
    async fn accept(&self) -> Result<(TcpStream, SocketAddr, OwnedSemaphorePermit), ListenerError> {
        let permit = self
            .connection_limit
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ListenerError::Accept(std::io::Error::other(e)))?;

        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        Ok((stream, addr, permit))
    }

    /// Run the accept loop until shutdown fires.
    ///
    /// Every session is registered with `tracker` before it is spawned, so
    /// the supervisor can wait for it. No session is spawned once the loop
    /// has observed shutdown.
    pub async fn run(self, mut shutdown: ShutdownSignal, tracker: WorkTracker) {
        let port = self.binding.port;

        loop {
            let accepted = tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                accepted = self.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer_addr, permit)) => {
                    if shutdown.is_triggered() {
                        // Raced with shutdown; refuse rather than start a session.
                        break;
                    }

                    let guard = tracker.track();
                    let transform = Arc::clone(&self.binding.transform);
                    let signal = shutdown.clone();
                    tokio::spawn(async move {
                        let _guard = guard;
                        let _permit = permit;
                        serve_connection(stream, peer_addr, port, transform, signal).await;
                    });
                }
                Err(e) if shutdown.is_triggered() => {
                    tracing::debug!(port, error = %e, "Accept interrupted by shutdown");
                    break;
                }
                Err(e) => {
                    tracing::warn!(port, error = %e, "Accept failed, retrying");
                    metrics::record_accept_error(port);
                    tokio::select! {
                        _ = shutdown.recv() => break,
                        _ = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => {}
                    }
                }
            }
        }

        tracing::info!(address = %self.local_addr, "Listener stopped");
    }
}

/// Drive one accepted connection and log how it ended.
async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    port: u16,
    transform: Arc<dyn Transform>,
    shutdown: ShutdownSignal,
) {
    let id = ConnectionId::new();
    tracing::info!(port, connection_id = %id, peer_addr = %peer_addr, "Connection accepted");
    metrics::connection_opened(port);

    let summary = run_session(stream, transform.as_ref(), shutdown.clone()).await;
    let bytes = summary.bytes_transferred;

    match &summary.end {
        SessionEnd::PeerClosed => {
            tracing::info!(port, connection_id = %id, peer_addr = %peer_addr, bytes, "Connection closed");
        }
        SessionEnd::Cancelled => {
            tracing::info!(port, connection_id = %id, peer_addr = %peer_addr, bytes, "Connection closed by shutdown");
        }
        SessionEnd::Failed(e) if shutdown.is_triggered() => {
            tracing::debug!(port, connection_id = %id, bytes, error = %e, "Connection error during shutdown");
        }
        SessionEnd::Failed(e) => {
            tracing::warn!(port, connection_id = %id, peer_addr = %peer_addr, bytes, error = %e, "Connection error");
            metrics::record_session_error(port);
        }
    }

    metrics::connection_closed(port, bytes);
}
