//! Status page HTTP server.
//!
//! # Responsibilities
//! - Build the Axum router for the status endpoints
//! - Bind the status address and serve until shutdown fires
//!
//! # Design Decisions
//! - Independent of the echo core: it only sees the advertised port list
//! - Served with graceful shutdown on the same signal as the listeners

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::StatusConfig;
use crate::lifecycle::ShutdownSignal;
use crate::status::handlers::{get_index, get_ports};

/// Error type for the status server.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("failed to bind status page on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("status server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct StatusState {
    pub ports: Arc<[u16]>,
    pub public_host: Arc<str>,
    pub scheme: Arc<str>,
}

/// HTTP server for the status page.
pub struct StatusServer {
    router: Router,
}

impl StatusServer {
    /// Create a status server advertising `ports`.
    pub fn new(config: &StatusConfig, ports: Vec<u16>) -> Self {
        let state = StatusState {
            ports: ports.into(),
            public_host: config.public_host.as_str().into(),
            scheme: config.scheme.as_str().into(),
        };
        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: StatusState) -> Router {
        Router::new()
            .route("/", get(get_index))
            .route("/ports", get(get_ports))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured status address.
    pub async fn bind(addr: &str) -> Result<TcpListener, StatusError> {
        TcpListener::bind(addr).await.map_err(|source| StatusError::Bind {
            addr: addr.to_string(),
            source,
        })
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownSignal) -> Result<(), StatusError> {
        let addr: Option<SocketAddr> = listener.local_addr().ok();
        tracing::info!(address = ?addr, "Status page listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await
            .map_err(StatusError::Serve)?;

        tracing::info!("Status page stopped");
        Ok(())
    }
}
