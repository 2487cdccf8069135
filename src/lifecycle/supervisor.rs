//! Service supervisor: owns every listener and the work they spawn.
//!
//! # Responsibilities
//! - Bind all configured ports before anything starts serving
//! - Spawn one accept loop per port, tracked for graceful shutdown
//! - Fan a single shutdown signal out to listeners and sessions
//! - Block shutdown until all tracked work has finished

use std::net::SocketAddr;

use crate::lifecycle::Shutdown;
use crate::net::{ListenerError, ListenerOptions, PortBinding, PortListener, WorkTracker};

/// Running set of port listeners.
#[derive(Debug)]
pub struct Supervisor {
    shutdown: Shutdown,
    tracker: WorkTracker,
    local_addrs: Vec<SocketAddr>,
}

impl Supervisor {
    /// Bind every binding and start accepting.
    ///
    /// Binding happens up front: if any port fails, the listeners bound so far
    /// are dropped and nothing is spawned.
    pub async fn start(bindings: Vec<PortBinding>, options: &ListenerOptions) -> Result<Self, ListenerError> {
        Self::start_with_shutdown(bindings, options, Shutdown::new()).await
    }

    /// Like [`Supervisor::start`], but observing an existing shutdown signal
    /// (e.g. one wired to OS signals).
    pub async fn start_with_shutdown(
        bindings: Vec<PortBinding>,
        options: &ListenerOptions,
        shutdown: Shutdown,
    ) -> Result<Self, ListenerError> {
        let mut listeners = Vec::with_capacity(bindings.len());
        for binding in bindings {
            listeners.push(PortListener::bind(binding, options).await?);
        }

        let tracker = WorkTracker::new();
        let local_addrs: Vec<SocketAddr> = listeners.iter().map(PortListener::local_addr).collect();

        for listener in listeners {
            let guard = tracker.track();
            let signal = shutdown.subscribe();
            let tracker = tracker.clone();
            tokio::spawn(async move {
                let _guard = guard;
                listener.run(signal, tracker).await;
            });
        }

        tracing::info!(listeners = ?local_addrs, "Supervisor started");

        Ok(Self {
            shutdown,
            tracker,
            local_addrs,
        })
    }

    /// Addresses the listeners are bound to, in binding order.
    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.local_addrs
    }

    /// Number of listener and session tasks still running.
    pub fn active_work(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Handle to the shutdown signal the supervisor observes.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Trigger shutdown and wait for all listeners and sessions to exit.
    ///
    /// Safe to call more than once; later calls only wait.
    pub async fn shutdown(&self) {
        if self.shutdown.trigger() {
            tracing::info!(outstanding = self.tracker.active_count(), "Shutting down, draining work");
        }
        self.tracker.wait_idle().await;
        tracing::info!("All listeners and sessions finished");
    }
}
