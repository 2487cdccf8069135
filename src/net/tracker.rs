//! Outstanding-work tracking for graceful shutdown.
//!
//! # Responsibilities
//! - Count listener and session tasks that have not finished yet
//! - Hand out guards that release their slot exactly once
//! - Let the supervisor wait until the count drops to zero

use tokio::sync::watch;

use std::sync::Arc;

/// Counts unfinished listener and session tasks.
///
/// Backed by a watch channel so waiters are woken on every change instead of
/// polling the count.
#[derive(Debug, Clone)]
pub struct WorkTracker {
    count: Arc<watch::Sender<u64>>,
}

impl WorkTracker {
    /// Create a tracker with no outstanding work.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { count: Arc::new(tx) }
    }

    /// Record a unit of work. Call before spawning the task that owns it and
    /// move the guard into that task.
    pub fn track(&self) -> WorkGuard {
        self.count.send_modify(|n| *n += 1);
        WorkGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Current number of unfinished tasks.
    pub fn active_count(&self) -> u64 {
        *self.count.borrow()
    }

    /// Wait until every guard handed out so far has been dropped.
    pub async fn wait_idle(&self) {
        let mut rx = self.count.subscribe();
        // The sender is owned by `self`, so the channel cannot close here.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl Default for WorkTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that tracks one task's lifetime.
/// Decrements the outstanding count when dropped.
#[derive(Debug)]
pub struct WorkGuard {
    count: Arc<watch::Sender<u64>>,
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.count.send_modify(|n| *n -= 1);
    }
}
