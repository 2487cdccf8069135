//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → tracker.rs (outstanding-work guard)
//!     → session.rs (read → transform → write until close)
//!
//! Session end states:
//!     PeerClosed | Cancelled | Failed(io::Error)
//! ```
//!
//! # Design Decisions
//! - One task per listener, one task per connection
//! - Each task is tracked for graceful shutdown
//! - Errors stay inside the task that produced them

pub mod listener;
pub mod session;
pub mod tracker;

pub use listener::{ListenerError, ListenerOptions, PortBinding, PortListener};
pub use session::{run_session, SessionEnd, SessionSummary};
pub use tracker::{WorkGuard, WorkTracker};
