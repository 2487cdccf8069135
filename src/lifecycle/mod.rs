//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (supervisor.rs):
//!     Resolve bindings → Bind every listener → Spawn accept loops
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain sessions → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a port that cannot be bound aborts startup before anything runs
//! - Ordered shutdown: stop accept, drain, close
//! - No forced exit: a session finishes its current write before leaving

pub mod shutdown;
pub mod signals;
pub mod supervisor;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use supervisor::Supervisor;
