//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Listeners and sessions produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Logging and metrics are advisory: neither can fail a session
//! - Connection ID flows through every log line of a session

pub mod logging;
pub mod metrics;
