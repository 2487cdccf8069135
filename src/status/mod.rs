//! Status page subsystem.
//!
//! # Data Flow
//! ```text
//! EchoConfig::advertised_ports()
//!     → server.rs (Axum router, graceful shutdown)
//!     → handlers.rs
//!         GET /       plain-text listing of scheme://host:port endpoints
//!         GET /ports  the same listing as JSON
//! ```

pub mod handlers;
pub mod server;

pub use server::{StatusError, StatusServer};
