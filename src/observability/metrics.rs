//! Metrics collection and exposition.
//!
//! # Metrics
//! - `echo_connections_total` (counter): accepted connections by port
//! - `echo_active_sessions` (gauge): sessions currently running, by port
//! - `echo_bytes_total` (counter): bytes echoed, by port
//! - `echo_session_errors_total` (counter): sessions ended by an I/O error
//! - `echo_accept_errors_total` (counter): transient accept failures
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so the core never
//!   depends on the exporter being up
//! - Labels limited to port to keep cardinality bounded

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn connection_opened(port: u16) {
    let port = port.to_string();
    counter!("echo_connections_total", "port" => port.clone()).increment(1);
    gauge!("echo_active_sessions", "port" => port).increment(1.0);
}

pub fn connection_closed(port: u16, bytes: u64) {
    let port = port.to_string();
    counter!("echo_bytes_total", "port" => port.clone()).increment(bytes);
    gauge!("echo_active_sessions", "port" => port).decrement(1.0);
}

pub fn record_session_error(port: u16) {
    counter!("echo_session_errors_total", "port" => port.to_string()).increment(1);
}

pub fn record_accept_error(port: u16) {
    counter!("echo_accept_errors_total", "port" => port.to_string()).increment(1);
}
