//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tcp_echo::net::{ListenerOptions, PortBinding};
use tcp_echo::transform::{Identity, Uppercase};
use tcp_echo::Supervisor;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Options binding loopback only, with OS-assigned ports.
#[allow(dead_code)]
pub fn loopback_options() -> ListenerOptions {
    ListenerOptions {
        host: "127.0.0.1".to_string(),
        max_connections: 256,
    }
}

/// Start a supervisor with an identity port and an uppercase port.
///
/// Returns the supervisor plus `(identity_addr, uppercase_addr)`.
#[allow(dead_code)]
pub async fn start_identity_and_uppercase() -> (Supervisor, SocketAddr, SocketAddr) {
    let bindings = vec![
        PortBinding::new(0, Arc::new(Identity)),
        PortBinding::new(0, Arc::new(Uppercase)),
    ];
    let supervisor = Supervisor::start(bindings, &loopback_options()).await.unwrap();
    let addrs = supervisor.local_addrs().to_vec();
    (supervisor, addrs[0], addrs[1])
}

/// Send `payload` on `stream` and read back exactly as many bytes.
#[allow(dead_code)]
pub async fn round_trip(stream: &mut TcpStream, payload: &[u8]) -> Vec<u8> {
    stream.write_all(payload).await.unwrap();
    let mut buf = vec![0u8; payload.len()];
    tokio::time::timeout(Duration::from_secs(2), stream.read_exact(&mut buf))
        .await
        .expect("echo timed out")
        .unwrap();
    buf
}

/// Poll `f` until it returns true or the deadline passes.
#[allow(dead_code)]
pub async fn eventually<F: Fn() -> bool>(f: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if f() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    f()
}
