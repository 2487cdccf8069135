//! End-to-end tests for the echo listeners and graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tcp_echo::config::EchoConfig;
use tcp_echo::net::PortBinding;
use tcp_echo::transform::{Identity, TransformRegistry};
use tcp_echo::Supervisor;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

#[tokio::test]
async fn test_identity_and_uppercase_ports() {
    let (supervisor, identity_addr, upper_addr) = common::start_identity_and_uppercase().await;

    let mut client = TcpStream::connect(identity_addr).await.unwrap();
    assert_eq!(common::round_trip(&mut client, b"abc").await, b"abc");

    let mut client = TcpStream::connect(upper_addr).await.unwrap();
    assert_eq!(common::round_trip(&mut client, b"abc").await, b"ABC");
    assert_eq!(common::round_trip(&mut client, b"123!").await, b"123!");

    supervisor.shutdown().await;
}

#[tokio::test]
async fn test_writes_echo_in_order() {
    let (supervisor, _, upper_addr) = common::start_identity_and_uppercase().await;

    let mut client = TcpStream::connect(upper_addr).await.unwrap();
    let writes: [&[u8]; 4] = [b"first ", b"second ", b"third!", b" and 4th"];
    let mut received = Vec::new();
    for w in writes {
        received.extend(common::round_trip(&mut client, w).await);
    }
    assert_eq!(received, b"FIRST SECOND THIRD! AND 4TH");

    supervisor.shutdown().await;
}

#[tokio::test]
async fn test_half_close_returns_everything() {
    let (supervisor, identity_addr, _) = common::start_identity_and_uppercase().await;

    let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 256) as u8).collect();
    let client = TcpStream::connect(identity_addr).await.unwrap();
    let (mut rd, mut wr) = client.into_split();

    let writer = {
        let payload = payload.clone();
        tokio::spawn(async move {
            wr.write_all(&payload).await.unwrap();
            wr.shutdown().await.unwrap();
        })
    };

    let mut echoed = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), rd.read_to_end(&mut echoed))
        .await
        .expect("echo should finish")
        .unwrap();
    writer.await.unwrap();
    assert_eq!(echoed, payload);

    supervisor.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_clients_do_not_mix() {
    let (supervisor, identity_addr, _) = common::start_identity_and_uppercase().await;

    let mut tasks = Vec::new();
    for client_id in 0..16u8 {
        tasks.push(tokio::spawn(async move {
            let mut stream = TcpStream::connect(identity_addr).await.unwrap();
            for round in 0..20u8 {
                let payload = vec![client_id; 64 + round as usize];
                let echoed = common::round_trip(&mut stream, &payload).await;
                assert!(echoed.iter().all(|&b| b == client_id), "client {client_id} got foreign bytes");
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    supervisor.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_unblocks_idle_sessions() {
    let (supervisor, identity_addr, upper_addr) = common::start_identity_and_uppercase().await;

    let mut idle_a = TcpStream::connect(identity_addr).await.unwrap();
    let mut idle_b = TcpStream::connect(upper_addr).await.unwrap();
    common::round_trip(&mut idle_a, b"hi").await;
    common::round_trip(&mut idle_b, b"hi").await;
    assert_eq!(supervisor.active_work(), 4);

    tokio::time::timeout(Duration::from_secs(2), supervisor.shutdown())
        .await
        .expect("shutdown should not hang on idle sessions");
    assert_eq!(supervisor.active_work(), 0);

    let mut rest = Vec::new();
    assert_eq!(idle_a.read_to_end(&mut rest).await.unwrap(), 0);
}

#[tokio::test]
async fn test_no_accepts_after_shutdown() {
    let (supervisor, identity_addr, upper_addr) = common::start_identity_and_uppercase().await;
    supervisor.shutdown().await;

    assert!(TcpStream::connect(identity_addr).await.is_err());
    assert!(TcpStream::connect(upper_addr).await.is_err());
}

#[tokio::test]
async fn test_session_count_drops_when_client_leaves() {
    let (supervisor, identity_addr, _) = common::start_identity_and_uppercase().await;

    let mut client = TcpStream::connect(identity_addr).await.unwrap();
    common::round_trip(&mut client, b"x").await;
    assert_eq!(supervisor.active_work(), 3);

    drop(client);
    assert!(common::eventually(|| supervisor.active_work() == 2, Duration::from_secs(2)).await);

    supervisor.shutdown().await;
}

#[tokio::test]
async fn test_bindings_from_config() {
    let config: EchoConfig = toml::from_str(
        r#"
        [[bindings]]
        port = 1
        transform = "UPPERCASE"
        "#,
    )
    .unwrap();

    let bindings = config.resolve_bindings(&TransformRegistry::with_builtins()).unwrap();
    // Rebind on an ephemeral port, keeping the resolved transform.
    let bindings: Vec<PortBinding> = bindings
        .into_iter()
        .map(|b| PortBinding::new(0, b.transform))
        .chain(std::iter::once(PortBinding::new(0, Arc::new(Identity))))
        .collect();

    let supervisor = Supervisor::start(bindings, &common::loopback_options()).await.unwrap();
    let mut client = TcpStream::connect(supervisor.local_addrs()[0]).await.unwrap();
    assert_eq!(common::round_trip(&mut client, b"shout").await, b"SHOUT");

    supervisor.shutdown().await;
}
