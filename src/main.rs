//! tcp-echo: a multi-port raw TCP echo service
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                   SUPERVISOR                  │
//!     Client ──────────┼─▶ listener :8080 ──▶ session ──▶ identity     │
//!                      │                                                │
//!     Client ──────────┼─▶ listener :8081 ──▶ session ──▶ uppercase    │
//!                      │                                                │
//!                      │   shutdown signal ──▶ every listener/session   │
//!                      │   work tracker    ◀── every listener/session   │
//!                      └──────────────────────────────────────────────┘
//!
//!     Browser ─────────▶ status page (:80) ── advertised ports from config
//! ```
//!
//! Startup: config → logging → validation → bind status page → bind every
//! echo port.
//! A port that cannot be bound aborts startup. SIGINT/SIGTERM stop the
//! listeners, let in-flight sessions finish their current write, and the
//! process exits once all tracked work is done.

use clap::Parser;

use tcp_echo::cli::Cli;
use tcp_echo::config::{load_config, load_services, validate_config, ConfigError, EchoConfig, DEFAULT_LOG_LEVEL};
use tcp_echo::lifecycle::{signals, Shutdown, Supervisor};
use tcp_echo::net::ListenerOptions;
use tcp_echo::observability::{logging, metrics};
use tcp_echo::status::StatusServer;
use tcp_echo::transform::TransformRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let registry = TransformRegistry::with_builtins();

    let loaded = match &cli.config {
        Some(path) => load_config(path),
        None => Ok(EchoConfig::default()),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            // No config to take a level from; fall back so the failure is logged.
            let level = cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
            logging::init_logging(level)?;
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    cli.apply(&mut config);

    logging::init_logging(&config.observability.log_level)?;

    if let Err(errors) = validate_config(&config, &registry) {
        for error in &errors {
            tracing::error!(error = %error, "Invalid configuration");
        }
        return Err(ConfigError::Validation(errors).into());
    }
    if let Some(path) = &cli.advertise_from {
        config.services = match load_services(path) {
            Ok(services) => services,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load service manifest");
                return Err(e.into());
            }
        };
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bindings = config.bindings.len(),
        status_enabled = config.status.enabled,
        "tcp-echo starting"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let bindings = config.resolve_bindings(&registry)?;
    let options = ListenerOptions::from(&config.listener);

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let status_listener = if config.status.enabled {
        Some(StatusServer::bind(&config.status.bind_address).await?)
    } else {
        None
    };

    let supervisor = match Supervisor::start_with_shutdown(bindings, &options, shutdown.clone()).await {
        Ok(supervisor) => supervisor,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    let status_task = status_listener.map(|listener| {
        let server = StatusServer::new(&config.status, config.advertised_ports());
        tokio::spawn(server.run(listener, shutdown.subscribe()))
    });

    shutdown.subscribe().recv().await;
    supervisor.shutdown().await;

    if let Some(task) = status_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Status page exited with error"),
            Err(e) => tracing::error!(error = %e, "Status page task panicked"),
        }
    }

    tracing::info!("Goodbye");
    Ok(())
}
