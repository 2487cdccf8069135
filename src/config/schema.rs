//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the echo
//! service. All types derive Serde traits for deserialization from TOML.

use serde::Deserialize;

use crate::net::{ListenerOptions, PortBinding};
use crate::transform::{TransformError, TransformRegistry};

/// Root configuration for the echo service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    /// Settings shared by every echo listener.
    pub listener: ListenerConfig,

    /// Ports to echo on, in startup order.
    pub bindings: Vec<BindingConfig>,

    /// Status page settings.
    pub status: StatusConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// fly.toml-style service table. Only used to decide which ports the
    /// status page advertises.
    pub services: Vec<ServiceConfig>,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            bindings: default_bindings(),
            status: StatusConfig::default(),
            observability: ObservabilityConfig::default(),
            services: Vec::new(),
        }
    }
}

/// Without any configured bindings the service echoes as-is on 8080 and
/// shouts on 8081.
fn default_bindings() -> Vec<BindingConfig> {
    vec![
        BindingConfig {
            port: 8080,
            transform: Some("identity".to_string()),
        },
        BindingConfig {
            port: 8081,
            transform: Some("uppercase".to_string()),
        },
    ]
}

impl EchoConfig {
    /// Turn the binding table into port bindings with resolved transforms.
    pub fn resolve_bindings(&self, registry: &TransformRegistry) -> Result<Vec<PortBinding>, TransformError> {
        self.bindings
            .iter()
            .map(|b| {
                registry
                    .resolve(b.transform.as_deref(), b.port)
                    .map(|transform| PortBinding::new(b.port, transform))
            })
            .collect()
    }

    /// Ports the status page lists, sorted ascending.
    ///
    /// With a services table, every service port that has no protocol
    /// handlers attached is advertised. Otherwise the echo bindings are.
    pub fn advertised_ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = if self.services.is_empty() {
            self.bindings.iter().map(|b| b.port).collect()
        } else {
            self.services
                .iter()
                .flat_map(|svc| svc.ports.iter())
                .filter(|p| p.handlers.is_empty())
                .map(|p| p.port)
                .collect()
        };
        ports.sort_unstable();
        ports.dedup();
        ports
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind every echo port on.
    pub host: String,

    /// Maximum concurrent connections per port (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            max_connections: 10_000,
        }
    }
}

impl From<&ListenerConfig> for ListenerOptions {
    fn from(config: &ListenerConfig) -> Self {
        Self {
            host: config.host.clone(),
            max_connections: config.max_connections,
        }
    }
}

/// One echo port.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindingConfig {
    /// TCP port to listen on.
    pub port: u16,

    /// Transform name. When absent, even ports echo as-is and odd ports
    /// shout.
    #[serde(default)]
    pub transform: Option<String>,
}

/// Status page configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Serve the status page.
    pub enabled: bool,

    /// Status page bind address.
    pub bind_address: String,

    /// Host name printed in advertised endpoints.
    pub public_host: String,

    /// Scheme printed in advertised endpoints.
    pub scheme: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:80".to_string(),
            public_host: "tcp-echo.fly.dev".to_string(),
            scheme: "tcp".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

/// Log level used when neither the config nor the command line sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A `[[services]]` entry, laid out like fly.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub ports: Vec<ServicePortConfig>,
}

/// A `[[services.ports]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicePortConfig {
    pub port: u16,

    /// Protocol handlers (e.g. "http", "tls") terminated in front of the
    /// port. Raw TCP ports have none.
    #[serde(default)]
    pub handlers: Vec<String>,
}
