//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every binding names a registered transform
//! - Validate value ranges (ports non-zero, limits > 0, addresses parse)
//! - Detect duplicate or conflicting ports
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EchoConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::EchoConfig;
use crate::transform::TransformRegistry;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no echo bindings configured")]
    NoBindings,

    #[error("binding port must be non-zero")]
    ZeroPort,

    #[error("port {0} is bound more than once")]
    DuplicatePort(u16),

    #[error("port {port}: unknown transform '{name}'")]
    UnknownTransform { port: u16, name: String },

    #[error("listener.max_connections must be greater than zero")]
    ZeroMaxConnections,

    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("status page port {0} collides with an echo binding")]
    StatusPortConflict(u16),

    #[error("observability.log_level must not be empty")]
    EmptyLogLevel,
}

/// Validate a parsed configuration against the available transforms.
pub fn validate_config(config: &EchoConfig, registry: &TransformRegistry) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bindings.is_empty() {
        errors.push(ValidationError::NoBindings);
    }

    let mut seen = HashSet::new();
    for binding in &config.bindings {
        if binding.port == 0 {
            errors.push(ValidationError::ZeroPort);
        } else if !seen.insert(binding.port) {
            errors.push(ValidationError::DuplicatePort(binding.port));
        }

        if let Some(name) = &binding.transform {
            if registry.get(name).is_err() {
                errors.push(ValidationError::UnknownTransform {
                    port: binding.port,
                    name: name.clone(),
                });
            }
        }
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }

    if config.status.enabled {
        match config.status.bind_address.parse::<SocketAddr>() {
            Ok(addr) if seen.contains(&addr.port()) => {
                errors.push(ValidationError::StatusPortConflict(addr.port()));
            }
            Ok(_) => {}
            Err(_) => errors.push(ValidationError::InvalidAddress {
                field: "status.bind_address",
                value: config.status.bind_address.clone(),
            }),
        }
    }

    if config.observability.metrics_enabled && config.observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.observability.log_level.trim().is_empty() {
        errors.push(ValidationError::EmptyLogLevel);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
