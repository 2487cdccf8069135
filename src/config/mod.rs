//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → command-line overrides
//!     → validation.rs (semantic checks, run once)
//!     → EchoConfig (validated, immutable)
//!     → resolve_bindings() → Vec<PortBinding> for the supervisor
//!     → advertised_ports() → port list for the status page
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_services, ConfigError};
pub use schema::{BindingConfig, EchoConfig, ListenerConfig, ObservabilityConfig, StatusConfig, DEFAULT_LOG_LEVEL};
pub use validation::{validate_config, ValidationError};
