//! Multi-port TCP echo service library

pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod status;
pub mod transform;

pub use config::schema::EchoConfig;
pub use lifecycle::{Shutdown, Supervisor};
pub use net::{ListenerOptions, PortBinding};
pub use status::StatusServer;
pub use transform::{Transform, TransformRegistry};
