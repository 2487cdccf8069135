//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{EchoConfig, ServiceConfig};
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Parse configuration from a TOML file.
///
/// The result is not validated: command-line overrides are applied first and
/// [`validate_config`](crate::config::validate_config) runs once on the
/// merged config.
pub fn load_config(path: &Path) -> Result<EchoConfig, ConfigError> {
    read_toml(path)
}

/// Read only the `[[services]]` table from a fly.toml-style file.
///
/// Lets the status page advertise the ports an external deployment manifest
/// exposes without merging the rest of that file into the echo config.
pub fn load_services(path: &Path) -> Result<Vec<ServiceConfig>, ConfigError> {
    #[derive(serde::Deserialize)]
    struct Manifest {
        #[serde(default)]
        services: Vec<ServiceConfig>,
    }

    let manifest: Manifest = read_toml(path)?;
    Ok(manifest.services)
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_config;
    use crate::transform::TransformRegistry;
    use std::sync::atomic::{AtomicU32, Ordering};

    static FILE_COUNTER: AtomicU32 = AtomicU32::new(0);

    /// Write `content` to a unique file under the system temp dir.
    fn write_temp(content: &str) -> PathBuf {
        let n = FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("tcp-echo-loader-{}-{n}.toml", std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_valid_file() {
        let path = write_temp(
            r#"
            [[bindings]]
            port = 7070

            [status]
            enabled = false
            "#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.bindings.len(), 1);
        assert_eq!(config.bindings[0].port, 7070);
        assert!(!config.status.enabled);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("tcp-echo-definitely-missing.toml");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("tcp-echo-definitely-missing.toml"));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let path = write_temp("[[bindings]]\nport = \"eighty\"\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_transform_parses_but_fails_validation() {
        let path = write_temp("[[bindings]]\nport = 7070\ntransform = \"rot13\"\n");
        let config = load_config(&path).unwrap();
        let errors = validate_config(&config, &TransformRegistry::with_builtins()).unwrap_err();
        let err = ConfigError::Validation(errors);
        assert!(err.to_string().contains("unknown transform 'rot13'"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn reads_services_from_manifest() {
        let path = write_temp(
            r#"
            app = "tcp-echo"
            kill_signal = "SIGINT"

            [[services]]
            internal_port = 8080
            protocol = "tcp"

            [[services.ports]]
            port = 8080

            [[services.ports]]
            port = 80
            handlers = ["http"]
            "#,
        );

        let services = load_services(&path).unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].ports.len(), 2);
        assert!(services[0].ports[1].handlers.contains(&"http".to_string()));
        let _ = fs::remove_file(path);
    }
}
