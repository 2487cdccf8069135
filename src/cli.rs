//! Command-line arguments.
//!
//! CLI flags take precedence over values from the config file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::EchoConfig;

/// Command-line arguments for the echo service
#[derive(Parser, Debug)]
#[command(name = "tcp-echo")]
#[command(version)]
#[command(about = "Raw TCP echo service with per-port transforms", long_about = None)]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (overrides the config file)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Status page bind address (e.g. 0.0.0.0:8000)
    #[arg(long)]
    pub status_bind: Option<String>,

    /// Do not serve the status page
    #[arg(long)]
    pub no_status: bool,

    /// fly.toml-style manifest whose [[services]] ports the status page advertises
    #[arg(long)]
    pub advertise_from: Option<PathBuf>,
}

impl Cli {
    /// Apply flag overrides on top of a loaded config.
    pub fn apply(&self, config: &mut EchoConfig) {
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(addr) = &self.status_bind {
            config.status.bind_address = addr.clone();
        }
        if self.no_status {
            config.status.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "tcp-echo",
            "--config",
            "echo.toml",
            "--log-level",
            "debug",
            "--status-bind",
            "127.0.0.1:8000",
            "--advertise-from",
            "fly.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("echo.toml")));
        assert_eq!(cli.advertise_from, Some(PathBuf::from("fly.toml")));
        assert!(!cli.no_status);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from(["tcp-echo", "--log-level", "warn", "--no-status"]).unwrap();
        let mut config = EchoConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.observability.log_level, "warn");
        assert!(!config.status.enabled);
        assert_eq!(config.status.bind_address, "0.0.0.0:80");
    }
}
