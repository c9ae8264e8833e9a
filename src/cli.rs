//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ConfigError};

#[derive(Debug, Parser)]
#[command(
    name = "planner-mux",
    version,
    about = "Route control commands to one active planner and relay its status"
)]
pub struct Cli {
    /// Config file (defaults to the platform config dir).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the control server bind address.
    #[arg(long, value_name = "HOST:PORT")]
    pub bind: Option<String>,

    /// Override the planner selected at startup.
    #[arg(long, value_name = "NAME")]
    pub default_planner: Option<String>,

    /// Override the precision recorded at startup.
    #[arg(long, value_name = "VALUE")]
    pub default_precision: Option<f64>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::config_path)
    }

    /// Load the config file and apply command-line overrides on top.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::load_from(&self.config_path())?;
        self.apply_overrides(&mut config)?;
        Ok(config)
    }

    /// Overrides are re-validated so a bad `--default-planner` fails the
    /// same way a bad config file does.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(bind) = &self.bind {
            config.server.bind_addr = bind.clone();
        }
        if let Some(planner) = &self.default_planner {
            config.defaults.planner = planner.clone();
        }
        if let Some(precision) = self.default_precision {
            config.defaults.precision = precision;
        }
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Defaults, PlannersConfig, ServerConfig};

    fn config() -> Config {
        Config {
            defaults: Defaults {
                planner: "global".to_string(),
                precision: 0.5,
                request_timeout_ms: 100,
            },
            server: ServerConfig::default(),
            planners: PlannersConfig {
                names: vec!["global".to_string(), "local".to_string()],
                status_sources: vec!["s1".to_string(), "s2".to_string()],
                enable_endpoints: vec!["e1".to_string(), "e2".to_string()],
                precision_endpoints: vec!["p1".to_string(), "p2".to_string()],
            },
        }
    }

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::parse_from([
            "planner-mux",
            "--bind",
            "0.0.0.0:9000",
            "--default-planner",
            "local",
            "--default-precision",
            "0.1",
        ]);
        let mut config = config();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.defaults.planner, "local");
        assert_eq!(config.defaults.precision, 0.1);
    }

    #[test]
    fn unknown_default_override_fails() {
        let cli = Cli::parse_from(["planner-mux", "--default-planner", "orbital"]);
        assert!(cli.apply_overrides(&mut config()).is_err());
    }

    #[test]
    fn explicit_config_path_wins() {
        let cli = Cli::parse_from(["planner-mux", "-c", "/etc/mux.toml"]);
        assert_eq!(cli.config_path(), PathBuf::from("/etc/mux.toml"));
    }
}
