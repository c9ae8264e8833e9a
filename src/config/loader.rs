use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the default path of the configuration file.
    ///
    /// Uses `~/.config/planner-mux/config.toml` on Unix, or the platform
    /// equivalent via `dirs::config_dir()`. Falls back to the current
    /// directory if no config dir is available.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("planner-mux").join("config.toml")
    }

    /// Loads and validates configuration from `path`.
    ///
    /// Unlike a UI application there is no usable default planner set, so a
    /// missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - At least one planner is configured
    /// - All four planner lists have the same length
    /// - Planner names are non-empty and unique
    /// - The default planner is one of the configured names
    pub fn validate(&self) -> Result<(), ConfigError> {
        let planners = &self.planners;
        if planners.names.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "At least one planner must be configured".to_string(),
            });
        }

        let expected = planners.names.len();
        let lengths = [
            ("status_sources", planners.status_sources.len()),
            ("enable_endpoints", planners.enable_endpoints.len()),
            ("precision_endpoints", planners.precision_endpoints.len()),
        ];
        for (field, len) in lengths {
            if len != expected {
                return Err(ConfigError::ValidationError {
                    message: format!(
                        "planners.{} has {} entries but planners.names has {}",
                        field, len, expected
                    ),
                });
            }
        }

        let mut seen = HashSet::with_capacity(expected);
        for name in &planners.names {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: "Planner names must not be empty".to_string(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::ValidationError {
                    message: format!("Planner '{}' is configured more than once", name),
                });
            }
        }

        let default = &self.defaults.planner;
        if !seen.contains(default.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Default planner '{}' not found in configured planners",
                    default
                ),
            });
        }

        if self.server.status_buffer == 0 {
            return Err(ConfigError::ValidationError {
                message: "server.status_buffer must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Defaults, PlannersConfig, ServerConfig};

    fn config_with(names: &[&str]) -> Config {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let urls = |suffix: &str| -> Vec<String> {
            names
                .iter()
                .map(|n| format!("http://{}.local/{}", n, suffix))
                .collect()
        };
        Config {
            defaults: Defaults {
                planner: names.first().cloned().unwrap_or_default(),
                precision: 0.5,
                request_timeout_ms: 100,
            },
            server: ServerConfig::default(),
            planners: PlannersConfig {
                status_sources: urls("status"),
                enable_endpoints: urls("enabled"),
                precision_endpoints: urls("precision"),
                names,
            },
        }
    }

    #[test]
    fn accepts_consistent_config() {
        assert!(config_with(&["global", "local"]).validate().is_ok());
    }

    #[test]
    fn rejects_empty_planner_list() {
        let err = config_with(&[]).validate().unwrap_err();
        assert!(err.to_string().contains("At least one planner"));
    }

    #[test]
    fn rejects_mismatched_list_lengths() {
        let mut config = config_with(&["global", "local"]);
        config.planners.precision_endpoints.pop();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("precision_endpoints"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut config = config_with(&["global", "local"]);
        config.planners.names[1] = "global".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn rejects_unknown_default() {
        let mut config = config_with(&["global"]);
        config.defaults.planner = "orbital".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("orbital"));
    }

    #[test]
    fn rejects_zero_status_buffer() {
        let mut config = config_with(&["global"]);
        config.server.status_buffer = 0;
        assert!(config.validate().is_err());
    }
}
