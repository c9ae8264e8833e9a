use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub defaults: Defaults,
    #[serde(default)]
    pub server: ServerConfig,
    pub planners: PlannersConfig,
}

/// Initial selection and downstream call settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Planner selected at startup.
    pub planner: String,
    /// Precision recorded for the startup planner.
    pub precision: f64,
    /// Timeout for a single downstream call in milliseconds (0 disables it).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Control surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the control server (host:port).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Capacity of the outward status channel.
    #[serde(default = "default_status_buffer")]
    pub status_buffer: usize,
    /// Report `success = false` when a command fails.
    ///
    /// Disabling this answers every command with `success = true` and puts
    /// the failure only in the message, for clients built against that
    /// contract.
    #[serde(default = "default_report_failures")]
    pub report_failures: bool,
    /// Number of handoff records kept for introspection.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Delay before a status listener reconnects, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

/// Planner endpoints, as parallel lists zipped by position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannersConfig {
    pub names: Vec<String>,
    pub status_sources: Vec<String>,
    pub enable_endpoints: Vec<String>,
    pub precision_endpoints: Vec<String>,
}

fn default_request_timeout_ms() -> u64 {
    2000
}

fn default_bind_addr() -> String {
    "127.0.0.1:7311".to_string()
}

fn default_status_buffer() -> usize {
    16
}

fn default_report_failures() -> bool {
    true
}

fn default_history_limit() -> usize {
    32
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            status_buffer: default_status_buffer(),
            report_failures: default_report_failures(),
            history_limit: default_history_limit(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}
