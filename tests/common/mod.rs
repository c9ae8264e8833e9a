//! Shared test utilities and mock infrastructure.

#![allow(dead_code)]

pub mod mock_planner;

use std::path::PathBuf;
use std::time::Duration;

use planner_mux::config::{Config, Defaults, PlannersConfig, ServerConfig};
use tempfile::TempDir;

use mock_planner::MockPlanner;

/// Config pointing at the given mock planners, bound to an ephemeral port.
pub fn config_for(planners: &[(&str, &MockPlanner)]) -> Config {
    Config {
        defaults: Defaults {
            planner: planners[0].0.to_string(),
            precision: 0.5,
            request_timeout_ms: 2000,
        },
        server: ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            reconnect_delay_ms: 50,
            ..ServerConfig::default()
        },
        planners: PlannersConfig {
            names: planners.iter().map(|(n, _)| n.to_string()).collect(),
            status_sources: planners.iter().map(|(_, p)| p.status_url()).collect(),
            enable_endpoints: planners.iter().map(|(_, p)| p.enabled_url()).collect(),
            precision_endpoints: planners.iter().map(|(_, p)| p.precision_url()).collect(),
        },
    }
}

/// Write `content` to a config file in a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Read SSE `data:` values from `response` until `last` shows up.
///
/// Returns every value seen, `last` included, or whatever was seen when the
/// stream ended or `timeout` elapsed.
pub async fn sse_data_until(
    response: &mut reqwest::Response,
    last: &str,
    timeout: Duration,
) -> Vec<String> {
    let mut seen = Vec::new();
    let read = async {
        let mut buffer = String::new();
        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                _ => return,
            };
            buffer.push_str(&String::from_utf8_lossy(&chunk));
            while let Some(end) = buffer.find('\n') {
                let line: String = buffer.drain(..=end).collect();
                if let Some(value) = line.trim_end().strip_prefix("data:") {
                    let value = value.trim_start().to_string();
                    let done = value == last;
                    seen.push(value);
                    if done {
                        return;
                    }
                }
            }
        }
    };
    let _ = tokio::time::timeout(timeout, read).await;
    seen
}
