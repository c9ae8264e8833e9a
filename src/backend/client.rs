//! Downstream planner operations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

/// Failure of a single downstream call.
#[derive(Debug, Error)]
pub enum CallError {
    /// The request never produced a response.
    #[error("request to '{endpoint}' failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The planner answered with a non-success status.
    #[error("'{endpoint}' answered {status}")]
    Rejected { endpoint: String, status: u16 },

    /// Raised by non-HTTP implementations.
    #[error("{0}")]
    Other(String),
}

/// The two control operations every planner exposes.
///
/// Implementations are called outside the selection lock and may block for
/// as long as the underlying transport allows.
#[async_trait]
pub trait PlannerService: Send + Sync {
    async fn set_enabled(&self, enabled: bool) -> Result<(), CallError>;

    async fn set_precision(&self, precision: f64) -> Result<(), CallError>;
}

#[derive(Serialize)]
struct EnableRequest {
    data: bool,
}

#[derive(Serialize)]
struct PrecisionRequest {
    precision: f64,
}

/// Planner reached over HTTP: each operation is a JSON `POST`.
pub struct HttpPlanner {
    client: Client,
    enable_endpoint: String,
    precision_endpoint: String,
}

impl HttpPlanner {
    pub fn new(
        client: Client,
        enable_endpoint: impl Into<String>,
        precision_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            enable_endpoint: enable_endpoint.into(),
            precision_endpoint: precision_endpoint.into(),
        }
    }

    async fn post<T: Serialize + Sync>(&self, endpoint: &str, body: &T) -> Result<(), CallError> {
        let response = self
            .client
            .post(endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| CallError::Transport {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CallError::Rejected {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PlannerService for HttpPlanner {
    async fn set_enabled(&self, enabled: bool) -> Result<(), CallError> {
        self.post(&self.enable_endpoint, &EnableRequest { data: enabled })
            .await
    }

    async fn set_precision(&self, precision: f64) -> Result<(), CallError> {
        self.post(&self.precision_endpoint, &PrecisionRequest { precision })
            .await
    }
}

/// Build the shared HTTP client used for every planner.
///
/// A zero timeout leaves requests unbounded.
pub fn build_http_client(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();
    if !request_timeout.is_zero() {
        builder = builder.timeout(request_timeout);
    }
    builder.build()
}
