//! Wiring: config in, running control server and status listeners out.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinSet;

use crate::backend::{build_http_client, BackendError, BackendRegistry, SelectionState};
use crate::config::Config;
use crate::relay::{StatusListener, StatusRelay};
use crate::router::CommandRouter;
use crate::server::{ControlServer, ServerError};
use crate::shutdown::ShutdownHandle;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Registry(#[from] BackendError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// A fully wired multiplexer, bound and ready to run.
pub struct Multiplexer {
    server: ControlServer,
    listeners: Vec<StatusListener>,
    shutdown: ShutdownHandle,
}

impl Multiplexer {
    /// Build every component from `config` and bind the control server.
    pub async fn bind(config: &Config, shutdown: ShutdownHandle) -> Result<Self, BootstrapError> {
        let command_client =
            build_http_client(Duration::from_millis(config.defaults.request_timeout_ms))?;
        // Status streams are long-lived; no total timeout.
        let stream_client = build_http_client(Duration::ZERO)?;

        let registry = BackendRegistry::from_config(&config.planners, &command_client)?;
        let selection =
            SelectionState::new(config.defaults.planner.clone(), config.defaults.precision);

        let router = CommandRouter::new(registry.clone(), selection.clone())
            .with_history_limit(config.server.history_limit)
            .with_report_failures(config.server.report_failures);
        let relay = StatusRelay::new(selection, config.server.status_buffer);

        let reconnect_delay = Duration::from_millis(config.server.reconnect_delay_ms);
        let listeners = registry
            .iter()
            .map(|backend| {
                relay
                    .listener(
                        backend.descriptor.id.clone(),
                        backend.descriptor.status_source.clone(),
                    )
                    .with_client(stream_client.clone())
                    .with_reconnect_delay(reconnect_delay)
            })
            .collect();

        let mut server = ControlServer::new(router, relay, shutdown.clone());
        server.bind(&config.server.bind_addr).await?;

        tracing::info!(
            planners = ?registry.ids(),
            default = %config.defaults.planner,
            precision = config.defaults.precision,
            "Multiplexer ready"
        );

        Ok(Self {
            server,
            listeners,
            shutdown,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.server.addr
    }

    /// Run the server and one listener per planner until shutdown.
    pub async fn run(self) -> Result<(), BootstrapError> {
        let mut listeners = JoinSet::new();
        for listener in self.listeners {
            tracing::debug!(planner = %listener.planner(), "Starting status listener");
            listeners.spawn(listener.run(self.shutdown.clone()));
        }

        let result = self.server.run().await;

        // The server also stops on its own errors; make sure listeners follow.
        self.shutdown.signal();
        while listeners.join_next().await.is_some() {}

        result.map_err(BootstrapError::from)
    }
}
