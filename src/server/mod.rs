//! Control server: the single endpoint clients talk to.

pub mod health;
pub mod routes;

use std::future::IntoFuture;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::relay::StatusRelay;
use crate::router::CommandRouter;
use crate::server::routes::{build_router, AppState};
use crate::shutdown::ShutdownHandle;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid bind address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("bind() must be called before run()")]
    NotBound,

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ControlServer {
    pub addr: SocketAddr,
    /// Populated by bind(), consumed by run().
    listener: Option<TcpListener>,
    state: AppState,
}

impl ControlServer {
    pub fn new(router: CommandRouter, relay: StatusRelay, shutdown: ShutdownHandle) -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            listener: None,
            state: AppState {
                router,
                relay,
                shutdown,
            },
        }
    }

    /// Bind the listener now so the port is held until run().
    pub async fn bind(&mut self, bind_addr: &str) -> Result<SocketAddr, ServerError> {
        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|source| ServerError::InvalidAddress {
                addr: bind_addr.to_string(),
                source,
            })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.addr = listener.local_addr()?;
        self.listener = Some(listener);
        tracing::info!("Control server bound to {}", self.addr);
        Ok(self.addr)
    }

    pub fn app(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Serve until the shutdown handle is signalled.
    pub async fn run(mut self) -> Result<(), ServerError> {
        let listener = self.listener.take().ok_or(ServerError::NotBound)?;
        let app = self.app();
        let shutdown = self.state.shutdown.clone();

        tracing::info!("Control server listening on {}", self.addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .into_future()
            .await?;

        tracing::info!("Control server stopped");
        Ok(())
    }
}
