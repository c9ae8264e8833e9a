//! HTTP handlers for the control surface.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;

use crate::backend::Selection;
use crate::relay::StatusRelay;
use crate::router::{CommandResponse, CommandRouter, HandoffRecord};
use crate::server::health::health;
use crate::shutdown::ShutdownHandle;

#[derive(Clone)]
pub struct AppState {
    pub router: CommandRouter,
    pub relay: StatusRelay,
    pub shutdown: ShutdownHandle,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectRequest {
    pub planner: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnabledRequest {
    pub data: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrecisionRequest {
    pub precision: f64,
}

#[derive(Debug, Serialize)]
pub struct PlannerInfo {
    pub id: String,
    pub active: bool,
}

/// Body of `GET /selection`.
#[derive(Debug, Serialize)]
pub struct SelectionReport {
    pub selection: Selection,
    pub planners: Vec<PlannerInfo>,
    pub handoffs: Vec<HandoffRecord>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/select", post(select_planner))
        .route("/enabled", post(set_enabled))
        .route("/precision", post(set_precision))
        .route("/status", get(status_stream))
        .route("/selection", get(selection_report))
        .route("/health", get(health))
        .with_state(state)
}

async fn select_planner(
    State(state): State<AppState>,
    Json(request): Json<SelectRequest>,
) -> Json<CommandResponse> {
    Json(state.router.select_backend(&request.planner).await)
}

async fn set_enabled(
    State(state): State<AppState>,
    Json(request): Json<EnabledRequest>,
) -> Json<CommandResponse> {
    Json(state.router.set_enabled(request.data).await)
}

async fn set_precision(
    State(state): State<AppState>,
    Json(request): Json<PrecisionRequest>,
) -> Json<CommandResponse> {
    Json(state.router.set_precision(request.precision).await)
}

async fn selection_report(State(state): State<AppState>) -> Json<SelectionReport> {
    let selection = state.router.selection().snapshot();
    let planners = state
        .router
        .registry()
        .ids()
        .into_iter()
        .map(|id| PlannerInfo {
            active: id == selection.active,
            id,
        })
        .collect();
    Json(SelectionReport {
        selection,
        planners,
        handoffs: state.router.handoffs(),
    })
}

/// Stream forwarded status payloads as SSE `data:` events until shutdown.
///
/// Line breaks in a payload become separate `data:` lines, so a client joining
/// them with `\n` sees every `\r\n` or bare `\r` as `\n`.
async fn status_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.relay.subscribe();
    let shutdown = state.shutdown.clone();

    let stream = async_stream::stream! {
        loop {
            let received = tokio::select! {
                received = receiver.recv() => received,
                _ = shutdown.wait() => break,
            };
            match received {
                Ok(payload) => yield Ok(Event::default().data(sse_data(&payload))),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Status subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// SSE fields cannot carry a carriage return; fold every line ending to `\n`.
fn sse_data(payload: &str) -> String {
    payload.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carriage_returns_become_line_breaks() {
        assert_eq!(sse_data("a\r\nb"), "a\nb");
        assert_eq!(sse_data("a\rb"), "a\nb");
        assert_eq!(sse_data("a\r\rb\n"), "a\n\nb\n");
        assert_eq!(sse_data("plain"), "plain");
    }
}
