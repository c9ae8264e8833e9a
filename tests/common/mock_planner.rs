//! Mock planner server: records control calls and serves a status stream.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Mutex};

/// A control call as the planner saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerCall {
    Enable(bool),
    Precision(f64),
}

#[derive(Clone)]
struct MockState {
    calls: Arc<Mutex<Vec<PlannerCall>>>,
    failing: Arc<AtomicBool>,
    status: broadcast::Sender<String>,
}

pub struct MockPlanner {
    pub addr: SocketAddr,
    state: MockState,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl MockPlanner {
    /// Start a new mock planner on an ephemeral port.
    pub async fn start() -> Self {
        let (status, _) = broadcast::channel(16);
        let state = MockState {
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
            status,
        };

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let app = Router::new()
            .route("/enabled", post(handle_enabled))
            .route("/precision", post(handle_precision))
            .route("/status", get(handle_status))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock planner");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        Self {
            addr,
            state,
            shutdown: shutdown_tx,
        }
    }

    pub fn enabled_url(&self) -> String {
        format!("http://{}/enabled", self.addr)
    }

    pub fn precision_url(&self) -> String {
        format!("http://{}/precision", self.addr)
    }

    pub fn status_url(&self) -> String {
        format!("http://{}/status", self.addr)
    }

    /// Make every control call answer 500 (still recorded).
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<PlannerCall> {
        self.state.calls.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.state.calls.lock().await.clear();
    }

    /// Push a status payload to every connected stream.
    pub fn publish(&self, payload: &str) {
        let _ = self.state.status.send(payload.to_string());
    }

    /// Wait until something is reading the status stream.
    pub async fn wait_for_status_subscriber(&self, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            if self.state.status.receiver_count() > 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

impl Drop for MockPlanner {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

fn reply(state: &MockState) -> (StatusCode, Json<Value>) {
    if state.failing.load(Ordering::SeqCst) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"success": false})),
        )
    } else {
        (StatusCode::OK, Json(serde_json::json!({"success": true})))
    }
}

async fn handle_enabled(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let flag = body["data"].as_bool().unwrap_or_default();
    state.calls.lock().await.push(PlannerCall::Enable(flag));
    reply(&state)
}

async fn handle_precision(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let precision = body["precision"].as_f64().unwrap_or_default();
    state.calls.lock().await.push(PlannerCall::Precision(precision));
    reply(&state)
}

async fn handle_status(
    State(state): State<MockState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.status.subscribe();
    let stream = async_stream::stream! {
        while let Ok(payload) = receiver.recv().await {
            yield Ok(Event::default().data(payload));
        }
    };
    Sse::new(stream)
}
