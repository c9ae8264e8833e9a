//! Status relay: fan-in from every planner, fan-out of the active one.
//!
//! Each planner's status stream is read by its own [`StatusListener`], which
//! tags events with the planner id it was built for. The relay forwards an
//! event only if that id is active at the moment the event is evaluated.

mod listener;
mod sse;

pub use listener::StatusListener;
pub use sse::SseDecoder;

use tokio::sync::broadcast;

use crate::backend::SelectionState;

/// One status payload and the planner it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub source: String,
    pub payload: String,
}

impl StatusEvent {
    pub fn new(source: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            payload: payload.into(),
        }
    }
}

/// Filters status events down to the active planner's.
///
/// Forwarded payloads go to a broadcast channel; subscribers that fall behind
/// lose the oldest payloads rather than slowing the relay down.
#[derive(Clone)]
pub struct StatusRelay {
    selection: SelectionState,
    sink: broadcast::Sender<String>,
}

impl StatusRelay {
    pub fn new(selection: SelectionState, capacity: usize) -> Self {
        let (sink, _) = broadcast::channel(capacity.max(1));
        Self { selection, sink }
    }

    /// Receive every payload forwarded from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sink.subscribe()
    }

    /// Forward or drop one event. Returns whether it was forwarded.
    pub fn relay(&self, event: StatusEvent) -> bool {
        if !self.selection.is_active(&event.source) {
            tracing::trace!(planner = %event.source, "Dropping status from inactive planner");
            return false;
        }

        if self.sink.send(event.payload).is_err() {
            tracing::trace!(planner = %event.source, "No status subscribers");
        }
        true
    }

    /// Build the listener for one planner's status stream.
    pub fn listener(
        &self,
        planner: impl Into<String>,
        status_source: impl Into<String>,
    ) -> StatusListener {
        StatusListener::new(planner, status_source, self.clone())
    }
}
