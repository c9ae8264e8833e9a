//! Command routing: select, enable and precision requests forwarded to the
//! active planner.
//!
//! Selection state is only ever touched in short critical sections; every
//! downstream call runs after the lock is released. A switch therefore
//! commits the new active planner before its handoff calls complete, and two
//! concurrent switches may interleave their downstream calls.

mod handoff;

pub use handoff::{HandoffLog, HandoffOutcome, HandoffRecord};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Instrument;

use crate::backend::{BackendRegistry, CallError, Selection, SelectionState};

/// Errors a command can end in. None of them is fatal to the router.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The active planner is not in the registry.
    #[error("Unknown planner '{backend}'")]
    UnknownBackend { backend: String },

    /// One side of a switch could not be resolved.
    #[error("Error finding services for '{backend}'")]
    BackendResolutionFailed { backend: String },

    /// A downstream call failed.
    #[error("Error {operation} '{backend}': {source}")]
    BackendCallFailed {
        backend: String,
        operation: &'static str,
        #[source]
        source: CallError,
    },
}

/// Reply to every inbound command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    pub message: String,
}

/// Forwards control commands to whichever planner is active.
#[derive(Clone)]
pub struct CommandRouter {
    registry: BackendRegistry,
    selection: SelectionState,
    handoffs: HandoffLog,
    report_failures: bool,
}

impl CommandRouter {
    pub fn new(registry: BackendRegistry, selection: SelectionState) -> Self {
        Self {
            registry,
            selection,
            handoffs: HandoffLog::new(32),
            report_failures: true,
        }
    }

    /// Keep at most `limit` handoff records.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.handoffs = HandoffLog::new(limit);
        self
    }

    /// When false, failed commands still answer `success = true` and only the
    /// message describes the failure.
    pub fn with_report_failures(mut self, report_failures: bool) -> Self {
        self.report_failures = report_failures;
        self
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn handoffs(&self) -> Vec<HandoffRecord> {
        self.handoffs.records()
    }

    /// Make `planner` active and hand the previous planner's intent over.
    ///
    /// The target is checked against the registry in the same critical
    /// section that swaps it in, so an unknown name leaves the selection
    /// untouched and calls no planner. Once swapped, the selection stays on
    /// `planner` even if the handoff fails part way.
    pub async fn select_backend(&self, planner: &str) -> CommandResponse {
        let span = tracing::info_span!(
            "select_planner",
            request_id = %uuid::Uuid::new_v4(),
            planner = %planner
        );
        async {
            let registry = &self.registry;
            let Some(previous) = self
                .selection
                .swap_active(planner, |id| registry.contains(id))
            else {
                let err = CommandError::BackendResolutionFailed {
                    backend: planner.to_string(),
                };
                self.handoffs.push(HandoffRecord::new(
                    self.selection.active(),
                    planner,
                    HandoffOutcome::Unresolved,
                ));
                return self.respond(Err(err), String::new());
            };

            let result = self.handoff(&previous, planner).await;
            let outcome = match &result {
                Ok(()) => {
                    tracing::info!(
                        from = %previous.active,
                        to = %planner,
                        enabled = previous.enabled,
                        precision = previous.precision,
                        "Planner switched"
                    );
                    HandoffOutcome::Completed
                }
                Err(CommandError::BackendResolutionFailed { .. }) => HandoffOutcome::Unresolved,
                Err(err) => HandoffOutcome::Failed(err.to_string()),
            };
            self.handoffs
                .push(HandoffRecord::new(previous.active.clone(), planner, outcome));

            self.respond(
                result,
                format!("Selected {} (was {})", planner, previous.active),
            )
        }
        .instrument(span)
        .await
    }

    /// Disable the old planner, then enable the new one with the previous
    /// flag and precision. Stops at the first failure.
    async fn handoff(&self, previous: &Selection, planner: &str) -> Result<(), CommandError> {
        let resolve = |id: &str| {
            self.registry
                .lookup(id)
                .map_err(|_| CommandError::BackendResolutionFailed {
                    backend: id.to_string(),
                })
        };
        let old = resolve(&previous.active)?;
        let new = resolve(planner)?;

        old.service
            .set_enabled(false)
            .await
            .map_err(|source| CommandError::BackendCallFailed {
                backend: previous.active.clone(),
                operation: "disabling",
                source,
            })?;

        new.service
            .set_enabled(previous.enabled)
            .await
            .map_err(|source| CommandError::BackendCallFailed {
                backend: planner.to_string(),
                operation: "enabling",
                source,
            })?;

        new.service
            .set_precision(previous.precision)
            .await
            .map_err(|source| CommandError::BackendCallFailed {
                backend: planner.to_string(),
                operation: "setting precision of",
                source,
            })?;

        Ok(())
    }

    /// Forward an enable/disable request to the active planner.
    ///
    /// The recorded flag changes only after the planner acknowledged it.
    pub async fn set_enabled(&self, enabled: bool) -> CommandResponse {
        let active = self.selection.active();
        let span = tracing::info_span!(
            "set_enabled",
            request_id = %uuid::Uuid::new_v4(),
            planner = %active,
            enabled
        );
        async {
            let result = async {
                let backend =
                    self.registry
                        .lookup(&active)
                        .map_err(|_| CommandError::UnknownBackend {
                            backend: active.clone(),
                        })?;
                backend.service.set_enabled(enabled).await.map_err(|source| {
                    CommandError::BackendCallFailed {
                        backend: active.clone(),
                        operation: if enabled { "enabling" } else { "disabling" },
                        source,
                    }
                })?;
                self.selection.set_enabled(enabled);
                Ok::<(), CommandError>(())
            }
            .await;

            let verb = if enabled { "Enabled" } else { "Disabled" };
            self.respond(result, format!("{} {}", verb, active))
        }
        .instrument(span)
        .await
    }

    /// Forward a precision value to the active planner.
    ///
    /// The value is passed through unchecked; the recorded precision changes
    /// only after the planner acknowledged it.
    pub async fn set_precision(&self, precision: f64) -> CommandResponse {
        let active = self.selection.active();
        let span = tracing::info_span!(
            "set_precision",
            request_id = %uuid::Uuid::new_v4(),
            planner = %active,
            precision
        );
        async {
            let result = async {
                let backend =
                    self.registry
                        .lookup(&active)
                        .map_err(|_| CommandError::UnknownBackend {
                            backend: active.clone(),
                        })?;
                backend
                    .service
                    .set_precision(precision)
                    .await
                    .map_err(|source| CommandError::BackendCallFailed {
                        backend: active.clone(),
                        operation: "setting precision of",
                        source,
                    })?;
                self.selection.set_precision(precision);
                Ok::<(), CommandError>(())
            }
            .await;

            self.respond(result, format!("Set precision for {}", active))
        }
        .instrument(span)
        .await
    }

    fn respond(&self, result: Result<(), CommandError>, ok_message: String) -> CommandResponse {
        match result {
            Ok(()) => CommandResponse {
                success: true,
                message: ok_message,
            },
            Err(err) => {
                tracing::error!(error = %err, "Command failed");
                CommandResponse {
                    success: !self.report_failures,
                    message: err.to_string(),
                }
            }
        }
    }
}
