//! Planner registry, selection state and downstream calls.
//!
//! The registry is fixed at startup; the selection state is the single
//! shared record of which planner is active.

mod client;
mod registry;
mod state;

pub use client::{build_http_client, CallError, HttpPlanner, PlannerService};
pub use registry::{BackendDescriptor, BackendError, BackendRegistry, RegisteredBackend};
pub use state::{Selection, SelectionState};
