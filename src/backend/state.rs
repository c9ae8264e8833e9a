//! Shared record of which planner is active.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

/// Copy of the selection taken under the lock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub active: String,
    pub enabled: bool,
    pub precision: f64,
}

/// Lock-guarded selection shared by the command router and status relay.
///
/// Every read and write goes through one mutex and touches only these three
/// fields; callers must never hold the guard across a downstream call, so no
/// method hands the guard out.
#[derive(Clone)]
pub struct SelectionState {
    inner: Arc<Mutex<Selection>>,
}

impl SelectionState {
    /// Initial selection: `enabled` always starts false.
    pub fn new(active: impl Into<String>, precision: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Selection {
                active: active.into(),
                enabled: false,
                precision,
            })),
        }
    }

    pub fn snapshot(&self) -> Selection {
        self.inner.lock().clone()
    }

    pub fn active(&self) -> String {
        self.inner.lock().active.clone()
    }

    /// Compare against the active id without cloning it.
    pub fn is_active(&self, id: &str) -> bool {
        self.inner.lock().active == id
    }

    /// Read the current selection and make `new_active` active in one
    /// critical section, provided `accept` approves the new id.
    ///
    /// Returns the selection as it was before the swap, or `None` (with the
    /// state untouched) when `accept` refuses.
    pub fn swap_active<F>(&self, new_active: &str, accept: F) -> Option<Selection>
    where
        F: FnOnce(&str) -> bool,
    {
        let mut guard = self.inner.lock();
        if !accept(new_active) {
            return None;
        }
        let previous = guard.clone();
        guard.active = new_active.to_string();
        Some(previous)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.lock().enabled = enabled;
    }

    pub fn set_precision(&self, precision: f64) {
        self.inner.lock().precision = precision;
    }
}
