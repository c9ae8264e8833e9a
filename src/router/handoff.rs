//! Bounded log of planner switches.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::Serialize;

/// How far a handoff got.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "detail")]
pub enum HandoffOutcome {
    Completed,
    /// The target could not be resolved; nothing was switched.
    Unresolved,
    /// A downstream call failed; later steps were skipped.
    Failed(String),
}

/// One switch, as recorded after its downstream calls settled.
#[derive(Debug, Clone, Serialize)]
pub struct HandoffRecord {
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub from: String,
    pub to: String,
    pub outcome: HandoffOutcome,
}

impl HandoffRecord {
    pub fn new(from: impl Into<String>, to: impl Into<String>, outcome: HandoffOutcome) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            timestamp,
            from: from.into(),
            to: to.into(),
            outcome,
        }
    }
}

#[derive(Clone)]
pub struct HandoffLog {
    entries: Arc<Mutex<VecDeque<HandoffRecord>>>,
    limit: usize,
}

impl HandoffLog {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(limit))),
            limit,
        }
    }

    pub fn push(&self, record: HandoffRecord) {
        if self.limit == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.limit {
            entries.pop_front();
        }
        entries.push_back(record);
    }

    /// Oldest first.
    pub fn records(&self) -> Vec<HandoffRecord> {
        self.entries.lock().iter().cloned().collect()
    }
}
