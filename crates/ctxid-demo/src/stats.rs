//! Background job counters.
//!
//! Relaxed atomics: display counters only, nothing synchronizes on them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

#[derive(Default)]
struct StatsInner {
    jobs_started: AtomicU64,
    jobs_completed: AtomicU64,
}

/// Thread-safe job statistics. Cheap to clone (Arc).
#[derive(Clone, Default)]
pub struct JobStats {
    inner: Arc<StatsInner>,
}

/// Snapshot of current stats values, serializable to JSON.
#[derive(Debug, Serialize)]
pub struct StatsSnapshot {
    pub jobs_started: u64,
    pub jobs_completed: u64,
}

impl JobStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_started(&self) {
        self.inner.jobs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn job_completed(&self) {
        self.inner.jobs_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            jobs_started: self.inner.jobs_started.load(Ordering::Relaxed),
            jobs_completed: self.inner.jobs_completed.load(Ordering::Relaxed),
        }
    }
}
