use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerCounters {
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Shared run counters, cheap to clone across workers and the reporter.
/// `total` is fixed when the run starts; `completed` and `failed` move as
/// workers make progress.
#[derive(Debug, Clone)]
pub struct RunCounters {
    inner: Arc<InnerCounters>,
    total: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct CountersSnapshot {
    pub completed: u64,
    pub failed: u64,
    pub total: u64,
}

impl RunCounters {
    pub fn new(total: u64) -> Self {
        RunCounters {
            inner: Arc::new(InnerCounters::default()),
            total,
        }
    }

    pub fn increment_completed(&self) {
        self.inner.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.inner.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            completed: self.inner.completed.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
            total: self.total,
        }
    }
}

impl CountersSnapshot {
    /// Statements that reached a terminal state, successfully or not.
    pub fn done(&self) -> u64 {
        self.completed + self.failed
    }

    /// Failures as a percentage of the whole run.
    pub fn failure_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.failed as f64 / self.total as f64) * 100.0
    }
}
