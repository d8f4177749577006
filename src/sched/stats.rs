//! Scheduler statistics

use serde::Serialize;

use super::category::{Category, CategoryKind};

/// Running counters, updated under the scheduler lock.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SchedStats {
    pub dispatched_frames: u64,
    pub dispatched_bytes: u64,
    pub credit_used: u64,
    pub selections: u64,
    /// Selections held back because credit was below the candidate's threshold.
    pub backpressure: u64,
    pub discarded_frames: u64,
    /// Active categories found without a queue to serve.
    pub anomalies: u64,
    /// `run` calls that returned early because another drain was in progress.
    /// Counted by `Scheduler` outside the lock; zero in `SchedState::stats`.
    pub busy_runs: u64,
}

/// Point-in-time view of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySnapshot {
    pub kind: CategoryKind,
    pub active: bool,
    pub frame_count: usize,
    pub byte_count: u64,
    pub round_robin_count: u32,
    pub queues: usize,
}

impl From<&Category> for CategorySnapshot {
    fn from(c: &Category) -> Self {
        Self {
            kind: c.kind(),
            active: c.is_active(),
            frame_count: c.frame_count(),
            byte_count: c.byte_count(),
            round_robin_count: c.round_robin_count(),
            queues: c.queue_len(),
        }
    }
}
