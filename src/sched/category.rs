//! Traffic categories
//!
//! A category aggregates the active queues of one traffic class and carries
//! the tuning that drives selection and discard.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SchedError};
use crate::queue::{QueueId, QueueState, TxQueue};

pub const CATEGORY_COUNT: usize = 8;

/// The fixed set of traffic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Voice,
    Video,
    BestEffort,
    Background,
    NonQos,
    UnicastMgmt,
    MulticastData,
    MulticastMgmt,
}

impl CategoryKind {
    /// All kinds in index order.
    pub const ALL: [CategoryKind; CATEGORY_COUNT] = [
        CategoryKind::Voice,
        CategoryKind::Video,
        CategoryKind::BestEffort,
        CategoryKind::Background,
        CategoryKind::NonQos,
        CategoryKind::UnicastMgmt,
        CategoryKind::MulticastData,
        CategoryKind::MulticastMgmt,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            CategoryKind::Voice => "voice",
            CategoryKind::Video => "video",
            CategoryKind::BestEffort => "best_effort",
            CategoryKind::Background => "background",
            CategoryKind::NonQos => "non_qos",
            CategoryKind::UnicastMgmt => "unicast_mgmt",
            CategoryKind::MulticastData => "multicast_data",
            CategoryKind::MulticastMgmt => "multicast_mgmt",
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-category scheduling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryParams {
    /// Visits needed before the category is serviced once.
    pub skip_weight: u32,
    /// Minimum credit that must be available to service the category.
    pub credit_threshold: u32,
    /// Maximum frames taken per serviced turn.
    pub send_limit: u32,
    /// Fixed credit charged per serviced turn.
    #[serde(default)]
    pub credit_reserve: u32,
    /// Multiplier on backlog when picking a category to shed under congestion.
    pub discard_weight: u32,
}

impl Default for CategoryParams {
    fn default() -> Self {
        Self {
            skip_weight: 1,
            credit_threshold: 0,
            send_limit: 1,
            credit_reserve: 0,
            discard_weight: 1,
        }
    }
}

impl CategoryParams {
    pub fn validate(&self, kind: CategoryKind) -> Result<(), ConfigError> {
        if self.skip_weight == 0 {
            return Err(ConfigError::ZeroSkipWeight(kind));
        }
        if self.send_limit == 0 {
            return Err(ConfigError::ZeroSendLimit(kind));
        }
        if self.discard_weight == 0 {
            return Err(ConfigError::ZeroDiscardWeight(kind));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Category {
    kind: CategoryKind,
    pub(crate) params: CategoryParams,
    pub(crate) rr_count: u32,
    active_queues: VecDeque<QueueId>,
    frame_count: usize,
    byte_count: u64,
    active: bool,
}

impl Category {
    pub fn new(kind: CategoryKind, params: CategoryParams) -> Self {
        Self {
            kind,
            params,
            rr_count: 0,
            active_queues: VecDeque::new(),
            frame_count: 0,
            byte_count: 0,
            active: false,
        }
    }

    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    pub fn params(&self) -> &CategoryParams {
        &self.params
    }

    pub fn round_robin_count(&self) -> u32 {
        self.rr_count
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    pub fn active_queues(&self) -> impl Iterator<Item = QueueId> + '_ {
        self.active_queues.iter().copied()
    }

    pub fn queue_len(&self) -> usize {
        self.active_queues.len()
    }

    /// Link `q` (if not already linked) and account `frames`/`bytes` newly
    /// attributed to it. A linked queue can still receive frames, so the
    /// counts are added either way.
    pub(crate) fn link_queue(&mut self, q: &mut TxQueue, frames: usize, bytes: u64) {
        if !q.is_linked() {
            self.active_queues.push_back(q.id());
            q.set_state(QueueState::Linked);
        }
        self.frame_count = self.frame_count.saturating_add(frames);
        self.byte_count = self.byte_count.saturating_add(bytes);
        self.recompute_active();
    }

    /// Remove `q` from the active list and withdraw whatever it still holds.
    pub(crate) fn unlink_queue(&mut self, q: &mut TxQueue) -> Result<(), SchedError> {
        if !q.is_linked() {
            return Err(SchedError::NotLinked(q.id()));
        }
        if let Some(pos) = self.active_queues.iter().position(|&id| id == q.id()) {
            self.active_queues.remove(pos);
        }
        q.set_state(QueueState::Idle);
        self.frame_count = self.frame_count.saturating_sub(q.frame_count());
        self.byte_count = self.byte_count.saturating_sub(q.byte_count());
        self.recompute_active();
        Ok(())
    }

    /// Account frames that left a linked queue (dispatch or discard).
    pub(crate) fn take(&mut self, frames: usize, bytes: u64) {
        self.frame_count = self.frame_count.saturating_sub(frames);
        self.byte_count = self.byte_count.saturating_sub(bytes);
        self.recompute_active();
    }

    pub(crate) fn pop_head(&mut self) -> Option<QueueId> {
        self.active_queues.pop_front()
    }

    pub(crate) fn push_head(&mut self, id: QueueId) {
        self.active_queues.push_front(id);
    }

    /// Overwrite the aggregate counters after an inconsistency was detected.
    pub(crate) fn resync(&mut self, frames: usize, bytes: u64) {
        self.frame_count = frames;
        self.byte_count = bytes;
        self.recompute_active();
    }

    pub(crate) fn recompute_active(&mut self) {
        self.active = self.frame_count > 0;
    }
}
