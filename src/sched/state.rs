//! Scheduler state
//!
//! Everything guarded by the scheduler lock: the categories, the order list,
//! the queue arena and the classifier. Methods here assume exclusive access;
//! `Scheduler` supplies the locking and the single-flight drive loop.

use tracing::{debug, error, trace, warn};

use super::category::{CATEGORY_COUNT, Category, CategoryKind, CategoryParams};
use super::classifier::{Classifier, FlowClass};
use super::event::QueueEvent;
use super::order::OrderList;
use super::stats::{CategorySnapshot, SchedStats};
use crate::config::SchedConfig;
use crate::error::{ConfigError, SchedError};
use crate::queue::{FlowId, Frame, QueueArena, QueueId, QueueState, TxQueue};

/// Frames a non-forced discard may drop in one call.
pub const DISCARD_QUANTUM: usize = 10;

/// Outcome of one selection.
#[derive(Debug)]
pub enum Selection {
    /// No active category finished its skip rotation.
    Idle,
    /// The candidate's credit threshold was not met.
    Held { kind: CategoryKind },
    /// The candidate was active but had no frames to give.
    Empty { kind: CategoryKind },
    /// The candidate was serviced.
    Served {
        kind: CategoryKind,
        queue: QueueId,
        frames: Vec<Frame>,
        bytes: u64,
        /// Reserve charged plus per-frame cost.
        credit: u32,
    },
}

impl Selection {
    pub fn consumed(&self) -> u32 {
        match self {
            Selection::Served { credit, .. } => *credit,
            _ => 0,
        }
    }

    pub fn kind(&self) -> Option<CategoryKind> {
        match self {
            Selection::Idle => None,
            Selection::Held { kind } | Selection::Empty { kind } | Selection::Served { kind, .. } => {
                Some(*kind)
            }
        }
    }

    pub fn frames(&self) -> &[Frame] {
        match self {
            Selection::Served { frames, .. } => frames,
            _ => &[],
        }
    }
}

#[derive(Debug)]
pub struct SchedState {
    categories: [Category; CATEGORY_COUNT],
    order: OrderList,
    queues: QueueArena,
    classifier: Classifier,
    max_credit: u32,
    stats: SchedStats,
}

impl SchedState {
    pub fn new(cfg: &SchedConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        for kind in cfg.unreachable_thresholds() {
            warn!(
                category = %kind,
                threshold = cfg.params(kind).credit_threshold,
                max_credit = cfg.max_credit,
                "credit threshold exceeds max credit; category will never be serviced"
            );
        }
        Ok(Self {
            categories: std::array::from_fn(|i| {
                let kind = CategoryKind::ALL[i];
                Category::new(kind, cfg.params(kind))
            }),
            order: OrderList::new(&cfg.order)?,
            queues: QueueArena::new(),
            classifier: Classifier::new(cfg.tid_map),
            max_credit: cfg.max_credit,
            stats: SchedStats::default(),
        })
    }

    pub fn category(&self, kind: CategoryKind) -> &Category {
        &self.categories[kind.index()]
    }

    #[cfg(test)]
    pub(crate) fn category_mut(&mut self, kind: CategoryKind) -> &mut Category {
        &mut self.categories[kind.index()]
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn order(&self) -> &OrderList {
        &self.order
    }

    pub fn queue(&self, id: QueueId) -> Option<&TxQueue> {
        self.queues.get(id)
    }

    pub fn stats(&self) -> &SchedStats {
        &self.stats
    }

    pub fn snapshot(&self) -> Vec<CategorySnapshot> {
        self.categories.iter().map(CategorySnapshot::from).collect()
    }

    /// Frames held by linked queues across all categories.
    pub fn pending_frames(&self) -> usize {
        self.categories.iter().map(Category::frame_count).sum()
    }

    pub fn create_queue(&mut self, flow: FlowId, class: FlowClass) -> QueueId {
        let kind = self.classifier.classify(class);
        let id = self.queues.insert(flow, kind);
        debug!(queue = %id, flow = flow.0, category = %kind, "queue created");
        id
    }

    /// Release a queue. Linked queues must be torn down or paused first.
    pub fn destroy_queue(&mut self, id: QueueId) -> Result<TxQueue, SchedError> {
        let q = self.queues.get(id).ok_or(SchedError::UnknownQueue(id))?;
        if q.is_linked() {
            return Err(SchedError::QueueLinked(id));
        }
        self.queues.remove(id).ok_or(SchedError::UnknownQueue(id))
    }

    pub fn update_params(&mut self, kind: CategoryKind, params: CategoryParams) -> Result<(), ConfigError> {
        params.validate(kind)?;
        if params.credit_threshold > self.max_credit {
            warn!(
                category = %kind,
                threshold = params.credit_threshold,
                max_credit = self.max_credit,
                "credit threshold exceeds max credit; category will never be serviced"
            );
        }
        self.categories[kind.index()].params = params;
        debug!(category = %kind, ?params, "category params updated");
        Ok(())
    }

    pub fn set_tid_category(&mut self, tid: u8, kind: CategoryKind) -> Result<(), ConfigError> {
        self.classifier.set(tid, kind)
    }

    /// Apply a queue lifecycle event. Returns the number of frames it touched.
    pub fn notify(&mut self, id: QueueId, event: QueueEvent) -> Result<usize, SchedError> {
        let q = self.queues.get_mut(id).ok_or(SchedError::UnknownQueue(id))?;
        if q.state() == QueueState::TornDown {
            return Err(SchedError::QueueTornDown(id));
        }
        let kind = q.category();
        let cat = &mut self.categories[kind.index()];
        trace!(queue = %id, category = %kind, event = event.name(), "notify");

        let touched = match event {
            QueueEvent::Enqueued(frame) => {
                if frame.flow != q.flow() {
                    return Err(SchedError::FlowMismatch {
                        queue: id,
                        expected: q.flow(),
                        got: frame.flow,
                    });
                }
                let bytes = frame.bytes();
                q.enqueue(frame);
                if !q.is_paused() {
                    cat.link_queue(q, 1, bytes);
                }
                1
            }
            QueueEvent::Deactivated => {
                if q.is_paused() {
                    return Err(SchedError::AlreadyPaused(id));
                }
                q.set_paused(true);
                if q.is_linked() {
                    cat.unlink_queue(q)?;
                }
                q.frame_count()
            }
            QueueEvent::Reactivated => {
                if !q.is_paused() {
                    return Err(SchedError::NotPaused(id));
                }
                q.set_paused(false);
                let (frames, bytes) = (q.frame_count(), q.byte_count());
                if frames > 0 {
                    cat.link_queue(q, frames, bytes);
                }
                frames
            }
            QueueEvent::Discarded { frames } => {
                let (n, bytes) = q.drop_front(frames);
                if q.is_linked() {
                    cat.take(n, bytes);
                    if q.is_empty() {
                        cat.unlink_queue(q)?;
                    }
                }
                self.stats.discarded_frames += n as u64;
                n
            }
            QueueEvent::TornDown => {
                if q.is_linked() {
                    cat.unlink_queue(q)?;
                }
                let (n, _) = q.flush();
                q.set_state(QueueState::TornDown);
                debug!(queue = %id, flushed = n, "queue torn down");
                n
            }
        };
        debug_assert!(self.check_invariants().is_ok());
        Ok(touched)
    }

    /// Pick one category and take up to its send limit from its head queue.
    pub fn select<C>(&mut self, credit: u32, cost: C) -> Selection
    where
        C: Fn(&Frame) -> u32,
    {
        let mut candidate = None;
        for kind in self.order.from_cursor() {
            let cat = &mut self.categories[kind.index()];
            if !cat.is_active() {
                continue;
            }
            cat.rr_count = cat.rr_count.saturating_add(1);
            if cat.rr_count < cat.params.skip_weight {
                trace!(category = %kind, rr = cat.rr_count, skip_weight = cat.params.skip_weight, "deferred");
                if let Some(pos) = self.order.position(kind) {
                    self.order.rotate_to_tail(pos);
                }
                continue;
            }
            candidate = Some(kind);
            break;
        }

        let Some(kind) = candidate else {
            return Selection::Idle;
        };
        let cat = &mut self.categories[kind.index()];
        if credit < cat.params.credit_threshold {
            cat.rr_count = cat.rr_count.saturating_sub(1);
            self.stats.backpressure += 1;
            debug!(category = %kind, credit, threshold = cat.params.credit_threshold, "held by credit threshold");
            return Selection::Held { kind };
        }

        cat.rr_count = 0;
        if let Some(pos) = self.order.position(kind) {
            self.order.rotate_to_tail(pos);
            let next = if pos + 1 == self.order.len() { 0 } else { pos };
            self.order.set_cursor(next);
        }

        let queue = match cat.pop_head() {
            Some(id) => id,
            None => {
                error!(category = %kind, frames = cat.frame_count(), "active category has no queue");
                cat.resync(0, 0);
                self.stats.anomalies += 1;
                return Selection::Empty { kind };
            }
        };
        if !self.queues.get(queue).is_some_and(|q| !q.is_empty()) {
            error!(category = %kind, queue = %queue, "active category selected an empty queue");
            if let Some(q) = self.queues.get_mut(queue) {
                q.set_state(QueueState::Idle);
            }
            let (frames, bytes) = cat
                .active_queues()
                .filter_map(|id| self.queues.get(id))
                .fold((0, 0), |(f, b), q| (f + q.frame_count(), b + q.byte_count()));
            cat.resync(frames, bytes);
            self.stats.anomalies += 1;
            return Selection::Empty { kind };
        }
        let Some(q) = self.queues.get_mut(queue) else {
            return Selection::Empty { kind };
        };

        let reserve = cat.params.credit_reserve.min(credit);
        let out = q.dequeue_up_to(cat.params.send_limit as usize, credit - reserve, &cost);
        cat.take(out.len(), out.bytes);
        if q.is_empty() {
            q.set_state(QueueState::Idle);
        } else {
            cat.push_head(queue);
        }

        let consumed = reserve + out.credit;
        self.stats.selections += 1;
        self.stats.dispatched_frames += out.len() as u64;
        self.stats.dispatched_bytes += out.bytes;
        self.stats.credit_used += consumed as u64;
        debug!(
            category = %kind,
            queue = %queue,
            frames = out.len(),
            credit,
            consumed,
            "category serviced"
        );
        debug_assert!(self.check_invariants().is_ok());

        Selection::Served {
            kind,
            queue,
            bytes: out.bytes,
            frames: out.frames,
            credit: consumed,
        }
    }

    /// Category with the strictly highest `frame_count * discard_weight`;
    /// the lowest index wins ties. `None` when every category is empty.
    pub fn select_discard_category(&self) -> Option<CategoryKind> {
        let mut best: Option<(CategoryKind, u64)> = None;
        for cat in &self.categories {
            let score = (cat.frame_count() as u64).saturating_mul(cat.params().discard_weight as u64);
            if score > 0 && best.is_none_or(|(_, s)| score > s) {
                best = Some((cat.kind(), score));
            }
        }
        best.map(|(kind, _)| kind)
    }

    /// Longest queue of `kind`; the earliest linked wins ties.
    pub fn select_discard_queue(&self, kind: CategoryKind) -> Option<QueueId> {
        let mut best: Option<(QueueId, usize)> = None;
        for id in self.categories[kind.index()].active_queues() {
            let Some(q) = self.queues.get(id) else {
                continue;
            };
            if best.is_none_or(|(_, n)| q.frame_count() > n) {
                best = Some((id, q.frame_count()));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Shed backlog from the head of the heaviest queue of the heaviest category.
    ///
    /// Without `force` at most `DISCARD_QUANTUM` frames and at most half the
    /// queue go, except that a single remaining frame may be dropped.
    #[tracing::instrument(skip(self))]
    pub fn discard(&mut self, requested: usize, force: bool) -> usize {
        if requested == 0 {
            return 0;
        }
        let Some(kind) = self.select_discard_category() else {
            trace!("nothing to discard");
            return 0;
        };
        let Some(id) = self.select_discard_queue(kind) else {
            return 0;
        };
        let cat = &mut self.categories[kind.index()];
        let Some(q) = self.queues.get_mut(id) else {
            return 0;
        };

        let have = q.frame_count();
        let n = if force {
            requested.min(have)
        } else if have == 1 {
            1
        } else {
            requested.min(DISCARD_QUANTUM).min(have / 2)
        };
        let (n, bytes) = q.drop_front(n);
        cat.take(n, bytes);
        if q.is_empty() {
            if let Err(err) = cat.unlink_queue(q) {
                error!(%err, category = %kind, "discard left a dangling queue");
            }
        }
        self.stats.discarded_frames += n as u64;
        debug!(category = %kind, queue = %id, discarded = n, remaining = have - n, "discarded");
        debug_assert!(self.check_invariants().is_ok());
        n
    }

    /// Verify the aggregate counters and link state of every category.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut listed = 0usize;
        for cat in &self.categories {
            let kind = cat.kind();
            let mut frames = 0usize;
            let mut bytes = 0u64;
            for id in cat.active_queues() {
                let q = self
                    .queues
                    .get(id)
                    .ok_or_else(|| format!("{kind}: lists missing queue {id}"))?;
                if !q.is_linked() {
                    return Err(format!("{kind}: lists unlinked queue {id}"));
                }
                if q.category() != kind {
                    return Err(format!("{kind}: lists queue {id} of {}", q.category()));
                }
                if q.is_paused() {
                    return Err(format!("{kind}: lists paused queue {id}"));
                }
                frames += q.frame_count();
                bytes += q.byte_count();
                listed += 1;
            }
            if frames != cat.frame_count() || bytes != cat.byte_count() {
                return Err(format!(
                    "{kind}: counters {}/{} but queues hold {frames}/{bytes}",
                    cat.frame_count(),
                    cat.byte_count()
                ));
            }
            if cat.is_active() != (cat.frame_count() > 0) {
                return Err(format!(
                    "{kind}: active={} with {} frames",
                    cat.is_active(),
                    cat.frame_count()
                ));
            }
        }
        let linked = self.queues.iter().filter(|q| q.is_linked()).count();
        if linked != listed {
            return Err(format!("{linked} queues linked but {listed} listed"));
        }
        Ok(())
    }
}
