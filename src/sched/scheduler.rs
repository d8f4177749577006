//! Shared scheduler handle
//!
//! Producers call `enqueue`/`notify` from any thread; one consumer drives
//! `run` whenever credit arrives. All state sits behind a single lock that is
//! taken per operation and never held while the dispatcher sends.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info};

use super::category::{CategoryKind, CategoryParams};
use super::classifier::FlowClass;
use super::dispatcher::Dispatcher;
use super::event::QueueEvent;
use super::state::{SchedState, Selection};
use super::stats::{CategorySnapshot, SchedStats};
use crate::config::SchedConfig;
use crate::error::{ConfigError, SchedError};
use crate::queue::{FlowId, Frame, QueueId, TxQueue};

#[derive(Debug)]
pub struct Scheduler {
    state: Mutex<SchedState>,
    running: AtomicBool,
    /// Kept outside the lock so a nested `run` never touches it.
    busy_runs: AtomicU64,
}

/// Clears the running flag when the drive loop exits, including by unwinding.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Scheduler {
    pub fn new(cfg: &SchedConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            state: Mutex::new(SchedState::new(cfg)?),
            running: AtomicBool::new(false),
            busy_runs: AtomicU64::new(0),
        })
    }

    pub fn create_queue(&self, flow: FlowId, class: FlowClass) -> QueueId {
        self.state.lock().create_queue(flow, class)
    }

    pub fn destroy_queue(&self, id: QueueId) -> Result<TxQueue, SchedError> {
        self.state.lock().destroy_queue(id)
    }

    pub fn enqueue(&self, id: QueueId, frame: Frame) -> Result<(), SchedError> {
        self.notify(id, QueueEvent::Enqueued(frame)).map(|_| ())
    }

    pub fn notify(&self, id: QueueId, event: QueueEvent) -> Result<usize, SchedError> {
        self.state.lock().notify(id, event)
    }

    /// One selection against `credit`, outside of any drive loop.
    ///
    /// `dispatcher.credit_cost` runs with the scheduler lock held.
    pub fn select<D: Dispatcher>(&self, credit: u32, dispatcher: &D) -> Selection {
        self.state.lock().select(credit, |f| dispatcher.credit_cost(f))
    }

    /// Drain up to `total_credit` worth of frames and hand them to
    /// `dispatcher` in one batch. Returns the number of frames dispatched.
    ///
    /// A call made while another drain is in progress returns 0 immediately
    /// without taking the lock, including one made from inside
    /// `dispatcher.credit_cost` or `dispatcher.send`.
    #[tracing::instrument(skip(self, dispatcher))]
    pub fn run<D: Dispatcher>(&self, total_credit: u32, dispatcher: &mut D) -> usize {
        if self
            .running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.busy_runs.fetch_add(1, Ordering::Relaxed);
            debug!("drain already in progress");
            return 0;
        }
        let _guard = RunGuard(&self.running);

        let mut remaining = total_credit;
        let mut batch = Vec::new();
        let mut selections = 0usize;
        while remaining > 0 {
            let sel = self
                .state
                .lock()
                .select(remaining, |f| dispatcher.credit_cost(f));
            let Selection::Served { frames, credit, .. } = sel else {
                break;
            };
            selections += 1;
            batch.extend(frames);
            if credit == 0 {
                break;
            }
            remaining = remaining.saturating_sub(credit);
        }

        let sent = batch.len();
        if !batch.is_empty() {
            dispatcher.send(batch);
        }
        info!(
            total_credit,
            used = total_credit - remaining,
            selections,
            frames = sent,
            "drain complete"
        );
        sent
    }

    /// Shed up to `count` frames under congestion. Returns frames dropped.
    pub fn request_discard(&self, count: usize, force: bool) -> usize {
        self.state.lock().discard(count, force)
    }

    pub fn select_discard_category(&self) -> Option<CategoryKind> {
        self.state.lock().select_discard_category()
    }

    pub fn update_params(&self, kind: CategoryKind, params: CategoryParams) -> Result<(), ConfigError> {
        self.state.lock().update_params(kind, params)
    }

    /// Re-map a TID. Queues created earlier keep their category.
    pub fn set_tid_category(&self, tid: u8, kind: CategoryKind) -> Result<(), ConfigError> {
        self.state.lock().set_tid_category(tid, kind)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> SchedStats {
        let mut stats = self.state.lock().stats().clone();
        stats.busy_runs = self.busy_runs.load(Ordering::Relaxed);
        stats
    }

    pub fn snapshot(&self) -> Vec<CategorySnapshot> {
        self.state.lock().snapshot()
    }

    pub fn category(&self, kind: CategoryKind) -> CategorySnapshot {
        CategorySnapshot::from(self.state.lock().category(kind))
    }

    pub fn order(&self) -> Vec<CategoryKind> {
        self.state.lock().order().as_slice().to_vec()
    }

    pub fn pending_frames(&self) -> usize {
        self.state.lock().pending_frames()
    }

    /// `(frames, linked, paused)` of a queue.
    pub fn queue_info(&self, id: QueueId) -> Option<(usize, bool, bool)> {
        let st = self.state.lock();
        st.queue(id)
            .map(|q| (q.frame_count(), q.is_linked(), q.is_paused()))
    }

    pub fn check_invariants(&self) -> Result<(), String> {
        self.state.lock().check_invariants()
    }

    /// Run `f` with the state locked.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut SchedState) -> R) -> R {
        f(&mut self.state.lock())
    }
}
