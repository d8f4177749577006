//! Per-flow transmit queue
//!
//! FIFO of pending frames for one flow, with byte accounting and the link
//! state the scheduler uses to avoid double-linking.

use std::collections::VecDeque;

use super::frame::Frame;
use super::id::{FlowId, QueueId};
use crate::sched::CategoryKind;

/// Where a queue sits relative to its category's active list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Holds frames (or not) but is not in the category's active list.
    Idle,
    /// Present in the category's active list.
    Linked,
    /// Flushed by a teardown; accepts nothing further and may be destroyed.
    TornDown,
}

/// Result of a credit-bounded dequeue.
#[derive(Debug, Default)]
pub struct Dequeued {
    pub frames: Vec<Frame>,
    pub bytes: u64,
    pub credit: u32,
}

impl Dequeued {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[derive(Debug)]
pub struct TxQueue {
    id: QueueId,
    flow: FlowId,
    category: CategoryKind,
    frames: VecDeque<Frame>,
    byte_count: u64,
    state: QueueState,
    paused: bool,
}

impl TxQueue {
    pub fn new(id: QueueId, flow: FlowId, category: CategoryKind) -> Self {
        Self {
            id,
            flow,
            category,
            frames: VecDeque::new(),
            byte_count: 0,
            state: QueueState::Idle,
            paused: false,
        }
    }

    pub fn id(&self) -> QueueId {
        self.id
    }

    pub fn flow(&self) -> FlowId {
        self.flow
    }

    pub fn category(&self) -> CategoryKind {
        self.category
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    pub fn is_linked(&self) -> bool {
        self.state == QueueState::Linked
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn front(&self) -> Option<&Frame> {
        self.frames.front()
    }

    pub(crate) fn set_state(&mut self, state: QueueState) {
        self.state = state;
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Append at the tail. Capacity is bounded upstream, not here.
    pub fn enqueue(&mut self, frame: Frame) {
        self.byte_count = self.byte_count.saturating_add(frame.bytes());
        self.frames.push_back(frame);
    }

    /// Pop from the head while fewer than `max_frames` are taken and the
    /// cumulative cost stays within `available_credit`.
    ///
    /// `cost` converts a frame into credit units; it comes from the dispatcher.
    pub fn dequeue_up_to<C>(&mut self, max_frames: usize, available_credit: u32, cost: C) -> Dequeued
    where
        C: Fn(&Frame) -> u32,
    {
        let mut out = Dequeued::default();
        while out.frames.len() < max_frames {
            let Some(head) = self.frames.front() else {
                break;
            };
            let c = cost(head);
            let next = match out.credit.checked_add(c) {
                Some(n) if n <= available_credit => n,
                _ => break,
            };
            let Some(frame) = self.frames.pop_front() else {
                break;
            };
            out.credit = next;
            out.bytes = out.bytes.saturating_add(frame.bytes());
            self.byte_count = self.byte_count.saturating_sub(frame.bytes());
            out.frames.push(frame);
        }
        out
    }

    /// Drop up to `n` frames from the head (oldest first).
    /// Returns `(frames, bytes)` removed.
    pub fn drop_front(&mut self, n: usize) -> (usize, u64) {
        let take = n.min(self.frames.len());
        let bytes: u64 = self.frames.drain(..take).map(|f| f.bytes()).sum();
        self.byte_count = self.byte_count.saturating_sub(bytes);
        (take, bytes)
    }

    /// Drop everything. Returns `(frames, bytes)` removed.
    pub fn flush(&mut self) -> (usize, u64) {
        self.drop_front(self.frames.len())
    }
}
