//! Dispatcher collaborator
//!
//! Receives the frames a drive loop selected and hands them to the transmit
//! pipeline. It also owns the byte-to-credit conversion.

use crate::queue::Frame;

pub trait Dispatcher {
    /// Credit units a frame consumes.
    ///
    /// Called with the scheduler lock held, which is not reentrant: apart
    /// from `Scheduler::run` (a no-op during a drain), calling back into the
    /// `Scheduler` from here deadlocks. Must not block.
    fn credit_cost(&self, frame: &Frame) -> u32;

    /// Take ownership of one drive loop's batch, in selection order.
    fn send(&mut self, batch: Vec<Frame>);
}

/// Keeps every batch it is given. Used by tests and the scenario driver.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    /// `None` charges one credit per frame; `Some(n)` charges one credit per
    /// started block of `n` bytes (minimum one).
    bytes_per_credit: Option<u32>,
    batches: Vec<Vec<Frame>>,
}

impl RecordingDispatcher {
    pub fn per_frame() -> Self {
        Self::default()
    }

    pub fn per_bytes(bytes_per_credit: u32) -> Self {
        Self {
            bytes_per_credit: Some(bytes_per_credit.max(1)),
            batches: Vec::new(),
        }
    }

    pub fn batches(&self) -> &[Vec<Frame>] {
        &self.batches
    }

    /// Every frame sent so far, flattened in dispatch order.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.batches.iter().flatten()
    }

    pub fn frame_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    pub fn take_batches(&mut self) -> Vec<Vec<Frame>> {
        std::mem::take(&mut self.batches)
    }
}

impl Dispatcher for RecordingDispatcher {
    fn credit_cost(&self, frame: &Frame) -> u32 {
        match self.bytes_per_credit {
            None => 1,
            Some(n) => frame.len.div_ceil(n).max(1),
        }
    }

    fn send(&mut self, batch: Vec<Frame>) {
        self.batches.push(batch);
    }
}
