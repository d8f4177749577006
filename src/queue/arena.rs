//! Queue arena
//!
//! Owns every `TxQueue`; categories refer to queues by `QueueId` only, so a
//! destroyed queue can never be reached through a stale list entry.

use super::id::{FlowId, QueueId};
use super::tx_queue::TxQueue;
use crate::sched::CategoryKind;

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    queue: Option<TxQueue>,
}

#[derive(Debug, Default)]
pub struct QueueArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl QueueArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a queue, reusing a freed slot when one is available.
    pub fn insert(&mut self, flow: FlowId, category: CategoryKind) -> QueueId {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let entry = &mut self.slots[slot];
        let id = QueueId::new(slot, entry.generation);
        entry.queue = Some(TxQueue::new(id, flow, category));
        id
    }

    fn slot(&self, id: QueueId) -> Option<&Slot> {
        self.slots
            .get(id.slot())
            .filter(|s| s.generation == id.generation())
    }

    pub fn get(&self, id: QueueId) -> Option<&TxQueue> {
        self.slot(id).and_then(|s| s.queue.as_ref())
    }

    pub fn get_mut(&mut self, id: QueueId) -> Option<&mut TxQueue> {
        self.slots
            .get_mut(id.slot())
            .filter(|s| s.generation == id.generation())
            .and_then(|s| s.queue.as_mut())
    }

    /// Release the slot and retire `id`. Link checks are the caller's job.
    pub fn remove(&mut self, id: QueueId) -> Option<TxQueue> {
        let entry = self
            .slots
            .get_mut(id.slot())
            .filter(|s| s.generation == id.generation())?;
        let q = entry.queue.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.slot());
        Some(q)
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &TxQueue> {
        self.slots.iter().filter_map(|s| s.queue.as_ref())
    }
}
