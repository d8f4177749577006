//! Identifier types
//!
//! Handles for flows, queues and traffic identifiers.

use serde::{Deserialize, Serialize};

/// Logical flow identifier (one peer + traffic identifier pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowId(pub u64);

/// Handle into the queue arena. The generation changes every time the slot
/// is freed, so a handle kept past `destroy_queue` never reaches the queue
/// that reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId {
    slot: usize,
    generation: u32,
}

impl QueueId {
    pub fn new(slot: usize, generation: u32) -> Self {
        Self { slot, generation }
    }

    pub fn slot(self) -> usize {
        self.slot
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// 802.11 traffic identifier. Only the low three bits (the user priority)
/// take part in classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tid(pub u8);

impl Tid {
    pub const MAX: u8 = 15;

    /// User priority 0..=7.
    pub fn user_priority(self) -> usize {
        (self.0 & 0x7) as usize
    }
}

impl std::fmt::Display for QueueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}.{}", self.slot, self.generation)
    }
}
