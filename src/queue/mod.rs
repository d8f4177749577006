//! Transmit queues
//!
//! Per-flow FIFOs and the arena that owns them. The scheduler links queues
//! into categories by handle; it never owns frames directly.

mod arena;
mod frame;
mod id;
mod tx_queue;

pub use arena::QueueArena;
pub use frame::Frame;
pub use id::{FlowId, QueueId, Tid};
pub use tx_queue::{Dequeued, QueueState, TxQueue};
