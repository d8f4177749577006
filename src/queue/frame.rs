//! Frame handle
//!
//! The scheduler never looks inside a frame; it only moves handles around and
//! reads their length for byte accounting.

use super::id::FlowId;

/// Outbound frame handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: u64,
    pub flow: FlowId,
    pub len: u32,
}

impl Frame {
    pub fn new(id: u64, flow: FlowId, len: u32) -> Self {
        Self { id, flow, len }
    }

    pub fn bytes(&self) -> u64 {
        self.len as u64
    }
}
