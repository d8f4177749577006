//! Queue lifecycle notifications

use crate::queue::Frame;

/// Event delivered to `Scheduler::notify` by the data-submission path.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    /// A frame was appended to the queue.
    Enqueued(Frame),
    /// The queue is paused; its frames stop counting toward its category.
    Deactivated,
    /// A paused queue resumes.
    Reactivated,
    /// An upper layer dropped `frames` from the head of the queue.
    Discarded { frames: usize },
    /// The flow is going away: flush and unlink so the queue can be destroyed.
    TornDown,
}

impl QueueEvent {
    pub fn name(&self) -> &'static str {
        match self {
            QueueEvent::Enqueued(_) => "enqueued",
            QueueEvent::Deactivated => "deactivated",
            QueueEvent::Reactivated => "reactivated",
            QueueEvent::Discarded { .. } => "discarded",
            QueueEvent::TornDown => "torn_down",
        }
    }
}
