//! Error types

use thiserror::Error;

use crate::queue::{FlowId, QueueId};
use crate::sched::CategoryKind;

/// Rejected configuration or policy update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("category {0:?}: skip_weight must be >= 1")]
    ZeroSkipWeight(CategoryKind),
    #[error("category {0:?}: send_limit must be > 0")]
    ZeroSendLimit(CategoryKind),
    #[error("category {0:?}: discard_weight must be >= 1")]
    ZeroDiscardWeight(CategoryKind),
    #[error("order list is not a permutation of all categories: {0}")]
    BadOrder(String),
    #[error("tid {0} out of range")]
    BadTid(u8),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Invalid-state errors returned by the data-path surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedError {
    #[error("unknown queue {0}")]
    UnknownQueue(QueueId),
    #[error("queue {0} is still linked into its category")]
    QueueLinked(QueueId),
    #[error("queue {0} is not linked")]
    NotLinked(QueueId),
    #[error("queue {0} is already paused")]
    AlreadyPaused(QueueId),
    #[error("queue {0} is not paused")]
    NotPaused(QueueId),
    #[error("queue {0} was torn down")]
    QueueTornDown(QueueId),
    #[error("queue {queue} belongs to flow {}, got a frame for flow {}", .expected.0, .got.0)]
    FlowMismatch {
        queue: QueueId,
        expected: FlowId,
        got: FlowId,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
