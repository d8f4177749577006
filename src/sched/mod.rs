//! Traffic-category scheduler
//!
//! Weighted round-robin across categories with per-category credit
//! admission, FIFO within a category, and a weighted discard policy for
//! congestion.

mod category;
mod classifier;
mod dispatcher;
mod event;
mod order;
mod scheduler;
mod state;
mod stats;

pub use category::{CATEGORY_COUNT, Category, CategoryKind, CategoryParams};
pub use classifier::{Classifier, DEFAULT_TID_MAP, FlowClass};
pub use dispatcher::{Dispatcher, RecordingDispatcher};
pub use event::QueueEvent;
pub use order::OrderList;
pub use scheduler::Scheduler;
pub use state::{DISCARD_QUANTUM, SchedState, Selection};
pub use stats::{CategorySnapshot, SchedStats};
