//! Flow classification
//!
//! Maps a flow to its category once, when its queue is created.

use serde::{Deserialize, Serialize};

use super::category::CategoryKind;
use crate::error::ConfigError;
use crate::queue::Tid;

/// What kind of traffic a flow carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowClass {
    QosData { tid: u8 },
    NonQosData,
    UnicastMgmt,
    MulticastData,
    MulticastMgmt,
}

/// 802.1D user priority to access category.
pub const DEFAULT_TID_MAP: [CategoryKind; 8] = [
    CategoryKind::BestEffort,
    CategoryKind::Background,
    CategoryKind::Background,
    CategoryKind::BestEffort,
    CategoryKind::Video,
    CategoryKind::Video,
    CategoryKind::Voice,
    CategoryKind::Voice,
];

#[derive(Debug, Clone)]
pub struct Classifier {
    tid_map: [CategoryKind; 8],
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_TID_MAP)
    }
}

impl Classifier {
    pub fn new(tid_map: [CategoryKind; 8]) -> Self {
        Self { tid_map }
    }

    pub fn classify(&self, class: FlowClass) -> CategoryKind {
        match class {
            FlowClass::QosData { tid } => self.tid_map[Tid(tid).user_priority()],
            FlowClass::NonQosData => CategoryKind::NonQos,
            FlowClass::UnicastMgmt => CategoryKind::UnicastMgmt,
            FlowClass::MulticastData => CategoryKind::MulticastData,
            FlowClass::MulticastMgmt => CategoryKind::MulticastMgmt,
        }
    }

    pub fn set(&mut self, tid: u8, kind: CategoryKind) -> Result<(), ConfigError> {
        if tid > Tid::MAX {
            return Err(ConfigError::BadTid(tid));
        }
        self.tid_map[Tid(tid).user_priority()] = kind;
        Ok(())
    }

    pub fn tid_map(&self) -> &[CategoryKind; 8] {
        &self.tid_map
    }
}
