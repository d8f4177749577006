//! Scheduler configuration
//!
//! Per-category tuning, order list and classifier table. Loaded from JSON or
//! built in code; `validate` enforces the parameter invariants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sched::{CategoryKind, CategoryParams, DEFAULT_TID_MAP, OrderList};

pub const DEFAULT_MAX_CREDIT: u32 = 64;

/// Default visiting order: management first, then access categories by priority.
pub const DEFAULT_ORDER: [CategoryKind; 8] = [
    CategoryKind::UnicastMgmt,
    CategoryKind::MulticastMgmt,
    CategoryKind::Voice,
    CategoryKind::Video,
    CategoryKind::BestEffort,
    CategoryKind::Background,
    CategoryKind::NonQos,
    CategoryKind::MulticastData,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedConfig {
    /// Largest credit the transport can ever grant in one cycle.
    #[serde(default = "default_max_credit")]
    pub max_credit: u32,
    #[serde(default = "default_order")]
    pub order: Vec<CategoryKind>,
    /// Overrides; kinds not listed use `default_params`.
    #[serde(default)]
    pub categories: BTreeMap<CategoryKind, CategoryParams>,
    #[serde(default = "default_tid_map")]
    pub tid_map: [CategoryKind; 8],
}

fn default_max_credit() -> u32 {
    DEFAULT_MAX_CREDIT
}

fn default_order() -> Vec<CategoryKind> {
    DEFAULT_ORDER.to_vec()
}

fn default_tid_map() -> [CategoryKind; 8] {
    DEFAULT_TID_MAP
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            max_credit: DEFAULT_MAX_CREDIT,
            order: default_order(),
            categories: BTreeMap::new(),
            tid_map: DEFAULT_TID_MAP,
        }
    }
}

/// Built-in tuning per category.
pub fn default_params(kind: CategoryKind) -> CategoryParams {
    let (skip_weight, credit_threshold, send_limit, discard_weight) = match kind {
        CategoryKind::Voice => (1, 1, 4, 1),
        CategoryKind::Video => (1, 1, 8, 2),
        CategoryKind::BestEffort => (2, 1, 16, 4),
        CategoryKind::Background => (4, 2, 16, 8),
        CategoryKind::NonQos => (2, 1, 16, 4),
        CategoryKind::UnicastMgmt => (1, 1, 2, 1),
        CategoryKind::MulticastData => (2, 1, 8, 4),
        CategoryKind::MulticastMgmt => (1, 1, 2, 1),
    };
    CategoryParams {
        skip_weight,
        credit_threshold,
        send_limit,
        credit_reserve: 0,
        discard_weight,
    }
}

impl SchedConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Effective parameters for `kind`.
    pub fn params(&self, kind: CategoryKind) -> CategoryParams {
        self.categories
            .get(&kind)
            .copied()
            .unwrap_or_else(|| default_params(kind))
    }

    pub fn with_params(mut self, kind: CategoryKind, params: CategoryParams) -> Self {
        self.categories.insert(kind, params);
        self
    }

    pub fn with_order(mut self, order: &[CategoryKind]) -> Self {
        self.order = order.to_vec();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in CategoryKind::ALL {
            self.params(kind).validate(kind)?;
        }
        OrderList::new(&self.order)?;
        Ok(())
    }

    /// Categories whose threshold can never be met.
    pub fn unreachable_thresholds(&self) -> Vec<CategoryKind> {
        CategoryKind::ALL
            .into_iter()
            .filter(|&k| self.params(k).credit_threshold > self.max_credit)
            .collect()
    }
}
