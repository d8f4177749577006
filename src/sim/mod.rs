//! Scenario simulation
//!
//! A JSON scenario describes flows and a sequence of enqueue / run / pause /
//! discard steps; the driver replays it against a scheduler.

use thiserror::Error;

use crate::error::{ConfigError, SchedError};

mod driver;
mod scenario;

pub use driver::{DiscardRecord, RunRecord, ScenarioReport, run_scenario};
pub use scenario::{
    DEFAULT_FRAME_BYTES, DispatcherSpec, FlowSpec, SCHEMA_VERSION, Scenario, StepSpec,
};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unsupported schema_version {0}")]
    UnsupportedSchema(u32),
    #[error("flow {0} declared twice")]
    DuplicateFlow(u64),
    #[error("unknown flow {0}")]
    UnknownFlow(u64),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sched(#[from] SchedError),
}

impl Scenario {
    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(raw)?)
    }
}
