use serde::{Deserialize, Serialize};

use crate::config::SchedConfig;
use crate::sched::FlowClass;

pub const SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_FRAME_BYTES: u32 = 1500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub schema_version: u32,
    #[serde(default)]
    pub config: Option<SchedConfig>,
    #[serde(default)]
    pub dispatcher: Option<DispatcherSpec>,
    pub flows: Vec<FlowSpec>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatcherSpec {
    /// Bytes per credit unit; absent means one credit per frame.
    #[serde(default)]
    pub bytes_per_credit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSpec {
    pub id: u64,
    pub class: FlowClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSpec {
    Enqueue {
        flow: u64,
        #[serde(default = "one")]
        frames: usize,
        #[serde(default = "default_frame_bytes")]
        bytes: u32,
    },
    Run {
        credit: u32,
    },
    Pause {
        flow: u64,
    },
    Unpause {
        flow: u64,
    },
    /// Flush the flow's queue and destroy it.
    Teardown {
        flow: u64,
    },
    Discard {
        count: usize,
        #[serde(default)]
        force: bool,
    },
}

fn one() -> usize {
    1
}

fn default_frame_bytes() -> u32 {
    DEFAULT_FRAME_BYTES
}
