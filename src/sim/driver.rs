//! Scenario driver
//!
//! Replays a scenario's steps against a fresh `Scheduler` and records what
//! each drive loop dispatched.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info};

use super::ScenarioError;
use super::scenario::{SCHEMA_VERSION, Scenario, StepSpec};
use crate::queue::{FlowId, Frame, QueueId};
use crate::sched::{
    CategoryKind, CategorySnapshot, QueueEvent, RecordingDispatcher, SchedStats, Scheduler,
};

#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub step: usize,
    pub credit: u32,
    pub frames: usize,
    pub per_category: BTreeMap<CategoryKind, usize>,
    /// Flow of each dispatched frame, in dispatch order.
    pub flows: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscardRecord {
    pub step: usize,
    pub requested: usize,
    pub discarded: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub runs: Vec<RunRecord>,
    pub discards: Vec<DiscardRecord>,
    pub categories: Vec<CategorySnapshot>,
    pub stats: SchedStats,
    pub pending_frames: usize,
}

struct FlowEntry {
    queue: QueueId,
    kind: CategoryKind,
}

pub fn run_scenario(sc: &Scenario) -> Result<ScenarioReport, ScenarioError> {
    if sc.schema_version != SCHEMA_VERSION {
        return Err(ScenarioError::UnsupportedSchema(sc.schema_version));
    }
    let cfg = sc.config.clone().unwrap_or_default();
    let sched = Scheduler::new(&cfg)?;
    let mut dispatcher = match sc.dispatcher.as_ref().and_then(|d| d.bytes_per_credit) {
        Some(n) => RecordingDispatcher::per_bytes(n),
        None => RecordingDispatcher::per_frame(),
    };

    let mut flows: HashMap<u64, FlowEntry> = HashMap::new();
    for spec in &sc.flows {
        if flows.contains_key(&spec.id) {
            return Err(ScenarioError::DuplicateFlow(spec.id));
        }
        let queue = sched.create_queue(FlowId(spec.id), spec.class);
        let kind = sched
            .with_state(|st| st.queue(queue).map(|q| q.category()))
            .ok_or(ScenarioError::UnknownFlow(spec.id))?;
        flows.insert(spec.id, FlowEntry { queue, kind });
    }
    let kind_of: HashMap<u64, CategoryKind> = flows.iter().map(|(&id, e)| (id, e.kind)).collect();
    let lookup = |flows: &HashMap<u64, FlowEntry>, id: u64| {
        flows
            .get(&id)
            .map(|e| e.queue)
            .ok_or(ScenarioError::UnknownFlow(id))
    };

    info!(flows = flows.len(), steps = sc.steps.len(), "▶️  replaying scenario");

    let mut next_frame_id = 0u64;
    let mut runs = Vec::new();
    let mut discards = Vec::new();
    for (step, spec) in sc.steps.iter().enumerate() {
        debug!(step, ?spec, "step");
        match *spec {
            StepSpec::Enqueue { flow, frames, bytes } => {
                let queue = lookup(&flows, flow)?;
                for _ in 0..frames {
                    sched.enqueue(queue, Frame::new(next_frame_id, FlowId(flow), bytes))?;
                    next_frame_id += 1;
                }
            }
            StepSpec::Run { credit } => {
                let frames = sched.run(credit, &mut dispatcher);
                let sent: Vec<Frame> = dispatcher.take_batches().into_iter().flatten().collect();
                let mut per_category = BTreeMap::new();
                for f in &sent {
                    if let Some(&kind) = kind_of.get(&f.flow.0) {
                        *per_category.entry(kind).or_insert(0) += 1;
                    }
                }
                runs.push(RunRecord {
                    step,
                    credit,
                    frames,
                    per_category,
                    flows: sent.iter().map(|f| f.flow.0).collect(),
                });
            }
            StepSpec::Pause { flow } => {
                sched.notify(lookup(&flows, flow)?, QueueEvent::Deactivated)?;
            }
            StepSpec::Unpause { flow } => {
                sched.notify(lookup(&flows, flow)?, QueueEvent::Reactivated)?;
            }
            StepSpec::Teardown { flow } => {
                let queue = lookup(&flows, flow)?;
                sched.notify(queue, QueueEvent::TornDown)?;
                sched.destroy_queue(queue)?;
                flows.remove(&flow);
            }
            StepSpec::Discard { count, force } => {
                let discarded = sched.request_discard(count, force);
                discards.push(DiscardRecord {
                    step,
                    requested: count,
                    discarded,
                });
            }
        }
    }

    let report = ScenarioReport {
        runs,
        discards,
        categories: sched.snapshot(),
        stats: sched.stats(),
        pending_frames: sched.pending_frames(),
    };
    info!(
        dispatched = report.stats.dispatched_frames,
        pending = report.pending_frames,
        "✅ scenario complete"
    );
    Ok(report)
}
