use crate::config::SchedConfig;
use crate::queue::{FlowId, Frame, QueueId};
use crate::sched::{CategoryKind, CategoryParams, FlowClass, Scheduler};

mod selection;

/// Order used by most tests: the three categories under test first.
pub(crate) const TEST_ORDER: [CategoryKind; 8] = [
    CategoryKind::Voice,
    CategoryKind::Video,
    CategoryKind::BestEffort,
    CategoryKind::Background,
    CategoryKind::NonQos,
    CategoryKind::UnicastMgmt,
    CategoryKind::MulticastData,
    CategoryKind::MulticastMgmt,
];

pub(crate) fn params(skip_weight: u32, credit_threshold: u32, send_limit: u32) -> CategoryParams {
    CategoryParams {
        skip_weight,
        credit_threshold,
        send_limit,
        credit_reserve: 0,
        discard_weight: 1,
    }
}

/// Config with explicit params for voice / video / best effort.
pub(crate) fn cfg3(voice: CategoryParams, video: CategoryParams, best_effort: CategoryParams) -> SchedConfig {
    SchedConfig::default()
        .with_order(&TEST_ORDER)
        .with_params(CategoryKind::Voice, voice)
        .with_params(CategoryKind::Video, video)
        .with_params(CategoryKind::BestEffort, best_effort)
}

pub(crate) fn class_of(kind: CategoryKind) -> FlowClass {
    match kind {
        CategoryKind::Voice => FlowClass::QosData { tid: 6 },
        CategoryKind::Video => FlowClass::QosData { tid: 5 },
        CategoryKind::BestEffort => FlowClass::QosData { tid: 0 },
        CategoryKind::Background => FlowClass::QosData { tid: 1 },
        CategoryKind::NonQos => FlowClass::NonQosData,
        CategoryKind::UnicastMgmt => FlowClass::UnicastMgmt,
        CategoryKind::MulticastData => FlowClass::MulticastData,
        CategoryKind::MulticastMgmt => FlowClass::MulticastMgmt,
    }
}

/// Create a queue for `flow` in `kind` and enqueue `n` frames of `len` bytes,
/// with ids `flow * 1000 + i`.
pub(crate) fn fill(sched: &Scheduler, flow: u64, kind: CategoryKind, n: usize, len: u32) -> QueueId {
    let q = sched.create_queue(FlowId(flow), class_of(kind));
    push(sched, q, flow, 0..n, len);
    q
}

pub(crate) fn push(sched: &Scheduler, q: QueueId, flow: u64, ids: std::ops::Range<usize>, len: u32) {
    for i in ids {
        sched
            .enqueue(q, Frame::new(flow * 1000 + i as u64, FlowId(flow), len))
            .expect("enqueue");
    }
}

pub(crate) fn ids(frames: &[Frame]) -> Vec<u64> {
    frames.iter().map(|f| f.id).collect()
}
