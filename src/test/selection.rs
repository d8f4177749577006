use super::{cfg3, fill, ids, params};
use crate::config::SchedConfig;
use crate::queue::{FlowId, Frame};
use crate::sched::{CategoryKind, CategoryParams, RecordingDispatcher, Scheduler, Selection};

use CategoryKind::{BestEffort, Video, Voice};

fn served_kind(sel: &Selection) -> CategoryKind {
    match sel {
        Selection::Served { kind, .. } => *kind,
        other => panic!("expected a serviced category, got {other:?}"),
    }
}

#[test]
fn equal_weights_are_served_round_robin() {
    let p = params(1, 0, 1);
    let sched = Scheduler::new(&cfg3(p, p, p)).expect("scheduler");
    fill(&sched, 1, Voice, 5, 100);
    fill(&sched, 2, Video, 5, 100);
    fill(&sched, 3, BestEffort, 5, 100);
    let d = RecordingDispatcher::per_frame();

    let kinds: Vec<CategoryKind> = (0..6).map(|_| served_kind(&sched.select(100, &d))).collect();
    assert_eq!(kinds, vec![Voice, Video, BestEffort, Voice, Video, BestEffort]);
    sched.check_invariants().expect("invariants");
}

#[test]
fn skip_weight_defers_service_to_every_kth_visit() {
    let sched = Scheduler::new(&cfg3(params(3, 0, 1), params(1, 0, 1), params(1, 0, 1))).expect("scheduler");
    fill(&sched, 1, Voice, 20, 100);
    fill(&sched, 2, Video, 20, 100);
    let d = RecordingDispatcher::per_frame();

    let kinds: Vec<CategoryKind> = (0..11).map(|_| served_kind(&sched.select(100, &d))).collect();
    assert_eq!(
        kinds,
        vec![Video, Video, Voice, Video, Video, Video, Voice, Video, Video, Video, Voice]
    );
}

#[test]
fn inactive_categories_are_skipped_without_rotation() {
    let p = params(1, 0, 1);
    let sched = Scheduler::new(&cfg3(p, p, p)).expect("scheduler");
    fill(&sched, 3, BestEffort, 2, 100);
    let d = RecordingDispatcher::per_frame();

    let before = sched.order();
    assert_eq!(served_kind(&sched.select(10, &d)), BestEffort);
    let after = sched.order();
    // only best effort moved; the inactive entries ahead of it kept their slots
    assert_eq!(&after[..2], &before[..2]);
    assert_eq!(after[7], BestEffort);
    assert_eq!(sched.category(Voice).round_robin_count, 0);
}

#[test]
fn nothing_selectable_when_all_categories_idle() {
    let p = params(1, 0, 1);
    let sched = Scheduler::new(&cfg3(p, p, p)).expect("scheduler");
    let d = RecordingDispatcher::per_frame();
    assert!(matches!(sched.select(10, &d), Selection::Idle));
    assert_eq!(sched.select(10, &d).consumed(), 0);
}

#[test]
fn threshold_backpressure_reverts_round_robin_count_exactly() {
    let sched = Scheduler::new(&cfg3(params(2, 5, 1), params(1, 0, 1), params(1, 0, 1))).expect("scheduler");
    fill(&sched, 1, Voice, 3, 100);
    let d = RecordingDispatcher::per_frame();

    // first visit only advances the skip counter
    assert!(matches!(sched.select(10, &d), Selection::Idle));
    assert_eq!(sched.category(Voice).round_robin_count, 1);

    let order_before = sched.order();
    let sel = sched.select(4, &d);
    assert!(matches!(sel, Selection::Held { kind: Voice }));
    assert_eq!(sel.consumed(), 0);
    assert_eq!(sched.category(Voice).round_robin_count, 1);
    assert_eq!(sched.order(), order_before, "held candidate is not rotated");
    assert_eq!(sched.stats().backpressure, 1);
    assert_eq!(sched.category(Voice).frame_count, 3);

    let sel = sched.select(5, &d);
    assert_eq!(served_kind(&sel), Voice);
    assert_eq!(sel.frames().len(), 1);
    assert_eq!(sched.category(Voice).round_robin_count, 0);
}

#[test]
fn held_candidate_stops_the_drain_until_credit_suffices() {
    let sched = Scheduler::new(&cfg3(params(1, 8, 4), params(1, 0, 4), params(1, 0, 4))).expect("scheduler");
    fill(&sched, 1, Voice, 6, 100);
    fill(&sched, 2, Video, 8, 100);
    let mut d = RecordingDispatcher::per_frame();

    // voice, video, then voice again with only 2 credits left: held
    assert_eq!(sched.run(10, &mut d), 8);
    let flows: Vec<u64> = d.frames().map(|f| f.flow.0).collect();
    assert_eq!(flows, vec![1, 1, 1, 1, 2, 2, 2, 2]);
    assert_eq!(sched.stats().backpressure, 1);
    assert_eq!(sched.stats().credit_used, 8);

    // video has frames, but voice is the candidate and 7 credits are not enough
    assert_eq!(sched.run(7, &mut d), 0);
    assert_eq!(d.batches().len(), 1, "empty drains do not call the dispatcher");

    assert_eq!(sched.run(8, &mut d), 6);
    let flows: Vec<u64> = d.batches()[1].iter().map(|f| f.flow.0).collect();
    assert_eq!(flows, vec![1, 1, 2, 2, 2, 2]);
    assert_eq!(sched.pending_frames(), 0);
}

#[test]
fn credit_reserve_is_charged_even_when_nothing_fits() {
    let voice = CategoryParams {
        credit_reserve: 2,
        ..params(1, 0, 4)
    };
    let sched = Scheduler::new(&cfg3(voice, params(1, 0, 1), params(1, 0, 1))).expect("scheduler");
    let q = fill(&sched, 1, Voice, 5, 100);
    let d = RecordingDispatcher::per_frame();

    let sel = sched.select(5, &d);
    assert_eq!(sel.frames().len(), 3, "reserve leaves three credits for frames");
    assert_eq!(sel.consumed(), 5);

    let sel = sched.select(1, &d);
    assert!(sel.frames().is_empty());
    assert_eq!(sel.consumed(), 1, "reserve is capped at the available credit");
    assert_eq!(sched.queue_info(q), Some((2, true, false)));
    sched.check_invariants().expect("invariants");
}

#[test]
fn head_queue_keeps_priority_within_category() {
    let sched = Scheduler::new(&cfg3(params(1, 0, 2), params(1, 0, 1), params(1, 0, 1))).expect("scheduler");
    let a = fill(&sched, 1, Voice, 3, 100);
    let b = fill(&sched, 2, Voice, 2, 100);
    let d = RecordingDispatcher::per_frame();

    assert_eq!(ids(sched.select(10, &d).frames()), vec![1000, 1001]);
    assert_eq!(ids(sched.select(10, &d).frames()), vec![1002]);
    assert_eq!(sched.queue_info(a), Some((0, false, false)));
    assert_eq!(ids(sched.select(10, &d).frames()), vec![2000, 2001]);
    assert_eq!(sched.queue_info(b), Some((0, false, false)));
    assert!(!sched.category(Voice).active);
}

#[test]
fn three_category_walkthrough() {
    // A: voice, B: video (skip weight 2), C: best effort (threshold 5, empty)
    let sched = Scheduler::new(&cfg3(params(1, 0, 2), params(2, 0, 1), params(1, 5, 5))).expect("scheduler");
    fill(&sched, 1, Voice, 4, 100);
    fill(&sched, 2, Video, 4, 100);
    let mut d = RecordingDispatcher::per_frame();

    // A is serviced twice: B's first visit only advances its skip counter
    assert_eq!(sched.run(3, &mut d), 3);
    assert_eq!(d.batches().len(), 1);
    assert_eq!(ids(&d.batches()[0]), vec![1000, 1001, 1002]);
    assert_eq!(sched.category(Voice).frame_count, 1);
    assert_eq!(sched.category(Video).frame_count, 4);
    assert_eq!(sched.category(Video).round_robin_count, 1);
    assert_eq!(sched.stats().credit_used, 3);

    // B's second visit services it, then A drains
    assert_eq!(sched.run(2, &mut d), 2);
    assert_eq!(ids(&d.batches()[1]), vec![2000, 1003]);
    assert!(!sched.category(Voice).active);
    assert_eq!(sched.category(Video).frame_count, 3);
    assert!(sched.category(Video).active);
    assert_eq!(sched.category(BestEffort).frame_count, 0);
    sched.check_invariants().expect("invariants");
}

#[test]
fn cursor_wraps_when_candidate_was_at_the_tail() {
    let order = [
        CategoryKind::Background,
        CategoryKind::NonQos,
        CategoryKind::UnicastMgmt,
        CategoryKind::MulticastData,
        CategoryKind::MulticastMgmt,
        BestEffort,
        Video,
        Voice,
    ];
    let p = params(1, 0, 1);
    let cfg = SchedConfig::default()
        .with_order(&order)
        .with_params(Voice, p)
        .with_params(Video, p);
    let sched = Scheduler::new(&cfg).expect("scheduler");
    let q = sched.create_queue(FlowId(1), super::class_of(Voice));
    sched.enqueue(q, Frame::new(1, FlowId(1), 10)).expect("enqueue");
    sched.enqueue(q, Frame::new(2, FlowId(1), 10)).expect("enqueue");
    let d = RecordingDispatcher::per_frame();

    // voice is serviced from the tail slot, so the next scan restarts at the head
    assert_eq!(served_kind(&sched.select(10, &d)), Voice);
    assert_eq!(sched.with_state(|st| st.order().cursor()), 0);
    assert_eq!(sched.order(), order.to_vec());

    fill(&sched, 2, Video, 2, 10);
    assert_eq!(served_kind(&sched.select(10, &d)), Video);
    // video moved behind voice; the cursor now points at voice
    assert_eq!(sched.with_state(|st| st.order().cursor()), 6);
    assert_eq!(sched.order()[6], Voice);
    assert_eq!(served_kind(&sched.select(10, &d)), Voice);
    assert_eq!(served_kind(&sched.select(10, &d)), Video);
}

#[test]
fn empty_active_category_is_reported_and_skipped() {
    let p = params(1, 0, 4);
    let sched = Scheduler::new(&cfg3(p, p, p)).expect("scheduler");
    fill(&sched, 3, BestEffort, 2, 100);
    // voice claims frames but has no queue
    sched.with_state(|st| st.category_mut(Voice).resync(3, 300));
    assert!(sched.check_invariants().is_err());

    let d = RecordingDispatcher::per_frame();
    let sel = sched.select(10, &d);
    assert!(matches!(sel, Selection::Empty { kind: Voice }));
    assert_eq!(sel.consumed(), 0);
    assert_eq!(sched.stats().anomalies, 1);
    assert!(!sched.category(Voice).active);
    sched.check_invariants().expect("resynced");

    assert_eq!(served_kind(&sched.select(10, &d)), BestEffort);
}

#[test]
fn policy_update_takes_effect_on_next_selection() {
    let p = params(1, 0, 1);
    let sched = Scheduler::new(&cfg3(p, p, p)).expect("scheduler");
    fill(&sched, 1, Voice, 6, 100);
    let d = RecordingDispatcher::per_frame();

    assert_eq!(sched.select(10, &d).frames().len(), 1);
    sched.update_params(Voice, params(1, 0, 4)).expect("update");
    assert_eq!(sched.select(10, &d).frames().len(), 4);

    sched.update_params(Voice, params(1, 20, 4)).expect("update");
    assert!(matches!(sched.select(10, &d), Selection::Held { kind: Voice }));

    assert!(sched.update_params(Voice, params(0, 0, 4)).is_err());
    assert_eq!(sched.with_state(|st| st.category(Voice).params().credit_threshold), 20);
}
