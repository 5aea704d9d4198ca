//! Property tests over random operation sequences
#![forbid(unsafe_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;
use telecare_core::{CallType, NewCallSession};
use telecare_tracker::CallTracker;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    Create { video: bool },
    Connect(usize),
    End(usize),
    EndUnknown,
    Tick,
    Advance(i64),
    StepBack(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<bool>().prop_map(|video| Op::Create { video }),
        2 => any::<usize>().prop_map(Op::Connect),
        2 => any::<usize>().prop_map(Op::End),
        1 => Just(Op::EndUnknown),
        2 => Just(Op::Tick),
        2 => (1_i64..600).prop_map(Op::Advance),
        1 => (1_i64..120).prop_map(Op::StepBack),
    ]
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()
}

fn pick(ids: &[Uuid], index: usize) -> Option<Uuid> {
    (!ids.is_empty()).then(|| ids[index % ids.len()])
}

proptest! {
    #[test]
    fn tracker_invariants_hold(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut tracker = CallTracker::new();
        let mut now = t0();

        for (step, op) in ops.into_iter().enumerate() {
            let active_before = tracker.active_ids();
            let history_before = tracker.history_len();

            match op {
                Op::Create { video } => {
                    let call_type = if video { CallType::Video } else { CallType::Audio };
                    let request = NewCallSession::new(format!("Dr. {step}"), format!("P{step}"), call_type);
                    tracker.create_session_at(request, now).unwrap();
                    prop_assert_eq!(tracker.active_len(), active_before.len() + 1);
                }
                Op::Connect(index) => {
                    if let Some(id) = pick(&active_before, index) {
                        tracker.connect(id).unwrap();
                        prop_assert_eq!(tracker.active_ids(), active_before.clone());
                    }
                }
                Op::End(index) => {
                    if let Some(id) = pick(&active_before, index) {
                        tracker.end_at(id, now).unwrap();
                        prop_assert_eq!(tracker.active_len(), active_before.len() - 1);
                        prop_assert_eq!(tracker.history_len(), history_before + 1);
                        prop_assert!(!tracker.contains(id));
                    }
                }
                Op::EndUnknown => {
                    prop_assert!(tracker.end_at(Uuid::new_v4(), now).is_err());
                    prop_assert_eq!(tracker.active_ids(), active_before.clone());
                    prop_assert_eq!(tracker.history_len(), history_before);
                }
                Op::Tick => {
                    tracker.tick(now);
                    prop_assert_eq!(tracker.active_ids(), active_before.clone());
                    prop_assert_eq!(tracker.history_len(), history_before);
                }
                Op::Advance(seconds) => now += Duration::seconds(seconds),
                Op::StepBack(seconds) => now -= Duration::seconds(seconds),
            }

            let ids = tracker.active_ids();
            let unique: HashSet<_> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());

            let history = tracker.list_history();
            prop_assert!(history.windows(2).all(|w| w[0].end_time >= w[1].end_time));
        }
    }
}
