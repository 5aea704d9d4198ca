//! Demo call data for seeding an empty tracker
//!
//! Concluded calls are replayed through create, tick and end so that the
//! seeded history obeys the same invariants as live traffic.

use crate::{CallTracker, Result};
use chrono::{DateTime, Duration, Utc};
use telecare_core::{CallType, NewCallSession};
use tracing::info;

/// A sample call, positioned relative to the seeding instant
#[derive(Debug, Clone, Copy)]
pub struct DemoCall {
    /// Doctor display name
    pub doctor: &'static str,
    /// Patient display name
    pub patient: &'static str,
    /// Audio or video
    pub call_type: CallType,
    /// Whether the patient has joined
    pub connected: bool,
    /// Seconds between call start and seeding (active) or call end (history)
    pub duration_seconds: i64,
    /// Seconds before seeding that the call ended, `None` for active calls
    pub ended_seconds_ago: Option<i64>,
}

/// Calls shown on a fresh desk
pub const DEMO_CALLS: [DemoCall; 4] = [
    DemoCall {
        doctor: "Dr. Sunita Singh",
        patient: "Sunita Devi",
        call_type: CallType::Audio,
        connected: true,
        duration_seconds: 8 * 60 + 45,
        ended_seconds_ago: Some(2 * 3600),
    },
    DemoCall {
        doctor: "Dr. Amit Mehta",
        patient: "Amit Gupta",
        call_type: CallType::Video,
        connected: true,
        duration_seconds: 15 * 60 + 30,
        ended_seconds_ago: Some(3600),
    },
    DemoCall {
        doctor: "Dr. Rajesh Sharma",
        patient: "Rajesh Kumar",
        call_type: CallType::Video,
        connected: false,
        duration_seconds: 5 * 60,
        ended_seconds_ago: None,
    },
    DemoCall {
        doctor: "Dr. Priya Patel",
        patient: "Priya Singh",
        call_type: CallType::Audio,
        connected: true,
        duration_seconds: 10 * 60,
        ended_seconds_ago: None,
    },
];

/// Seed `tracker` with [`DEMO_CALLS`] as of `now`
///
/// History entries are ended oldest first so the most recent lands on top.
///
/// # Errors
///
/// Propagates any tracker error; with the built-in data none is expected.
pub fn seed_demo_data(tracker: &mut CallTracker, now: DateTime<Utc>) -> Result<()> {
    let mut concluded: Vec<_> = DEMO_CALLS
        .iter()
        .filter_map(|call| call.ended_seconds_ago.map(|ago| (ago, call)))
        .collect();
    concluded.sort_by_key(|(ago, _)| std::cmp::Reverse(*ago));

    for (ago, call) in concluded {
        let end_time = now - Duration::seconds(ago);
        let start_time = end_time - Duration::seconds(call.duration_seconds);

        let id = open(tracker, call, start_time)?;
        tracker.tick(end_time);
        tracker.end_at(id, end_time)?;
    }

    for call in DEMO_CALLS.iter().filter(|c| c.ended_seconds_ago.is_none()) {
        let start_time = now - Duration::seconds(call.duration_seconds);
        open(tracker, call, start_time)?;
    }
    tracker.tick(now);

    info!(
        active = tracker.active_len(),
        history = tracker.history_len(),
        "Seeded demo call data"
    );
    Ok(())
}

fn open(
    tracker: &mut CallTracker,
    call: &DemoCall,
    start_time: DateTime<Utc>,
) -> Result<telecare_core::SessionId> {
    let request = NewCallSession::new(call.doctor, call.patient, call.call_type);
    let id = tracker.create_session_at(request, start_time)?.id;
    if call.connected {
        tracker.connect(id)?;
    }
    Ok(id)
}
