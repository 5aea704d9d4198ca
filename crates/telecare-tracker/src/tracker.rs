//! Call session state machine
//!
//! Holds the active sessions in insertion order, the concluded calls
//! most-recent-first, and a derived cache of `MM:SS` strings refreshed by
//! [`CallTracker::tick`]. A session is either active or historical, never
//! both: [`CallTracker::end_at`] moves it out of the active set and prepends a
//! fresh [`CallHistoryEntry`].
//!
//! The tracker is synchronous and owns no timer. [`crate::TrackerService`]
//! drives the tick and serialises access behind a lock.

use crate::{Result, TrackerError};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::{HashMap, VecDeque};
use telecare_core::{
    ActiveCall, CallHistoryEntry, CallSession, CallStatus, HistoryStatus, NewCallSession,
    SessionId, TrackerStats, elapsed_seconds, format_elapsed,
};
use tracing::{debug, trace};
use uuid::Uuid;

/// In-memory tracker of active and concluded consult calls
#[derive(Debug, Default)]
pub struct CallTracker {
    /// Active sessions, insertion order is display order
    active: IndexMap<SessionId, CallSession>,

    /// Concluded calls, most recent first
    history: VecDeque<CallHistoryEntry>,

    /// Derived `MM:SS` per active session, rebuilt on every tick
    elapsed_display: HashMap<SessionId, String>,
}

impl CallTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session starting now
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] if the doctor or patient name is
    /// blank or longer than 255 characters.
    pub fn create_session(&mut self, request: NewCallSession) -> Result<CallSession> {
        self.create_session_at(request, Utc::now())
    }

    /// Open a session with an explicit start time
    ///
    /// The new session enters the active set in
    /// [`CallStatus::WaitingPatient`].
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] for an invalid request.
    pub fn create_session_at(
        &mut self,
        request: NewCallSession,
        start_time: DateTime<Utc>,
    ) -> Result<CallSession> {
        let request = request.normalized()?;
        let id = self.fresh_session_id();

        let session = CallSession {
            id,
            doctor: request.doctor,
            patient: request.patient,
            call_type: request.call_type,
            status: CallStatus::WaitingPatient,
            start_time,
        };
        self.active.insert(id, session.clone());

        debug!(
            session_id = %id,
            call_type = %session.call_type,
            "Call session created"
        );
        Ok(session)
    }

    /// Mark the patient as connected
    ///
    /// Connecting an already connected session changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::SessionNotFound`] if `id` is not active.
    pub fn connect(&mut self, id: SessionId) -> Result<&CallSession> {
        let session = self
            .active
            .get_mut(&id)
            .ok_or(TrackerError::SessionNotFound { id })?;

        if session.status == CallStatus::WaitingPatient {
            session.status = CallStatus::Connected;
            debug!(session_id = %id, "Patient connected");
        }

        Ok(&*session)
    }

    /// End a call now
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::SessionNotFound`] if `id` is not active.
    pub fn end(&mut self, id: SessionId) -> Result<CallHistoryEntry> {
        self.end_at(id, Utc::now())
    }

    /// End a call, moving it from the active set into history
    ///
    /// The recorded duration is the last value written by a tick, or
    /// `00:00` if no tick has touched the session yet. `end_time` never
    /// precedes the current head of history, so history stays sorted even
    /// if the wall clock steps backwards.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::SessionNotFound`] if `id` is not active.
    pub fn end_at(&mut self, id: SessionId, now: DateTime<Utc>) -> Result<CallHistoryEntry> {
        let session = self
            .active
            .shift_remove(&id)
            .ok_or(TrackerError::SessionNotFound { id })?;

        let duration = self
            .elapsed_display
            .remove(&id)
            .unwrap_or_else(|| format_elapsed(0));
        let end_time = self
            .history
            .front()
            .map_or(now, |latest| now.max(latest.end_time));

        let entry = CallHistoryEntry {
            id: Uuid::new_v4(),
            doctor: session.doctor,
            patient: session.patient,
            duration,
            end_time,
            status: HistoryStatus::Completed,
        };
        self.history.push_front(entry.clone());

        debug!(
            session_id = %id,
            history_id = %entry.id,
            duration = %entry.duration,
            "Call session ended"
        );
        Ok(entry)
    }

    /// Recompute the elapsed display for every active session
    ///
    /// Only the display cache changes; entries for sessions that are no longer
    /// active are dropped.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.elapsed_display = self
            .active
            .iter()
            .map(|(id, session)| {
                (
                    *id,
                    format_elapsed(elapsed_seconds(session.start_time, now)),
                )
            })
            .collect();

        trace!(sessions = self.elapsed_display.len(), "Elapsed display refreshed");
    }

    /// Displayed elapsed time for an active session, if ticked
    #[must_use]
    pub fn elapsed_display(&self, id: SessionId) -> Option<&str> {
        self.elapsed_display.get(&id).map(String::as_str)
    }

    /// Look up an active session
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<&CallSession> {
        self.active.get(&id)
    }

    /// Whether `id` is currently active
    #[must_use]
    pub fn contains(&self, id: SessionId) -> bool {
        self.active.contains_key(&id)
    }

    /// Active sessions in creation order, with their displayed elapsed time
    #[must_use]
    pub fn list_active(&self) -> Vec<ActiveCall> {
        self.active
            .values()
            .map(|session| ActiveCall {
                session: session.clone(),
                elapsed: self
                    .elapsed_display
                    .get(&session.id)
                    .cloned()
                    .unwrap_or_else(|| format_elapsed(0)),
            })
            .collect()
    }

    /// Concluded calls, most recent first
    #[must_use]
    pub fn list_history(&self) -> Vec<CallHistoryEntry> {
        self.history.iter().cloned().collect()
    }

    /// Ids of the active sessions in creation order
    #[must_use]
    pub fn active_ids(&self) -> Vec<SessionId> {
        self.active.keys().copied().collect()
    }

    /// Number of active sessions
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Number of concluded calls
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Summary counts
    #[must_use]
    pub fn stats(&self) -> TrackerStats {
        let connected = self
            .active
            .values()
            .filter(|s| s.status == CallStatus::Connected)
            .count();

        TrackerStats {
            active: self.active.len(),
            waiting_patient: self.active.len() - connected,
            connected,
            completed: self.history.len(),
        }
    }

    fn fresh_session_id(&self) -> SessionId {
        loop {
            let id = Uuid::new_v4();
            if !self.active.contains_key(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use telecare_core::CallType;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap()
    }

    fn request(doctor: &str, patient: &str) -> NewCallSession {
        NewCallSession::new(doctor, patient, CallType::Audio)
    }

    #[test]
    fn test_create_session_enters_waiting_patient() {
        let mut tracker = CallTracker::new();
        let session = tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap();

        assert_eq!(session.status, CallStatus::WaitingPatient);
        assert_eq!(session.start_time, t0());
        assert_eq!(tracker.active_len(), 1);
        assert_eq!(tracker.session(session.id), Some(&session));
    }

    #[test]
    fn test_create_session_rejects_blank_names() {
        let mut tracker = CallTracker::new();
        let err = tracker
            .create_session_at(request("Dr. A", "  "), t0())
            .unwrap_err();

        assert!(matches!(err, TrackerError::Validation { ref field, .. } if field == "patient"));
        assert_eq!(tracker.active_len(), 0);
    }

    #[test]
    fn test_connect_transitions_once() {
        let mut tracker = CallTracker::new();
        let id = tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap()
            .id;

        assert_eq!(tracker.connect(id).unwrap().status, CallStatus::Connected);
        assert_eq!(tracker.connect(id).unwrap().status, CallStatus::Connected);
        assert_eq!(tracker.active_len(), 1);
    }

    #[test]
    fn test_connect_unknown_id_is_not_found() {
        let mut tracker = CallTracker::new();
        tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap();

        let missing = Uuid::new_v4();
        let err = tracker.connect(missing).unwrap_err();

        assert!(matches!(err, TrackerError::SessionNotFound { id } if id == missing));
        assert_eq!(tracker.active_len(), 1);
    }

    #[test]
    fn test_tick_formats_elapsed() {
        let mut tracker = CallTracker::new();
        let id = tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap()
            .id;

        assert_eq!(tracker.elapsed_display(id), None);

        tracker.tick(t0() + Duration::seconds(5));
        assert_eq!(tracker.elapsed_display(id), Some("00:05"));

        tracker.tick(t0() + Duration::seconds(65));
        assert_eq!(tracker.elapsed_display(id), Some("01:05"));
    }

    #[test]
    fn test_tick_before_start_reads_zero() {
        let mut tracker = CallTracker::new();
        let id = tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap()
            .id;

        tracker.tick(t0() - Duration::seconds(10));
        assert_eq!(tracker.elapsed_display(id), Some("00:00"));
    }

    #[test]
    fn test_end_moves_session_into_history() {
        let mut tracker = CallTracker::new();
        let session = tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap();
        tracker.tick(t0() + Duration::seconds(65));

        let end_time = t0() + Duration::seconds(66);
        let entry = tracker.end_at(session.id, end_time).unwrap();

        assert_ne!(entry.id, session.id);
        assert_eq!(entry.doctor, "Dr. A");
        assert_eq!(entry.patient, "P1");
        assert_eq!(entry.duration, "01:05");
        assert_eq!(entry.end_time, end_time);
        assert_eq!(entry.status, HistoryStatus::Completed);

        assert!(!tracker.contains(session.id));
        assert_eq!(tracker.elapsed_display(session.id), None);
        assert_eq!(tracker.list_history(), vec![entry]);
    }

    #[test]
    fn test_end_without_tick_records_zero_duration() {
        let mut tracker = CallTracker::new();
        let id = tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap()
            .id;

        let entry = tracker.end_at(id, t0() + Duration::seconds(30)).unwrap();
        assert_eq!(entry.duration, "00:00");
    }

    #[test]
    fn test_end_twice_is_not_found() {
        let mut tracker = CallTracker::new();
        let id = tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap()
            .id;

        tracker.end_at(id, t0()).unwrap();
        assert!(tracker.end_at(id, t0()).unwrap_err().is_not_found());
        assert_eq!(tracker.history_len(), 1);
    }

    #[test]
    fn test_end_clamps_end_time_to_history_head() {
        let mut tracker = CallTracker::new();
        let first = tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap()
            .id;
        let second = tracker
            .create_session_at(request("Dr. B", "P2"), t0())
            .unwrap()
            .id;

        let later = t0() + Duration::minutes(5);
        tracker.end_at(first, later).unwrap();
        let entry = tracker.end_at(second, t0()).unwrap();

        assert_eq!(entry.end_time, later);
        let history = tracker.list_history();
        assert!(history.windows(2).all(|w| w[0].end_time >= w[1].end_time));
    }

    #[test]
    fn test_list_active_keeps_creation_order_after_removal() {
        let mut tracker = CallTracker::new();
        let ids: Vec<_> = ["P1", "P2", "P3"]
            .iter()
            .map(|p| {
                tracker
                    .create_session_at(request("Dr. A", p), t0())
                    .unwrap()
                    .id
            })
            .collect();

        tracker.end_at(ids[1], t0()).unwrap();

        let listed: Vec<_> = tracker.list_active().iter().map(|c| c.session.id).collect();
        assert_eq!(listed, vec![ids[0], ids[2]]);
        assert_eq!(tracker.active_ids(), listed);
    }

    #[test]
    fn test_list_active_falls_back_to_zero_elapsed() {
        let mut tracker = CallTracker::new();
        tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap();

        let active = tracker.list_active();
        assert_eq!(active[0].elapsed, "00:00");
    }

    #[test]
    fn test_tick_does_not_resurrect_ended_sessions() {
        let mut tracker = CallTracker::new();
        let id = tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap()
            .id;
        tracker.tick(t0() + Duration::seconds(3));
        tracker.end_at(id, t0() + Duration::seconds(4)).unwrap();

        tracker.tick(t0() + Duration::seconds(5));
        assert_eq!(tracker.elapsed_display(id), None);
        assert_eq!(tracker.active_len(), 0);
        assert_eq!(tracker.history_len(), 1);
    }

    #[test]
    fn test_stats_counts_by_status() {
        let mut tracker = CallTracker::new();
        let a = tracker
            .create_session_at(request("Dr. A", "P1"), t0())
            .unwrap()
            .id;
        let b = tracker
            .create_session_at(request("Dr. B", "P2"), t0())
            .unwrap()
            .id;
        tracker
            .create_session_at(request("Dr. C", "P3"), t0())
            .unwrap();

        tracker.connect(a).unwrap();
        tracker.end_at(b, t0()).unwrap();

        assert_eq!(
            tracker.stats(),
            TrackerStats {
                active: 2,
                waiting_patient: 1,
                connected: 1,
                completed: 1,
            }
        );
    }
}
