//! Core data types for consult call tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Call session identifier type
pub type SessionId = Uuid;

/// Medium of a consult call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    /// Voice-only call
    Audio,
    /// Video call
    Video,
}

impl std::fmt::Display for CallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Observable state of an active call
///
/// There is no `Ended` variant: an ended call leaves the active set and
/// becomes a [`CallHistoryEntry`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// Doctor is on the line, patient has not joined yet
    #[default]
    WaitingPatient,
    /// Both parties are connected
    Connected,
}

impl CallStatus {
    /// Human-readable label for display
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WaitingPatient => "Waiting for Patient",
            Self::Connected => "Connected",
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingPatient => write!(f, "waiting_patient"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Status of a concluded call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    /// The call ended normally
    #[default]
    Completed,
}

impl HistoryStatus {
    /// Human-readable label for display
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
        }
    }
}

/// One ongoing consult call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallSession {
    /// Unique among active sessions, assigned at creation
    pub id: SessionId,

    /// Doctor display name
    pub doctor: String,

    /// Patient display name
    pub patient: String,

    /// Audio or video
    #[serde(rename = "type")]
    pub call_type: CallType,

    /// Current lifecycle state
    pub status: CallStatus,

    /// When the session was created
    pub start_time: DateTime<Utc>,
}

/// An immutable record of a concluded call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallHistoryEntry {
    /// Fresh identifier, never the originating session's id
    pub id: Uuid,

    /// Doctor display name, copied from the session
    pub doctor: String,

    /// Patient display name, copied from the session
    pub patient: String,

    /// Last displayed elapsed time, frozen at conclusion (`MM:SS`)
    pub duration: String,

    /// When the call ended
    pub end_time: DateTime<Utc>,

    /// Always [`HistoryStatus::Completed`]
    pub status: HistoryStatus,
}

/// Inbound request to open a new call session
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct NewCallSession {
    /// Doctor display name
    #[validate(length(min = 1, max = 255))]
    pub doctor: String,

    /// Patient display name
    #[validate(length(min = 1, max = 255))]
    pub patient: String,

    /// Audio or video
    #[serde(rename = "type")]
    pub call_type: CallType,
}

impl NewCallSession {
    /// Build a request, trimming surrounding whitespace from the names
    #[must_use]
    pub fn new<D: AsRef<str>, P: AsRef<str>>(doctor: D, patient: P, call_type: CallType) -> Self {
        Self {
            doctor: doctor.as_ref().trim().to_string(),
            patient: patient.as_ref().trim().to_string(),
            call_type,
        }
    }

    /// Trim names and validate field lengths
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] naming the first offending field.
    pub fn normalized(self) -> crate::Result<Self> {
        let request = Self::new(&self.doctor, &self.patient, self.call_type);

        if let Err(errors) = request.validate() {
            let field = errors
                .field_errors()
                .keys()
                .min()
                .map_or_else(|| "request".to_string(), ToString::to_string);
            return Err(crate::Error::validation(
                field,
                "must be between 1 and 255 characters",
            ));
        }

        Ok(request)
    }
}

/// An active session paired with its displayed elapsed time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveCall {
    /// The live session
    #[serde(flatten)]
    pub session: CallSession,

    /// `MM:SS` from the most recent tick, `00:00` before the first one
    pub elapsed: String,
}

/// Summary counts for the call desk
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TrackerStats {
    /// Number of active sessions
    pub active: usize,

    /// Active sessions waiting for the patient
    pub waiting_patient: usize,

    /// Active sessions with both parties connected
    pub connected: usize,

    /// Concluded calls in history
    pub completed: usize,
}
