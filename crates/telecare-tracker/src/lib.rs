//! Call session tracking for the telecare call desk
//!
//! This crate keeps the set of active doctor-patient consult calls, moves
//! them through `waiting_patient` and `connected`, keeps a per-call
//! `MM:SS` elapsed display current with a periodic tick, and records each
//! concluded call in a most-recent-first history.
//!
//! [`CallTracker`] is the synchronous state machine; [`TrackerService`] owns
//! one behind a lock and drives its tick from a background task.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod fixtures;
pub mod service;
pub mod tracker;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use service::{ServiceMetrics, ServiceStatus, TrackerService};
pub use tracker::CallTracker;

/// Initialize the tracker service with configuration from files and environment
///
/// # Errors
///
/// Returns [`TrackerError`] if:
/// - Configuration loading fails
/// - Configuration values are out of range
pub fn init() -> Result<TrackerService> {
    let config = TrackerConfig::load()?;
    TrackerService::new(config)
}

/// Initialize the tracker service with custom configuration
///
/// # Errors
///
/// Returns [`TrackerError`] if the configuration is invalid or demo seeding
/// fails.
pub fn init_with_config(config: TrackerConfig) -> Result<TrackerService> {
    TrackerService::new(config)
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use telecare_core::{CallType, NewCallSession};

    #[test]
    fn test_re_exports() {
        let _config = TrackerConfig::default();
        let _error = TrackerError::configuration("test");
        let _status = ServiceStatus::Stopped;
        let _tracker = CallTracker::new();
    }

    #[test]
    fn test_init_with_config_starts_empty() {
        let service = init_with_config(TrackerConfig::default()).unwrap();

        assert!(service.list_active().is_empty());
        assert!(service.list_history().is_empty());
        assert_eq!(service.status(), ServiceStatus::Stopped);
    }

    #[test]
    fn test_init_with_config_accepts_sessions() {
        let service = init_with_config(TrackerConfig::default()).unwrap();
        let session = service
            .create_session(NewCallSession::new("Dr. A", "P", CallType::Audio))
            .unwrap();

        assert_eq!(service.active_ids(), vec![session.id]);
    }

    #[test]
    fn test_error_debug() {
        let error = TrackerError::configuration("test error");
        let debug = format!("{error:?}");
        assert!(debug.contains("Configuration"));
        assert!(debug.contains("test error"));
    }
}
