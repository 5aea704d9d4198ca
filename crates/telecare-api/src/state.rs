//! Application state management

use std::sync::Arc;
use std::time::Instant;
use telecare_core::Config;
use telecare_tracker::TrackerService;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Call session tracker
    pub tracker: Arc<TrackerService>,
    /// When the server state was built
    pub started_at: Instant,
}

impl AppState {
    /// Create new application state
    #[must_use]
    pub fn new(config: Config, tracker: Arc<TrackerService>) -> Self {
        Self {
            config,
            tracker,
            started_at: Instant::now(),
        }
    }

    /// Seconds since the state was created
    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use telecare_tracker::TrackerConfig;

    #[test]
    fn test_app_state_shares_tracker() {
        let tracker = Arc::new(TrackerService::new(TrackerConfig::default()).unwrap());
        let state = AppState::new(Config::default(), tracker.clone());
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.tracker, &cloned.tracker));
        assert_eq!(Arc::strong_count(&tracker), 3);
        assert_eq!(state.uptime_seconds(), 0);
    }
}
