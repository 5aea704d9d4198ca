//! Error types for the call session tracker

use std::{error::Error as StdError, fmt};
use telecare_core::SessionId;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that can occur while tracking call sessions
#[derive(Debug)]
pub enum TrackerError {
    /// Connect or End referenced an id that is not active
    SessionNotFound {
        /// The id that was looked up
        id: SessionId,
    },

    /// Invalid session request
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// I/O error
    Io(std::io::Error),

    /// Any other core error
    Core(telecare_core::Error),

    /// Service not running
    ServiceNotRunning,

    /// Service already running
    ServiceAlreadyRunning,

    /// Shutdown error
    Shutdown {
        /// Error message
        message: String,
    },
}

impl TrackerError {
    /// Create a new configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new shutdown error
    #[must_use]
    pub fn shutdown<S: Into<String>>(message: S) -> Self {
        Self::Shutdown {
            message: message.into(),
        }
    }

    /// Whether this error is a lookup miss rather than a real failure
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound { .. })
    }
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionNotFound { id } => write!(f, "Call session not found: {id}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Core(err) => write!(f, "{err}"),
            Self::ServiceNotRunning => write!(f, "Tracker service is not running"),
            Self::ServiceAlreadyRunning => write!(f, "Tracker service is already running"),
            Self::Shutdown { message } => write!(f, "Shutdown error: {message}"),
        }
    }
}

impl StdError for TrackerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Core(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<telecare_core::Error> for TrackerError {
    fn from(err: telecare_core::Error) -> Self {
        match err {
            telecare_core::Error::Validation { field, message } => {
                Self::Validation { field, message }
            }
            telecare_core::Error::Configuration { message } => Self::Configuration { message },
            telecare_core::Error::Io(err) => Self::Io(err),
            other => Self::Core(other),
        }
    }
}

impl From<config::ConfigError> for TrackerError {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

impl From<toml::de::Error> for TrackerError {
    fn from(err: toml::de::Error) -> Self {
        Self::configuration(format!("Failed to parse config file: {err}"))
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    #[test]
    fn test_session_not_found_display() {
        let id = Uuid::nil();
        let error = TrackerError::SessionNotFound { id };
        assert_eq!(
            error.to_string(),
            "Call session not found: 00000000-0000-0000-0000-000000000000"
        );
        assert!(error.is_not_found());
    }

    #[test]
    fn test_core_validation_maps_to_validation() {
        let error: TrackerError = telecare_core::Error::validation("doctor", "empty").into();
        match error {
            TrackerError::Validation { field, message } => {
                assert_eq!(field, "doctor");
                assert_eq!(message, "empty");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_core_other_is_wrapped() {
        let error: TrackerError = telecare_core::Error::Other("odd".to_string()).into();
        assert!(matches!(error, TrackerError::Core(_)));
        assert!(error.source().is_some());
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_lifecycle_errors_display() {
        assert_eq!(
            TrackerError::ServiceAlreadyRunning.to_string(),
            "Tracker service is already running"
        );
        assert_eq!(
            TrackerError::ServiceNotRunning.to_string(),
            "Tracker service is not running"
        );
        assert_eq!(
            TrackerError::shutdown("timed out").to_string(),
            "Shutdown error: timed out"
        );
    }

    #[test]
    fn test_io_error_source() {
        let error = TrackerError::from(std::io::Error::other("disk"));
        assert!(error.source().is_some());
        assert!(error.to_string().contains("disk"));
    }
}
