//! Core types and utilities for the telecare call desk

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
pub mod types;
pub mod utils;

/// Boxed error with a human-readable context message, used by the binaries
pub mod context_error {
    use std::{error::Error as StdError, fmt};

    /// An error message optionally wrapping the error that caused it
    #[derive(Debug)]
    pub struct ContextError {
        message: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
    }

    impl ContextError {
        /// Create a context error from a bare message
        pub fn new<S: Into<String>>(message: S) -> Self {
            Self {
                message: message.into(),
                source: None,
            }
        }

        /// Wrap an existing error under a context message
        pub fn wrap<E, S>(error: E, message: S) -> Self
        where
            E: StdError + Send + Sync + 'static,
            S: Into<String>,
        {
            Self {
                message: message.into(),
                source: Some(Box::new(error)),
            }
        }
    }

    impl fmt::Display for ContextError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match &self.source {
                Some(source) => write!(f, "{}: {source}", self.message),
                None => write!(f, "{}", self.message),
            }
        }
    }

    impl StdError for ContextError {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn StdError + 'static))
        }
    }

    /// Result type alias for context errors
    pub type Result<T> = std::result::Result<T, ContextError>;

    /// Build a [`ContextError`] from a format string
    #[macro_export]
    macro_rules! context_error {
        ($msg:literal) => {
            $crate::context_error::ContextError::new(format!($msg))
        };
        ($fmt:expr, $($arg:tt)*) => {
            $crate::context_error::ContextError::new(format!($fmt, $($arg)*))
        };
    }

    /// Attach context to any fallible result
    pub trait ResultExt<T> {
        /// Wrap the error, computing the message lazily
        ///
        /// # Errors
        ///
        /// Returns the original error wrapped in a [`ContextError`].
        fn context<F, S>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> S,
            S: Into<String>;
    }

    impl<T, E> ResultExt<T> for std::result::Result<T, E>
    where
        E: StdError + Send + Sync + 'static,
    {
        fn context<F, S>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> S,
            S: Into<String>,
        {
            self.map_err(|e| ContextError::wrap(e, f()))
        }
    }

    impl From<std::io::Error> for ContextError {
        fn from(err: std::io::Error) -> Self {
            Self::wrap(err, "I/O operation failed")
        }
    }

    impl From<crate::Error> for ContextError {
        fn from(err: crate::Error) -> Self {
            Self::wrap(err, "Core error")
        }
    }
}

// Re-export commonly used types
pub use config::{Config, LoggingConfig};
pub use error::{Error, Result};
pub use types::{
    ActiveCall, CallHistoryEntry, CallSession, CallStatus, CallType, HistoryStatus,
    NewCallSession, SessionId, TrackerStats,
};
pub use utils::{elapsed_seconds, format_elapsed};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level. The `format` field
/// selects between `json` and `pretty` output; anything else falls back to the
/// compact text formatter.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_logging(logging: &LoggingConfig) -> context_error::Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match logging.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        "pretty" => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
    };

    result.map_err(|e| context_error::ContextError::wrap(e, "Failed to install logger"))
}
