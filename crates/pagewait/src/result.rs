//! Result and error types for pagewait.

use crate::driver::{DriverError, ErrorKind};
use thiserror::Error;

/// Result type for pagewait operations
pub type PagewaitResult<T> = Result<T, PagewaitError>;

/// Errors that can cross the pagewait boundary
#[derive(Debug, Error)]
pub enum PagewaitError {
    /// The browser session is unusable (crashed, disconnected, terminated)
    #[error("Browser session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// A direct element operation hit a node that is no longer attached
    #[error("Stale element: {message}")]
    StaleElement {
        /// Error message
        message: String,
    },

    /// No element matched a locator and its criteria
    #[error("{message}")]
    ElementNotFound {
        /// Formatted search diagnostic
        message: String,
    },

    /// A wait deadline elapsed without success
    #[error("Timed out after {elapsed_ms}ms (timeout {timeout_ms}ms) waiting for {waited_for}: {diagnostic}")]
    PollTimeout {
        /// What was being waited for
        waited_for: String,
        /// Unmet criteria or last not-found message
        diagnostic: String,
        /// Time spent waiting
        elapsed_ms: u64,
        /// Configured timeout
        timeout_ms: u64,
    },

    /// A page did not become ready after navigation
    #[error("Page '{page}' at {url} was not ready after {elapsed_ms}ms (timeout {timeout_ms}ms): {diagnostic}")]
    PageNotReady {
        /// Page name
        page: String,
        /// URL that was loaded
        url: String,
        /// Unmet readiness criteria
        diagnostic: String,
        /// Time spent waiting
        elapsed_ms: u64,
        /// Configured timeout
        timeout_ms: u64,
    },

    /// Element has the wrong tag for the requested adapter
    #[error("Element should have been {expected} but was {actual}")]
    UnexpectedTagName {
        /// Expected tag
        expected: String,
        /// Actual tag
        actual: String,
    },

    /// Invalid argument passed by the caller
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    FixtureError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PagewaitError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error is a wait or page readiness timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::PollTimeout { .. } | Self::PageNotReady { .. })
    }

    /// Whether this error means the session is gone
    #[must_use]
    pub const fn is_session(&self) -> bool {
        matches!(self, Self::Session { .. })
    }

    /// Kind as seen by the wait engine, `None` for errors it never ignores
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::ElementNotFound { .. } => Some(ErrorKind::NotFound),
            Self::StaleElement { .. } => Some(ErrorKind::StaleElement),
            Self::Session { .. } => Some(ErrorKind::Session),
            _ => None,
        }
    }
}

impl From<DriverError> for PagewaitError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::StaleElement { message } => Self::StaleElement { message },
            DriverError::Session { message } => Self::Session { message },
        }
    }
}
