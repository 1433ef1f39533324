//! Driver capability set consumed by the search and wait engines.
//!
//! pagewait does not talk to a browser itself. A browser-automation backend
//! (WebDriver client, CDP client, or the in-memory [`crate::mock`] driver)
//! implements these traits and the engines only ever go through them.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  Session  ──────► SearchContext ◄────── Element           │
//! │  navigate/refresh   find_elements        state readers    │
//! │  title/current_url                       click/send_keys  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Every element read may fail with [`DriverError::StaleElement`] when the
//! node behind the handle has left the document. Locating never reports
//! "nothing found" as an error: an empty vector is returned instead.

use crate::locator::Locator;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors raised by a driver backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The element handle no longer refers to an attached node
    #[error("stale element reference: {message}")]
    StaleElement {
        /// Error message
        message: String,
    },

    /// The session is unusable
    #[error("session error: {message}")]
    Session {
        /// Error message
        message: String,
    },
}

impl DriverError {
    /// Create a stale element error
    #[must_use]
    pub fn stale(message: impl Into<String>) -> Self {
        Self::StaleElement {
            message: message.into(),
        }
    }

    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Classify the error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::StaleElement { .. } => ErrorKind::StaleElement,
            Self::Session { .. } => ErrorKind::Session,
        }
    }

    /// Whether the node behind a handle disappeared
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleElement { .. })
    }
}

/// Failure kinds seen by the wait engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Nothing matched the locator and criteria yet
    NotFound,
    /// An element went stale mid-check
    StaleElement,
    /// The session is unusable; never retried
    Session,
}

impl ErrorKind {
    /// Whether a wait may swallow this kind and keep polling
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::NotFound | Self::StaleElement)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not-found",
            Self::StaleElement => "stale-element",
            Self::Session => "session",
        };
        f.write_str(name)
    }
}

/// Anything elements can be located in: a session (whole document) or an
/// element (its subtree).
pub trait SearchContext {
    /// Element handle type produced by this backend
    type Element: Element + 'static;

    /// Locate every element matching `locator`, in document order.
    ///
    /// Returns an empty vector when nothing matches. Errors only for
    /// session-level failures (or a stale parent when the context is an
    /// element).
    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<Self::Element>>;
}

/// A located element.
///
/// Handles are cheap to clone and are never cached by pagewait; each wait
/// iteration locates them again.
pub trait Element: SearchContext<Element = Self> + Clone + fmt::Debug + Sized + 'static {
    /// Lower-case tag name
    fn tag_name(&self) -> DriverResult<String>;

    /// Whether the element is rendered and visible
    fn is_displayed(&self) -> DriverResult<bool>;

    /// Whether the element is enabled
    fn is_enabled(&self) -> DriverResult<bool>;

    /// Whether a checkbox, radio button or option is selected
    fn is_selected(&self) -> DriverResult<bool>;

    /// Visible text
    fn text(&self) -> DriverResult<String>;

    /// Attribute or property value, `None` if absent
    fn attribute(&self, name: &str) -> DriverResult<Option<String>>;

    /// Serialized markup of the element
    fn outer_html(&self) -> DriverResult<String>;

    /// Click the element
    fn click(&self) -> DriverResult<()>;

    /// Type text into the element
    fn send_keys(&self, text: &str) -> DriverResult<()>;

    /// Clear an editable element
    fn clear(&self) -> DriverResult<()>;
}

/// A live browser session owned by exactly one test at a time
pub trait Session: SearchContext {
    /// Backend session identifier
    fn session_id(&self) -> String;

    /// Load a URL and return once the browser reports the load finished
    fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Reload the current document
    fn refresh(&self) -> DriverResult<()>;

    /// URL of the current document
    fn current_url(&self) -> DriverResult<String>;

    /// Title of the current document
    fn title(&self) -> DriverResult<String>;

    /// End the session
    fn quit(&self) -> DriverResult<()>;
}
