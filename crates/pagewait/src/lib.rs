//! Pagewait: Page Objects and Polling Waits for Browser UI Tests
//!
//! Pagewait is the synchronization core of a page-object test suite. Tests
//! describe what must be true of a page or element as composable
//! [`Criterion`] values, and the engine locates elements and polls until
//! those criteria hold, failing with a message that says exactly what was
//! still unmet.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PAGEWAIT Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Page       │    │ Search /   │    │ Driver     │            │
//! │   │ Objects +  │───►│ Wait       │───►│ backend    │            │
//! │   │ Criteria   │    │ engines    │    │ (traits)   │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                 │                                      │
//! │         ▼                 ▼                                      │
//! │   ┌────────────┐    ┌────────────┐                               │
//! │   │ Fixtures   │    │ Diagnostics│                               │
//! │   │ + Config   │    │ (errors)   │                               │
//! │   └────────────┘    └────────────┘                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use pagewait::prelude::*;
//! use pagewait::criteria::element::{is_enabled, is_visible};
//! use pagewait::mock::{MockNode, MockSession};
//!
//! let session = MockSession::new();
//! session.append(MockNode::new("button").with_id("submit"));
//!
//! let options = WaitOptions::new().with_timeout(1_000).with_poll_interval(10);
//! let button = wait_for_element(
//!     &session,
//!     &Locator::id("submit"),
//!     &[is_visible(), is_enabled()],
//!     &options,
//! )
//! .unwrap();
//! button.click().unwrap();
//! ```

#![warn(missing_docs)]

/// Session configuration (YAML files and environment overrides)
pub mod config;
/// Composable criteria over pages and elements
pub mod criteria;
/// Capability traits a browser backend implements
pub mod driver;
/// Per-test session fixtures
pub mod fixture;
/// Element locators
pub mod locator;
/// Tracing subscriber helpers
pub mod logging;
/// In-memory driver for tests
pub mod mock;
/// Page Object Model
pub mod page;
mod result;
/// Element search with not-found diagnostics
pub mod search;
/// `<select>` adapter
pub mod select;
/// Polling wait engine
pub mod wait;

pub use config::{BrowserKind, BrowserMode, SessionConfig};
pub use criteria::{
    describe_all, failures, meets_all, meets_any, unmet_descriptions, Combinator, Criteria,
    Criterion, FnCriteria,
};
pub use driver::{DriverError, DriverResult, Element, ErrorKind, SearchContext, Session};
pub use fixture::{BrowserFixture, Fixture, FixtureScope, SessionFactory};
pub use locator::{Locator, Selector};
pub use page::{advance_to, element_criterion, join_url, Page, PageElement};
pub use result::{PagewaitError, PagewaitResult};
pub use search::{NotFoundReason, SearchContextExt, SearchOutcome};
pub use select::Select;
pub use wait::{
    wait_for, wait_for_element, wait_for_element_absent, wait_for_select, wait_until,
    wait_until_all, wait_until_any, Attempt, WaitOptions, Waited, Waiter,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::fixture::*;
    pub use super::locator::*;
    pub use super::page::*;
    pub use super::result::*;
    pub use super::search::*;
    pub use super::select::*;
    pub use super::wait::*;
    pub use super::{Combinator, Criteria, Criterion, FnCriteria};
}
