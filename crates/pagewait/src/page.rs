//! Page Object Model support.
//!
//! A page wraps a [`Session`], knows its URL relative to a base URL, and
//! declares a readiness criterion. Navigation waits for readiness before
//! handing control back to the test:
//!
//! ```ignore
//! struct LoginPage { session: MockSession, ready: Criterion<LoginPage> }
//!
//! impl Page for LoginPage {
//!     type Session = MockSession;
//!     fn session(&self) -> &MockSession { &self.session }
//!     fn base_url(&self) -> &str { "http://localhost:8080/" }
//!     fn page_url(&self) -> &str { "login" }
//!     fn ready_criteria(&self) -> Criterion<Self> { self.ready.clone() }
//! }
//!
//! let page = LoginPage::new(session);
//! page.go_to(true)?;   // navigate, then wait for readiness
//! ```

use crate::criteria::Criterion;
use crate::driver::{Element, SearchContext, Session};
use crate::locator::Locator;
use crate::result::{PagewaitError, PagewaitResult};
use crate::search::SearchContextExt;
use crate::wait::{wait_until, WaitOptions, DEFAULT_WAIT_TIMEOUT_MS};

/// Element type produced by a page's session
pub type PageElement<P> = <<P as Page>::Session as SearchContext>::Element;

/// Join a base URL and a page URL with exactly one `/` between them.
///
/// Absolute page URLs are returned unchanged.
#[must_use]
pub fn join_url(base_url: &str, page_url: &str) -> String {
    if page_url.starts_with("http://") || page_url.starts_with("https://") {
        return page_url.to_string();
    }
    let base = base_url.trim_end_matches('/');
    let page = page_url.trim_start_matches('/');
    if page.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{page}")
    }
}

/// A navigable page with a readiness check
pub trait Page {
    /// Session type the page drives
    type Session: Session;

    /// The session this page wraps
    fn session(&self) -> &Self::Session;

    /// URL of the site root
    fn base_url(&self) -> &str;

    /// URL of this page relative to [`Page::base_url`]
    fn page_url(&self) -> &str;

    /// What must hold before the page is usable
    fn ready_criteria(&self) -> Criterion<Self>;

    /// How long [`Page::wait_for_initialize`] waits
    fn ready_timeout_ms(&self) -> u64 {
        DEFAULT_WAIT_TIMEOUT_MS
    }

    /// Page name for logging and errors
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Absolute URL of this page
    fn url(&self) -> String {
        join_url(self.base_url(), self.page_url())
    }

    /// Title of the current document.
    ///
    /// # Errors
    ///
    /// Session errors.
    fn title(&self) -> PagewaitResult<String> {
        Ok(self.session().title()?)
    }

    /// Navigate to [`Page::url`], optionally waiting for readiness.
    ///
    /// # Errors
    ///
    /// Session errors, or [`PagewaitError::PageNotReady`].
    fn go_to(&self, wait_for_initialize: bool) -> PagewaitResult<()> {
        let url = self.url();
        tracing::debug!(page = self.name(), %url, "navigating");
        self.session().navigate(&url)?;
        if wait_for_initialize {
            self.wait_for_initialize()?;
        }
        Ok(())
    }

    /// Reload the current document, optionally waiting for readiness.
    ///
    /// # Errors
    ///
    /// Session errors, or [`PagewaitError::PageNotReady`].
    fn refresh(&self, wait_for_initialize: bool) -> PagewaitResult<()> {
        tracing::debug!(page = self.name(), "refreshing");
        self.session().refresh()?;
        if wait_for_initialize {
            self.wait_for_initialize()?;
        }
        Ok(())
    }

    /// Block until [`Page::ready_criteria`] holds.
    ///
    /// # Errors
    ///
    /// [`PagewaitError::PageNotReady`] naming the page, its URL and the
    /// unmet criteria; session errors pass through.
    fn wait_for_initialize(&self) -> PagewaitResult<()> {
        let options = WaitOptions::new().with_timeout(self.ready_timeout_ms());
        let criterion = self.ready_criteria();
        match wait_until(self, &criterion, &options) {
            Ok(waited) => {
                tracing::debug!(
                    page = self.name(),
                    attempts = waited.attempts,
                    elapsed_ms = u64::try_from(waited.elapsed.as_millis()).unwrap_or(u64::MAX),
                    "page ready"
                );
                Ok(())
            }
            Err(PagewaitError::PollTimeout {
                diagnostic,
                elapsed_ms,
                timeout_ms,
                ..
            }) => Err(PagewaitError::PageNotReady {
                page: self.name().to_string(),
                url: self.url(),
                diagnostic,
                elapsed_ms,
                timeout_ms,
            }),
            Err(err) => Err(err),
        }
    }

    /// Evaluate readiness once; a stale read counts as not ready.
    ///
    /// # Errors
    ///
    /// Session errors.
    fn is_ready(&self) -> PagewaitResult<bool> {
        match self.ready_criteria().evaluate(self) {
            Ok(ready) => Ok(ready),
            Err(err) if err.is_stale() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Page-level criterion: an element matching `locator` exists in the page's
/// session and meets every element criterion.
#[must_use]
pub fn element_criterion<P>(
    description: impl Into<String>,
    locator: Locator,
    criteria: Vec<Criterion<PageElement<P>>>,
) -> Criterion<P>
where
    P: Page + ?Sized,
{
    Criterion::new(description, move |page: &P| {
        Ok(page
            .session()
            .find_first_or_default(&locator, &criteria)?
            .is_some())
    })
}

/// Click `trigger`, wait for `next` to become ready, and return it.
///
/// # Errors
///
/// Driver errors from the click, or [`PagewaitError::PageNotReady`] from
/// `next`.
pub fn advance_to<E, N>(trigger: &E, next: N) -> PagewaitResult<N>
where
    E: Element,
    N: Page,
{
    tracing::debug!(next = next.name(), "advancing");
    trigger.click()?;
    next.wait_for_initialize()?;
    Ok(next)
}
