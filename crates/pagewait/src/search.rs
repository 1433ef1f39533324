//! Element search with criteria filtering.
//!
//! Every search locates fresh handles through [`SearchContext::find_elements`]
//! and then filters them in document order. An element that goes stale while
//! its criteria are being evaluated is skipped; session errors abort the
//! search.

use crate::criteria::Criterion;
use crate::driver::{DriverResult, Element, SearchContext};
use crate::locator::Locator;
use crate::result::{PagewaitError, PagewaitResult};
use std::fmt;

/// Placeholder shown for elements that went stale before their markup
/// could be read
pub const STALE_PLACEHOLDER: &str = "<stale element>";

/// Why a search came back empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundReason {
    locator: Locator,
    located: usize,
    criteria: String,
    elements: Vec<String>,
}

impl NotFoundReason {
    /// Locator that was searched
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// How many elements the locator matched before filtering
    #[must_use]
    pub const fn located(&self) -> usize {
        self.located
    }

    /// Combined description of the criteria
    #[must_use]
    pub fn criteria(&self) -> &str {
        &self.criteria
    }

    /// Outer markup of each located element
    #[must_use]
    pub fn elements(&self) -> &[String] {
        &self.elements
    }
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.located == 0 {
            write!(f, "Found 0 elements matching {}", self.locator)?;
            if !self.criteria.is_empty() {
                write!(f, " (criteria: {})", self.criteria)?;
            }
            return Ok(());
        }
        write!(
            f,
            "Found {} elements matching {}, but none of them met all criteria: {}.\n\nElements:\n{}",
            self.located,
            self.locator,
            self.criteria,
            self.elements.join("\n")
        )
    }
}

/// Result of a first-match search
#[derive(Debug, Clone)]
pub enum SearchOutcome<E> {
    /// The first element meeting every criterion
    Found(E),
    /// Nothing qualified
    NotFound(NotFoundReason),
}

impl<E> SearchOutcome<E> {
    /// Whether an element was found
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The element, if found
    #[must_use]
    pub fn into_option(self) -> Option<E> {
        match self {
            Self::Found(element) => Some(element),
            Self::NotFound(_) => None,
        }
    }

    /// Convert into a result carrying [`PagewaitError::ElementNotFound`].
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` with the formatted reason when nothing
    /// was found.
    pub fn into_result(self) -> PagewaitResult<E> {
        match self {
            Self::Found(element) => Ok(element),
            Self::NotFound(reason) => Err(PagewaitError::ElementNotFound {
                message: reason.to_string(),
            }),
        }
    }
}

/// `Some(matched)` or `None` if the element went stale mid-check
fn qualifies<E: Element>(element: &E, criteria: &[Criterion<E>]) -> DriverResult<Option<bool>> {
    for criterion in criteria {
        match criterion.evaluate(element) {
            Ok(true) => {}
            Ok(false) => return Ok(Some(false)),
            Err(e) if e.is_stale() => {
                tracing::trace!(element = ?element, criterion = %criterion, "skipping stale element");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(Some(true))
}

fn describe<E>(criteria: &[Criterion<E>]) -> String {
    Criterion::all(criteria.iter().cloned()).description()
}

fn not_found<E: Element>(
    locator: &Locator,
    criteria: &[Criterion<E>],
    located: &[E],
) -> DriverResult<NotFoundReason> {
    let mut elements = Vec::with_capacity(located.len());
    for element in located {
        match element.outer_html() {
            Ok(html) => elements.push(html),
            Err(e) if e.is_stale() => elements.push(STALE_PLACEHOLDER.to_string()),
            Err(e) => return Err(e),
        }
    }
    Ok(NotFoundReason {
        locator: locator.clone(),
        located: located.len(),
        criteria: describe(criteria),
        elements,
    })
}

/// Criteria-aware search, available on every [`SearchContext`]
pub trait SearchContextExt: SearchContext {
    /// Every located element meeting all criteria, in document order.
    ///
    /// # Errors
    ///
    /// Propagates session errors. Stale elements are skipped.
    fn find_all(
        &self,
        locator: &Locator,
        criteria: &[Criterion<Self::Element>],
    ) -> DriverResult<Vec<Self::Element>> {
        let located = self.find_elements(locator)?;
        let mut matched = Vec::with_capacity(located.len());
        for element in located {
            if qualifies(&element, criteria)? == Some(true) {
                matched.push(element);
            }
        }
        Ok(matched)
    }

    /// First located element meeting all criteria, with the reason when
    /// nothing qualifies.
    ///
    /// # Errors
    ///
    /// Propagates session errors. Stale elements are skipped.
    fn find_first(
        &self,
        locator: &Locator,
        criteria: &[Criterion<Self::Element>],
    ) -> DriverResult<SearchOutcome<Self::Element>> {
        let located = self.find_elements(locator)?;
        for element in &located {
            if qualifies(element, criteria)? == Some(true) {
                return Ok(SearchOutcome::Found(element.clone()));
            }
        }
        Ok(SearchOutcome::NotFound(not_found(locator, criteria, &located)?))
    }

    /// First located element meeting all criteria, or `None`.
    ///
    /// # Errors
    ///
    /// Propagates session errors.
    fn find_first_or_default(
        &self,
        locator: &Locator,
        criteria: &[Criterion<Self::Element>],
    ) -> DriverResult<Option<Self::Element>> {
        let located = self.find_elements(locator)?;
        for element in located {
            if qualifies(&element, criteria)? == Some(true) {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    /// First located element meeting all criteria.
    ///
    /// # Errors
    ///
    /// Returns [`PagewaitError::ElementNotFound`] naming the locator, the
    /// number of located elements, the criteria and each element's markup.
    fn find_first_or_fail(
        &self,
        locator: &Locator,
        criteria: &[Criterion<Self::Element>],
    ) -> PagewaitResult<Self::Element> {
        self.find_first(locator, criteria)?.into_result()
    }

    /// Whether any located element meets all criteria.
    ///
    /// # Errors
    ///
    /// Propagates session errors.
    fn exists(
        &self,
        locator: &Locator,
        criteria: &[Criterion<Self::Element>],
    ) -> DriverResult<bool> {
        Ok(self.find_first_or_default(locator, criteria)?.is_some())
    }
}

impl<C: SearchContext + ?Sized> SearchContextExt for C {}
