//! Adapter for `<select>` controls.

use crate::driver::Element;
use crate::locator::Locator;
use crate::result::{PagewaitError, PagewaitResult};

/// A located `<select>` element
#[derive(Debug, Clone)]
pub struct Select<E: Element> {
    element: E,
    multiple: bool,
}

impl<E: Element> Select<E> {
    /// Wrap an element.
    ///
    /// # Errors
    ///
    /// [`PagewaitError::UnexpectedTagName`] when the element is not a
    /// `<select>`, or the driver error raised while reading it.
    pub fn new(element: E) -> PagewaitResult<Self> {
        let tag = element.tag_name()?;
        if !tag.eq_ignore_ascii_case("select") {
            return Err(PagewaitError::UnexpectedTagName {
                expected: "select".to_string(),
                actual: tag,
            });
        }
        let multiple = element
            .attribute("multiple")?
            .is_some_and(|value| value != "false");
        Ok(Self { element, multiple })
    }

    /// The wrapped element
    #[must_use]
    pub const fn element(&self) -> &E {
        &self.element
    }

    /// Unwrap
    pub fn into_inner(self) -> E {
        self.element
    }

    /// Whether more than one option may be selected
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Every `<option>`, in document order.
    ///
    /// # Errors
    ///
    /// Driver errors from locating the options.
    pub fn options(&self) -> PagewaitResult<Vec<E>> {
        Ok(self.element.find_elements(&Locator::tag_name("option"))?)
    }

    /// Options currently selected.
    ///
    /// # Errors
    ///
    /// Driver errors from reading the options.
    pub fn selected_options(&self) -> PagewaitResult<Vec<E>> {
        let mut selected = Vec::new();
        for option in self.options()? {
            if option.is_selected()? {
                selected.push(option);
            }
        }
        Ok(selected)
    }

    /// First selected option.
    ///
    /// # Errors
    ///
    /// [`PagewaitError::ElementNotFound`] when nothing is selected.
    pub fn first_selected_option(&self) -> PagewaitResult<E> {
        for option in self.options()? {
            if option.is_selected()? {
                return Ok(option);
            }
        }
        Err(PagewaitError::ElementNotFound {
            message: "No options are selected".to_string(),
        })
    }

    /// Visible text of every option.
    ///
    /// # Errors
    ///
    /// Driver errors from reading the options.
    pub fn option_texts(&self) -> PagewaitResult<Vec<String>> {
        self.options()?
            .iter()
            .map(|option| option.text().map_err(Into::into))
            .collect()
    }

    /// Select every option whose text equals `text` (the first only for a
    /// single select).
    ///
    /// # Errors
    ///
    /// [`PagewaitError::ElementNotFound`] when no option has that text.
    pub fn select_by_text(&self, text: &str) -> PagewaitResult<()> {
        let matched = self.select_where(|option| Ok(option.text()? == text))?;
        if matched {
            Ok(())
        } else {
            Err(not_found("text", text))
        }
    }

    /// Select every option whose `value` equals `value` (the first only for
    /// a single select).
    ///
    /// # Errors
    ///
    /// [`PagewaitError::ElementNotFound`] when no option has that value.
    pub fn select_by_value(&self, value: &str) -> PagewaitResult<()> {
        let matched =
            self.select_where(|option| Ok(option.attribute("value")?.as_deref() == Some(value)))?;
        if matched {
            Ok(())
        } else {
            Err(not_found("value", value))
        }
    }

    /// Select the option at `index` (zero-based, document order).
    ///
    /// # Errors
    ///
    /// [`PagewaitError::ElementNotFound`] when `index` is out of range.
    pub fn select_by_index(&self, index: usize) -> PagewaitResult<()> {
        let option = self.option_at(index)?;
        set_selected(&option, true)
    }

    /// Deselect every option whose text equals `text`.
    ///
    /// # Errors
    ///
    /// [`PagewaitError::InvalidArgument`] for a single select,
    /// [`PagewaitError::ElementNotFound`] when no option has that text.
    pub fn deselect_by_text(&self, text: &str) -> PagewaitResult<()> {
        self.require_multiple()?;
        let mut matched = false;
        for option in self.options()? {
            if option.text()? == text {
                set_selected(&option, false)?;
                matched = true;
            }
        }
        if matched {
            Ok(())
        } else {
            Err(not_found("text", text))
        }
    }

    /// Deselect the option at `index`.
    ///
    /// # Errors
    ///
    /// [`PagewaitError::InvalidArgument`] for a single select,
    /// [`PagewaitError::ElementNotFound`] when `index` is out of range.
    pub fn deselect_by_index(&self, index: usize) -> PagewaitResult<()> {
        self.require_multiple()?;
        let option = self.option_at(index)?;
        set_selected(&option, false)
    }

    /// Clear every selection.
    ///
    /// # Errors
    ///
    /// [`PagewaitError::InvalidArgument`] for a single select.
    pub fn deselect_all(&self) -> PagewaitResult<()> {
        self.require_multiple()?;
        for option in self.options()? {
            set_selected(&option, false)?;
        }
        Ok(())
    }

    fn select_where(&self, mut predicate: impl FnMut(&E) -> PagewaitResult<bool>) -> PagewaitResult<bool> {
        let mut matched = false;
        for option in self.options()? {
            if predicate(&option)? {
                set_selected(&option, true)?;
                if !self.multiple {
                    return Ok(true);
                }
                matched = true;
            }
        }
        Ok(matched)
    }

    fn option_at(&self, index: usize) -> PagewaitResult<E> {
        self.options()?
            .into_iter()
            .nth(index)
            .ok_or_else(|| not_found("index", &index.to_string()))
    }

    fn require_multiple(&self) -> PagewaitResult<()> {
        if self.multiple {
            Ok(())
        } else {
            Err(PagewaitError::invalid_argument(
                "You may only deselect options of a multi-select",
            ))
        }
    }
}

fn set_selected<E: Element>(option: &E, selected: bool) -> PagewaitResult<()> {
    if option.is_selected()? != selected {
        option.click()?;
    }
    Ok(())
}

fn not_found(by: &str, value: &str) -> PagewaitError {
    PagewaitError::ElementNotFound {
        message: format!("Cannot locate option with {by}: {value}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockNode, MockSession};

    fn select(session: &MockSession, multiple: bool) -> Select<MockElement> {
        let mut node = MockNode::new("select").with_id("s");
        if multiple {
            node = node.with_attr("multiple", "multiple");
        }
        let id = session.append(node);
        session.append_child(id, MockNode::new("option").with_attr("value", "nz").with_text("New Zealand"));
        session.append_child(id, MockNode::new("option").with_attr("value", "au").with_text("Australia"));
        session.append_child(id, MockNode::new("option").with_text("Other"));
        Select::new(session.element(id)).unwrap()
    }

    fn selected_texts(select: &Select<MockElement>) -> Vec<String> {
        select
            .selected_options()
            .unwrap()
            .iter()
            .map(|o| o.text().unwrap())
            .collect()
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn test_rejects_other_tags() {
            let session = MockSession::new();
            let id = session.append(MockNode::new("div"));
            let err = Select::new(session.element(id)).unwrap_err();
            assert_eq!(err.to_string(), "Element should have been select but was div");
        }

        #[test]
        fn test_multiple_detection() {
            let session = MockSession::new();
            assert!(!select(&session, false).is_multiple());
            assert!(select(&session, true).is_multiple());
        }

        #[test]
        fn test_option_texts() {
            let session = MockSession::new();
            let s = select(&session, false);
            assert_eq!(s.option_texts().unwrap(), vec!["New Zealand", "Australia", "Other"]);
            assert_eq!(s.element().tag_name().unwrap(), "select");
        }
    }

    mod single_tests {
        use super::*;

        #[test]
        fn test_select_by_text_value_index() {
            let session = MockSession::new();
            let s = select(&session, false);

            s.select_by_text("Australia").unwrap();
            assert_eq!(selected_texts(&s), vec!["Australia"]);

            s.select_by_value("nz").unwrap();
            assert_eq!(selected_texts(&s), vec!["New Zealand"]);

            s.select_by_index(2).unwrap();
            assert_eq!(s.first_selected_option().unwrap().text().unwrap(), "Other");
        }

        #[test]
        fn test_option_without_value_uses_text() {
            let session = MockSession::new();
            let s = select(&session, false);
            s.select_by_value("Other").unwrap();
            assert_eq!(selected_texts(&s), vec!["Other"]);
        }

        #[test]
        fn test_missing_option() {
            let session = MockSession::new();
            let s = select(&session, false);
            let err = s.select_by_text("Fiji").unwrap_err();
            assert_eq!(err.to_string(), "Cannot locate option with text: Fiji");
            assert!(s.select_by_index(9).is_err());
        }

        #[test]
        fn test_nothing_selected() {
            let session = MockSession::new();
            let s = select(&session, false);
            assert!(matches!(
                s.first_selected_option().unwrap_err(),
                PagewaitError::ElementNotFound { .. }
            ));
        }

        #[test]
        fn test_deselect_requires_multiple() {
            let session = MockSession::new();
            let s = select(&session, false);
            assert!(matches!(
                s.deselect_all().unwrap_err(),
                PagewaitError::InvalidArgument { .. }
            ));
        }
    }

    mod multiple_tests {
        use super::*;

        #[test]
        fn test_select_and_deselect() {
            let session = MockSession::new();
            let s = select(&session, true);
            s.select_by_index(0).unwrap();
            s.select_by_value("au").unwrap();
            assert_eq!(selected_texts(&s), vec!["New Zealand", "Australia"]);

            s.select_by_index(0).unwrap();
            assert_eq!(selected_texts(&s).len(), 2);

            s.deselect_by_text("New Zealand").unwrap();
            assert_eq!(selected_texts(&s), vec!["Australia"]);

            s.deselect_by_index(1).unwrap();
            assert!(selected_texts(&s).is_empty());
        }

        #[test]
        fn test_deselect_all() {
            let session = MockSession::new();
            let s = select(&session, true);
            s.select_by_text("Other").unwrap();
            s.select_by_text("Australia").unwrap();
            s.deselect_all().unwrap();
            assert!(selected_texts(&s).is_empty());
        }
    }
}
