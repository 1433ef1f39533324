//! Locator abstraction for element selection.
//!
//! A [`Locator`] is an immutable strategy + value pair. Locators are created
//! once (usually in a page's locator table) and reused for every query; they
//! never hold element handles, so every use re-queries the live document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy used to locate elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// Element `id` attribute
    Id(String),
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath(String),
    /// Element `name` attribute
    Name(String),
    /// Single CSS class name
    ClassName(String),
    /// Tag name (e.g., "option")
    TagName(String),
    /// Exact text of a link
    LinkText(String),
    /// Substring of a link's text
    PartialLinkText(String),
}

impl Selector {
    /// Strategy name as used in diagnostics
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Id(_) => "Id",
            Self::Css(_) => "CssSelector",
            Self::XPath(_) => "XPath",
            Self::Name(_) => "Name",
            Self::ClassName(_) => "ClassName",
            Self::TagName(_) => "TagName",
            Self::LinkText(_) => "LinkText",
            Self::PartialLinkText(_) => "PartialLinkText",
        }
    }

    /// The raw selector value
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v)
            | Self::Css(v)
            | Self::XPath(v)
            | Self::Name(v)
            | Self::ClassName(v)
            | Self::TagName(v)
            | Self::LinkText(v)
            | Self::PartialLinkText(v) => v,
        }
    }

    /// Equivalent CSS selector, where the strategy has one
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(format!("#{id}")),
            Self::Css(css) => Some(css.clone()),
            Self::Name(name) => Some(format!("[name={name:?}]")),
            Self::ClassName(class) => Some(format!(".{class}")),
            Self::TagName(tag) => Some(tag.clone()),
            Self::XPath(_) | Self::LinkText(_) | Self::PartialLinkText(_) => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "By.{}: {}", self.strategy(), self.value())
    }
}

/// A reusable element locator.
///
/// The optional label is shown in diagnostics next to the selector, which
/// keeps timeout messages readable for long XPath expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    selector: Selector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl Locator {
    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            label: None,
        }
    }

    /// Locate by `id`
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::Id(id.into()))
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(css: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(css.into()))
    }

    /// Locate by XPath
    #[must_use]
    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::from_selector(Selector::XPath(xpath.into()))
    }

    /// Locate by `name` attribute
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::from_selector(Selector::Name(name.into()))
    }

    /// Locate by class name
    #[must_use]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::from_selector(Selector::ClassName(class.into()))
    }

    /// Locate by tag name
    #[must_use]
    pub fn tag_name(tag: impl Into<String>) -> Self {
        Self::from_selector(Selector::TagName(tag.into()))
    }

    /// Locate by exact link text
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::LinkText(text.into()))
    }

    /// Locate by partial link text
    #[must_use]
    pub fn partial_link_text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::PartialLinkText(text.into()))
    }

    /// Attach a human-readable label
    #[must_use]
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the label, if any
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} ({label})", self.selector),
            None => write!(f, "{}", self.selector),
        }
    }
}
