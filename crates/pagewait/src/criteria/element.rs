//! Ready-made criteria over element state.
//!
//! Every constructor is generic over the backend's [`Element`] type, so the
//! same table works against a real driver and the in-memory mock.

use super::Criterion;
use crate::driver::{Element, SearchContext};
use crate::locator::Locator;
use crate::result::{PagewaitError, PagewaitResult};
use regex::Regex;

fn text_eq(actual: &str, expected: &str, ignore_case: bool) -> bool {
    if ignore_case {
        actual.to_lowercase() == expected.to_lowercase()
    } else {
        actual == expected
    }
}

fn collect_values<I, S>(values: I, what: &str) -> PagewaitResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let values: Vec<String> = values.into_iter().map(Into::into).collect();
    if values.is_empty() {
        return Err(PagewaitError::invalid_argument(format!(
            "at least one {what} value is required"
        )));
    }
    Ok(values)
}

/// Element is rendered and visible
#[must_use]
pub fn is_visible<E: Element>() -> Criterion<E> {
    Criterion::new("IsVisible", |e: &E| e.is_displayed())
}

/// Element is enabled
#[must_use]
pub fn is_enabled<E: Element>() -> Criterion<E> {
    Criterion::new("IsEnabled", |e: &E| e.is_enabled())
}

/// Checkbox, radio button or option is selected
#[must_use]
pub fn is_selected<E: Element>() -> Criterion<E> {
    Criterion::new("IsSelected", |e: &E| e.is_selected())
}

/// Element carries the attribute, whatever its value
#[must_use]
pub fn has_attribute<E: Element>(name: impl Into<String>) -> Criterion<E> {
    let name = name.into();
    Criterion::new(format!("Has attribute '{name}'"), move |e: &E| {
        Ok(e.attribute(&name)?.is_some())
    })
}

/// Attribute is present and not empty
#[must_use]
pub fn attribute_has_value<E: Element>(name: impl Into<String>) -> Criterion<E> {
    let name = name.into();
    Criterion::new(format!("Attribute '{name}' has a value"), move |e: &E| {
        Ok(e.attribute(&name)?.is_some_and(|v| !v.is_empty()))
    })
}

/// Attribute equals `value`
#[must_use]
pub fn attribute_value<E: Element>(
    name: impl Into<String>,
    value: impl Into<String>,
    ignore_case: bool,
) -> Criterion<E> {
    let name = name.into();
    let value = value.into();
    Criterion::new(
        format!("Attribute '{name}' = '{value}'"),
        move |e: &E| {
            Ok(e
                .attribute(&name)?
                .is_some_and(|actual| text_eq(&actual, &value, ignore_case)))
        },
    )
}

/// Attribute equals one of `values`.
///
/// # Errors
///
/// Returns [`PagewaitError::InvalidArgument`] when `values` is empty.
pub fn attribute_in<E, I, S>(
    name: impl Into<String>,
    values: I,
    ignore_case: bool,
) -> PagewaitResult<Criterion<E>>
where
    E: Element,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let name = name.into();
    let values = collect_values(values, "attribute")?;
    Ok(Criterion::new(
        format!("Attribute '{name}' IN [{}]", values.join(", ")),
        move |e: &E| {
            Ok(e.attribute(&name)?.is_some_and(|actual| {
                values
                    .iter()
                    .any(|expected| text_eq(&actual, expected, ignore_case))
            }))
        },
    ))
}

/// Visible text equals `value`
#[must_use]
pub fn text<E: Element>(value: impl Into<String>, ignore_case: bool) -> Criterion<E> {
    let value = value.into();
    Criterion::new(format!("Text = '{value}'"), move |e: &E| {
        Ok(text_eq(&e.text()?, &value, ignore_case))
    })
}

/// Visible text equals one of `values`.
///
/// # Errors
///
/// Returns [`PagewaitError::InvalidArgument`] when `values` is empty.
pub fn text_in<E, I, S>(values: I, ignore_case: bool) -> PagewaitResult<Criterion<E>>
where
    E: Element,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let values = collect_values(values, "text")?;
    Ok(Criterion::new(
        format!("Text IN [{}]", values.join(", ")),
        move |e: &E| {
            let actual = e.text()?;
            Ok(values
                .iter()
                .any(|expected| text_eq(&actual, expected, ignore_case)))
        },
    ))
}

/// Visible text is not empty
#[must_use]
pub fn has_text<E: Element>() -> Criterion<E> {
    Criterion::new("Has text", |e: &E| Ok(!e.text()?.is_empty()))
}

/// Visible text matches a regular expression.
///
/// # Errors
///
/// Returns [`PagewaitError::InvalidArgument`] when the pattern does not
/// compile.
pub fn text_matches<E: Element>(pattern: &str) -> PagewaitResult<Criterion<E>> {
    let regex = Regex::new(pattern)
        .map_err(|e| PagewaitError::invalid_argument(format!("invalid text pattern: {e}")))?;
    Ok(Criterion::new(
        format!("Text matches /{pattern}/"),
        move |e: &E| Ok(regex.is_match(&e.text()?)),
    ))
}

/// Element is a `<select>` with at least one `<option>`
#[must_use]
pub fn select_has_items<E: Element>() -> Criterion<E> {
    let options = Locator::tag_name("option");
    Criterion::new("Select has at least one option", move |e: &E| {
        if !e.tag_name()?.eq_ignore_ascii_case("select") {
            return Ok(false);
        }
        Ok(!e.find_elements(&options)?.is_empty())
    })
}

/// Something in `context` matches `locator`.
///
/// The subject is ignored; this is for page-level criteria such as "the
/// error banner is present".
#[must_use]
pub fn exists<T, C>(context: C, locator: Locator) -> Criterion<T>
where
    T: ?Sized,
    C: SearchContext + Send + Sync + 'static,
{
    Criterion::new(format!("Exists: {locator}"), move |_: &T| {
        Ok(!context.find_elements(&locator)?.is_empty())
    })
}

/// Nothing in `context` matches `locator`
#[must_use]
pub fn not_exists<T, C>(context: C, locator: Locator) -> Criterion<T>
where
    T: ?Sized,
    C: SearchContext + Send + Sync + 'static,
{
    Criterion::new(format!("Does not exist: {locator}"), move |_: &T| {
        Ok(context.find_elements(&locator)?.is_empty())
    })
}
