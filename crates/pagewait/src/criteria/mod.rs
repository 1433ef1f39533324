//! Criteria: named predicates over a typed subject.
//!
//! A [`Criterion`] is a small tree. Leaves wrap anything implementing the
//! [`Criteria`] trait (usually a closure via [`FnCriteria`]); inner nodes are
//! `All` / `Any` combinations built with [`Criterion::and`] and
//! [`Criterion::or`].
//!
//! ```ignore
//! let ready = username_visible.and(password_enabled);
//! assert!(ready.evaluate(&login_page)?);
//! for unmet in ready.failures(&login_page) {
//!     println!("waiting for: {}", unmet.description());
//! }
//! ```
//!
//! Evaluation short-circuits (`All` stops at the first false child, `Any` at
//! the first true one). [`Criterion::failures`] does not: it evaluates every
//! child so timeout messages can list everything that is still unmet.

pub mod element;

use crate::driver::DriverResult;
use std::fmt;
use std::sync::Arc;

/// Trait for anything that can decide whether a subject satisfies a fact.
///
/// Implement this for reusable checks that carry state of their own; wrap
/// the implementation with [`Criterion::custom`] to combine it with others.
pub trait Criteria<T: ?Sized>: Send + Sync {
    /// Check the subject.
    ///
    /// # Errors
    ///
    /// Returns the driver error raised while reading the subject's state.
    /// Stale element errors mean "not satisfied yet" to every caller.
    fn evaluate(&self, subject: &T) -> DriverResult<bool>;

    /// Human-readable description used in failure messages
    fn description(&self) -> String;
}

/// A closure-backed criteria
pub struct FnCriteria<F> {
    func: F,
    description: String,
}

impl<F> fmt::Debug for FnCriteria<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCriteria")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F> FnCriteria<F> {
    /// Create a new function criteria
    pub fn new(description: impl Into<String>, func: F) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<T, F> Criteria<T> for FnCriteria<F>
where
    T: ?Sized,
    F: Fn(&T) -> DriverResult<bool> + Send + Sync,
{
    fn evaluate(&self, subject: &T) -> DriverResult<bool> {
        (self.func)(subject)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

/// How a composite combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Every child must hold
    All,
    /// At least one child must hold
    Any,
}

impl Combinator {
    const fn separator(self) -> &'static str {
        match self {
            Self::All => " AND ",
            Self::Any => " OR ",
        }
    }
}

enum Node<T: ?Sized> {
    Leaf(Arc<dyn Criteria<T>>),
    Composite {
        combinator: Combinator,
        children: Vec<Criterion<T>>,
    },
}

/// A named predicate, or an AND/OR tree of them
pub struct Criterion<T: ?Sized> {
    node: Node<T>,
}

impl<T: ?Sized> Clone for Criterion<T> {
    fn clone(&self) -> Self {
        let node = match &self.node {
            Node::Leaf(leaf) => Node::Leaf(Arc::clone(leaf)),
            Node::Composite {
                combinator,
                children,
            } => Node::Composite {
                combinator: *combinator,
                children: children.clone(),
            },
        };
        Self { node }
    }
}

impl<T: ?Sized> fmt::Debug for Criterion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criterion")
            .field("combinator", &self.combinator())
            .field("description", &self.description())
            .finish()
    }
}

impl<T: ?Sized> fmt::Display for Criterion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

impl<T: ?Sized> Criterion<T> {
    /// Create a leaf from a fallible predicate
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> DriverResult<bool> + Send + Sync + 'static,
    {
        Self::custom(FnCriteria::new(description, predicate))
    }

    /// Create a leaf from a predicate that cannot fail
    pub fn from_fn<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::new(description, move |subject: &T| Ok(predicate(subject)))
    }

    /// Wrap a custom [`Criteria`] implementation as a leaf
    pub fn custom<C>(criteria: C) -> Self
    where
        C: Criteria<T> + 'static,
    {
        Self {
            node: Node::Leaf(Arc::new(criteria)),
        }
    }

    /// Composite that holds when every child holds (true when empty)
    pub fn all(children: impl IntoIterator<Item = Self>) -> Self {
        Self::composite(Combinator::All, children)
    }

    /// Composite that holds when any child holds (false when empty)
    pub fn any(children: impl IntoIterator<Item = Self>) -> Self {
        Self::composite(Combinator::Any, children)
    }

    fn composite(combinator: Combinator, children: impl IntoIterator<Item = Self>) -> Self {
        let children = children
            .into_iter()
            .flat_map(|child| child.into_operands(combinator))
            .collect();
        Self {
            node: Node::Composite {
                combinator,
                children,
            },
        }
    }

    /// Combine with `other`; both must hold
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::composite(Combinator::All, [self, other])
    }

    /// Combine with `other`; either may hold
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::composite(Combinator::Any, [self, other])
    }

    /// Same-kind composites are spliced into their parent so that
    /// `a.and(b).and(c)` is a single 3-way `All`.
    fn into_operands(self, combinator: Combinator) -> Vec<Self> {
        match self.node {
            Node::Composite {
                combinator: own,
                children,
            } if own == combinator => children,
            node => vec![Self { node }],
        }
    }

    /// The combinator, or `None` for a leaf
    #[must_use]
    pub fn combinator(&self) -> Option<Combinator> {
        match &self.node {
            Node::Leaf(_) => None,
            Node::Composite { combinator, .. } => Some(*combinator),
        }
    }

    /// Direct children (empty for a leaf)
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.node {
            Node::Leaf(_) => Default::default(),
            Node::Composite { children, .. } => children,
        }
    }

    /// Evaluate against a subject.
    ///
    /// # Errors
    ///
    /// Propagates the first driver error raised by an evaluated leaf.
    pub fn evaluate(&self, subject: &T) -> DriverResult<bool> {
        match &self.node {
            Node::Leaf(leaf) => leaf.evaluate(subject),
            Node::Composite {
                combinator: Combinator::All,
                children,
            } => {
                for child in children {
                    if !child.evaluate(subject)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Node::Composite {
                combinator: Combinator::Any,
                children,
            } => {
                for child in children {
                    if child.evaluate(subject)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Evaluate, counting any error as "not met"
    pub fn is_met(&self, subject: &T) -> bool {
        self.evaluate(subject).unwrap_or(false)
    }

    /// Description; composites join children with `AND` / `OR`
    #[must_use]
    pub fn description(&self) -> String {
        match &self.node {
            Node::Leaf(leaf) => leaf.description(),
            Node::Composite {
                combinator,
                children,
            } => children
                .iter()
                .map(Self::operand_description)
                .collect::<Vec<_>>()
                .join(combinator.separator()),
        }
    }

    fn operand_description(&self) -> String {
        if self.children().len() > 1 {
            format!("({})", self.description())
        } else {
            self.description()
        }
    }

    /// The unmet parts of this criterion.
    ///
    /// Every child of an `All` is evaluated, and the unmet leaves of each are
    /// collected. An unmet `Any` is reported as a whole, since no single
    /// alternative is to blame. Errors count as unmet.
    #[must_use]
    pub fn failures(&self, subject: &T) -> Vec<Self> {
        match &self.node {
            Node::Leaf(_) => {
                if self.is_met(subject) {
                    Vec::new()
                } else {
                    vec![self.clone()]
                }
            }
            Node::Composite {
                combinator: Combinator::All,
                children,
            } => children
                .iter()
                .flat_map(|child| child.failures(subject))
                .collect(),
            Node::Composite {
                combinator: Combinator::Any,
                children,
            } => {
                if children.iter().any(|child| child.is_met(subject)) {
                    Vec::new()
                } else {
                    vec![self.clone()]
                }
            }
        }
    }
}

/// Whether every criterion holds (true for an empty list).
///
/// # Errors
///
/// Propagates the first driver error raised while evaluating.
pub fn meets_all<T: ?Sized>(subject: &T, criteria: &[Criterion<T>]) -> DriverResult<bool> {
    for criterion in criteria {
        if !criterion.evaluate(subject)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether at least one criterion holds (false for an empty list).
///
/// # Errors
///
/// Propagates the first driver error raised while evaluating.
pub fn meets_any<T: ?Sized>(subject: &T, criteria: &[Criterion<T>]) -> DriverResult<bool> {
    for criterion in criteria {
        if criterion.evaluate(subject)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The members of `criteria` that do not hold for `subject`.
///
/// Never fails: a criterion whose evaluation errors counts as unmet.
#[must_use]
pub fn failures<T: ?Sized>(subject: &T, criteria: &[Criterion<T>]) -> Vec<Criterion<T>> {
    criteria
        .iter()
        .filter(|criterion| !criterion.is_met(subject))
        .cloned()
        .collect()
}

/// Leaf-level descriptions of everything unmet, for diagnostics
#[must_use]
pub fn unmet_descriptions<T: ?Sized>(subject: &T, criteria: &[Criterion<T>]) -> Vec<String> {
    criteria
        .iter()
        .flat_map(|criterion| criterion.failures(subject))
        .map(|unmet| unmet.description())
        .collect()
}

/// Join the descriptions of a list of criteria
#[must_use]
pub fn describe_all<T: ?Sized>(criteria: &[Criterion<T>]) -> String {
    if criteria.is_empty() {
        return "(no criteria)".to_string();
    }
    criteria
        .iter()
        .map(Criterion::description)
        .collect::<Vec<_>>()
        .join(", ")
}
