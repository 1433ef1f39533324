//! Polling waits.
//!
//! Every wait in pagewait runs through [`Waiter::poll`]:
//!
//! ```text
//! ┌──────────┐  Ready   ┌────────┐
//! │ attempt  │────────►│ return │
//! └────┬─────┘          └────────┘
//!      │ Pending / ignored error
//!      ▼
//! ┌──────────────┐ yes  ┌──────────────┐
//! │ past timeout?│────►│ PollTimeout  │
//! └────┬─────────┘      └──────────────┘
//!      │ no
//!      ▼
//!  sleep(poll_interval) ──► attempt
//! ```
//!
//! The first attempt always runs, even with a zero timeout. Errors whose
//! kind is not in [`WaitOptions`]'s ignored set end the wait immediately;
//! session errors are never ignored.
//!
//! Waits block the calling thread. Nothing is cached between attempts:
//! element waits locate again every time.

use crate::criteria::{meets_all, meets_any, unmet_descriptions, Criterion};
use crate::driver::{ErrorKind, SearchContext};
use crate::locator::Locator;
use crate::result::{PagewaitError, PagewaitResult};
use crate::search::{SearchContextExt, SearchOutcome};
use crate::select::Select;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Timeout, polling interval and ignored error kinds for a wait
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    ignored: HashSet<ErrorKind>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            ignored: HashSet::from([ErrorKind::NotFound, ErrorKind::StaleElement]),
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Keep polling when an attempt fails with `kind`.
    ///
    /// [`ErrorKind::Session`] cannot be ignored; asking for it is logged and
    /// otherwise has no effect.
    #[must_use]
    pub fn ignore(mut self, kind: ErrorKind) -> Self {
        if kind.is_transient() {
            self.ignored.insert(kind);
        } else {
            tracing::warn!(%kind, "refusing to ignore non-transient error kind");
        }
        self
    }

    /// Stop ignoring every error kind
    #[must_use]
    pub fn ignore_nothing(mut self) -> Self {
        self.ignored.clear();
        self
    }

    /// Whether failures of `kind` are swallowed
    #[must_use]
    pub fn is_ignored(&self, kind: ErrorKind) -> bool {
        kind.is_transient() && self.ignored.contains(&kind)
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// ATTEMPTS AND RESULTS
// =============================================================================

/// Outcome of one polling attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Done; stop polling
    Ready(T),
    /// Not yet, with a diagnostic for the timeout message
    Pending(String),
}

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct Waited<T> {
    /// Value produced by the final attempt
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of attempts made, including the successful one
    pub attempts: u32,
}

impl<T> Waited<T> {
    /// Drop the timing information
    pub fn into_value(self) -> T {
        self.value
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// WAITER
// =============================================================================

/// Shared polling engine
#[derive(Debug, Clone, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with the given options
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Run `attempt` until it is ready or the timeout passes.
    ///
    /// # Errors
    ///
    /// Returns [`PagewaitError::PollTimeout`] with the last diagnostic when
    /// the timeout passes, or the first error whose kind is not ignored.
    pub fn poll<T, F>(&self, waited_for: &str, mut attempt: F) -> PagewaitResult<Waited<T>>
    where
        F: FnMut() -> PagewaitResult<Attempt<T>>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let mut attempts: u32 = 0;
        let mut diagnostic;

        tracing::debug!(
            waited_for,
            timeout_ms = self.options.timeout_ms,
            poll_interval_ms = self.options.poll_interval_ms,
            "wait started"
        );

        loop {
            attempts = attempts.saturating_add(1);
            match attempt() {
                Ok(Attempt::Ready(value)) => {
                    let elapsed = start.elapsed();
                    tracing::debug!(waited_for, attempts, elapsed_ms = millis(elapsed), "wait satisfied");
                    return Ok(Waited {
                        value,
                        elapsed,
                        attempts,
                    });
                }
                Ok(Attempt::Pending(reason)) => {
                    tracing::trace!(waited_for, attempts, %reason, "not yet");
                    diagnostic = reason;
                }
                Err(err) => match err.kind() {
                    Some(kind) if self.options.is_ignored(kind) => {
                        tracing::trace!(waited_for, attempts, %kind, "ignoring error");
                        diagnostic = err.to_string();
                    }
                    _ => return Err(err),
                },
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                tracing::warn!(
                    waited_for,
                    attempts,
                    elapsed_ms = millis(elapsed),
                    %diagnostic,
                    "wait timed out"
                );
                return Err(PagewaitError::PollTimeout {
                    waited_for: waited_for.to_string(),
                    diagnostic,
                    elapsed_ms: millis(elapsed),
                    timeout_ms: self.options.timeout_ms,
                });
            }
            std::thread::sleep(self.options.poll_interval());
        }
    }
}

// =============================================================================
// SUBJECT WAITS
// =============================================================================

fn criteria_label(count: usize) -> String {
    if count == 1 {
        "1 criterion".to_string()
    } else {
        format!("{count} criteria")
    }
}

/// Re-evaluates once after a timeout so the message lists what is unmet
/// at the end, without disturbing the attempt count.
fn explain_timeout(
    result: PagewaitResult<Waited<()>>,
    diagnostic: impl FnOnce() -> String,
) -> PagewaitResult<Waited<()>> {
    result.map_err(|err| match err {
        PagewaitError::PollTimeout {
            waited_for,
            elapsed_ms,
            timeout_ms,
            ..
        } => PagewaitError::PollTimeout {
            waited_for,
            diagnostic: diagnostic(),
            elapsed_ms,
            timeout_ms,
        },
        other => other,
    })
}

/// Wait until `criterion` holds for `subject`.
///
/// # Errors
///
/// [`PagewaitError::PollTimeout`] listing the unmet parts, or a session
/// error.
pub fn wait_until<T: ?Sized>(
    subject: &T,
    criterion: &Criterion<T>,
    options: &WaitOptions,
) -> PagewaitResult<Waited<()>> {
    wait_until_all(subject, std::slice::from_ref(criterion), options)
}

/// Wait until every criterion holds for `subject`.
///
/// # Errors
///
/// [`PagewaitError::PollTimeout`] listing the unmet criteria, or a session
/// error.
pub fn wait_until_all<T: ?Sized>(
    subject: &T,
    criteria: &[Criterion<T>],
    options: &WaitOptions,
) -> PagewaitResult<Waited<()>> {
    let waited_for = criteria_label(criteria.len());
    let result = Waiter::new(options.clone()).poll(&waited_for, || {
        Ok(if meets_all(subject, criteria)? {
            Attempt::Ready(())
        } else {
            Attempt::Pending("criteria not met".to_string())
        })
    });
    explain_timeout(result, || {
        format!(
            "The following criteria were not met: {}",
            unmet_descriptions(subject, criteria).join(", ")
        )
    })
}

/// Wait until at least one criterion holds for `subject`.
///
/// # Errors
///
/// [`PagewaitError::PollTimeout`] listing the criteria, or a session error.
pub fn wait_until_any<T: ?Sized>(
    subject: &T,
    criteria: &[Criterion<T>],
    options: &WaitOptions,
) -> PagewaitResult<Waited<()>> {
    let waited_for = format!("any of {}", criteria_label(criteria.len()));
    let result = Waiter::new(options.clone()).poll(&waited_for, || {
        Ok(if meets_any(subject, criteria)? {
            Attempt::Ready(())
        } else {
            Attempt::Pending("no criterion met".to_string())
        })
    });
    explain_timeout(result, || {
        format!(
            "None of the following criteria were met: {}",
            unmet_descriptions(subject, criteria).join(", ")
        )
    })
}

/// Wait for an ad-hoc condition.
///
/// # Errors
///
/// [`PagewaitError::PollTimeout`] naming `description`, or the first error
/// the condition returns whose kind is not ignored.
pub fn wait_for<F>(options: &WaitOptions, description: &str, mut condition: F) -> PagewaitResult<Waited<()>>
where
    F: FnMut() -> PagewaitResult<bool>,
{
    Waiter::new(options.clone()).poll(description, || {
        Ok(if condition()? {
            Attempt::Ready(())
        } else {
            Attempt::Pending(format!("{description} was not satisfied"))
        })
    })
}

// =============================================================================
// ELEMENT WAITS
// =============================================================================

/// Wait until an element matching `locator` meets every criterion.
///
/// # Errors
///
/// [`PagewaitError::PollTimeout`] carrying the last not-found message, or
/// a session error. With [`ErrorKind::NotFound`] not ignored, the first
/// miss is returned as [`PagewaitError::ElementNotFound`].
pub fn wait_for_element<C>(
    context: &C,
    locator: &Locator,
    criteria: &[Criterion<C::Element>],
    options: &WaitOptions,
) -> PagewaitResult<C::Element>
where
    C: SearchContext + ?Sized,
{
    let waited_for = format!("element {locator}");
    let waited = Waiter::new(options.clone()).poll(&waited_for, || {
        match context.find_first(locator, criteria)? {
            SearchOutcome::Found(element) => Ok(Attempt::Ready(element)),
            SearchOutcome::NotFound(reason) => Err(PagewaitError::ElementNotFound {
                message: reason.to_string(),
            }),
        }
    })?;
    Ok(waited.value)
}

/// [`wait_for_element`], wrapping the result as a [`Select`].
///
/// # Errors
///
/// As [`wait_for_element`], plus [`PagewaitError::UnexpectedTagName`] when
/// the element found is not a `<select>`.
pub fn wait_for_select<C>(
    context: &C,
    locator: &Locator,
    criteria: &[Criterion<C::Element>],
    options: &WaitOptions,
) -> PagewaitResult<Select<C::Element>>
where
    C: SearchContext + ?Sized,
{
    Select::new(wait_for_element(context, locator, criteria, options)?)
}

/// Wait until no element matching `locator` meets every criterion.
///
/// Use with [`crate::criteria::element::is_visible`] to wait for a spinner
/// or dialog to go away.
///
/// # Errors
///
/// [`PagewaitError::PollTimeout`] when a match is still present, or a
/// session error.
pub fn wait_for_element_absent<C>(
    context: &C,
    locator: &Locator,
    criteria: &[Criterion<C::Element>],
    options: &WaitOptions,
) -> PagewaitResult<Waited<()>>
where
    C: SearchContext + ?Sized,
{
    let waited_for = format!("absence of {locator}");
    Waiter::new(options.clone()).poll(&waited_for, || {
        Ok(match context.find_first_or_default(locator, criteria)? {
            None => Attempt::Ready(()),
            Some(_) => Attempt::Pending(format!("an element matching {locator} is still present")),
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::criteria::element::{is_enabled, is_visible};
    use crate::driver::{DriverError, Element};
    use crate::mock::{MockNode, MockSession};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(1_000).with_poll_interval(10)
    }

    fn true_on_attempt(n: usize, calls: Arc<AtomicUsize>) -> Criterion<()> {
        Criterion::from_fn(format!("true on attempt {n}"), move |_: &()| {
            calls.fetch_add(1, Ordering::SeqCst) + 1 >= n
        })
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = WaitOptions::default();
            assert_eq!(options.timeout_ms, 10_000);
            assert_eq!(options.poll_interval_ms, 500);
            assert!(options.is_ignored(ErrorKind::NotFound));
            assert!(options.is_ignored(ErrorKind::StaleElement));
            assert!(!options.is_ignored(ErrorKind::Session));
        }

        #[test]
        fn test_session_cannot_be_ignored() {
            let options = WaitOptions::new().ignore(ErrorKind::Session);
            assert!(!options.is_ignored(ErrorKind::Session));
        }

        #[test]
        fn test_ignore_nothing_then_ignore() {
            let options = WaitOptions::new()
                .ignore_nothing()
                .ignore(ErrorKind::StaleElement);
            assert!(options.is_ignored(ErrorKind::StaleElement));
            assert!(!options.is_ignored(ErrorKind::NotFound));
        }

        #[test]
        fn test_builders_and_durations() {
            let options = WaitOptions::new().with_timeout(250).with_poll_interval(5);
            assert_eq!(options.timeout(), Duration::from_millis(250));
            assert_eq!(options.poll_interval(), Duration::from_millis(5));
        }

        #[test]
        fn test_deserialize_partial() {
            let options: WaitOptions = serde_yaml_ng::from_str("timeout_ms: 2000\n").unwrap();
            assert_eq!(options.timeout_ms, 2_000);
            assert_eq!(options.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
            assert!(options.is_ignored(ErrorKind::NotFound));
        }
    }

    mod poll_tests {
        use super::*;

        #[test]
        fn test_zero_timeout_attempts_exactly_once() {
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = calls.clone();
            let err = Waiter::new(WaitOptions::new().with_timeout(0))
                .poll::<(), _>("nothing", move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Attempt::Pending("never".to_string()))
                })
                .unwrap_err();
            assert!(err.is_timeout());
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn test_ready_on_first_attempt() {
            let waited = Waiter::default()
                .poll("now", || Ok(Attempt::Ready(42)))
                .unwrap();
            assert_eq!(waited.attempts, 1);
            assert_eq!(waited.into_value(), 42);
        }

        #[test]
        fn test_timeout_carries_last_diagnostic() {
            let mut n = 0;
            let err = Waiter::new(WaitOptions::new().with_timeout(30).with_poll_interval(5))
                .poll::<(), _>("counter", || {
                    n += 1;
                    Ok(Attempt::Pending(format!("attempt {n}")))
                })
                .unwrap_err();
            match err {
                PagewaitError::PollTimeout {
                    waited_for,
                    diagnostic,
                    timeout_ms,
                    elapsed_ms,
                } => {
                    assert_eq!(waited_for, "counter");
                    assert_eq!(diagnostic, format!("attempt {n}"));
                    assert_eq!(timeout_ms, 30);
                    assert!(elapsed_ms >= 30);
                }
                other => panic!("expected PollTimeout, got {other:?}"),
            }
        }

        #[test]
        fn test_session_error_is_immediate() {
            let mut calls = 0;
            let err = Waiter::new(fast())
                .poll::<(), _>("session", || {
                    calls += 1;
                    Err(DriverError::session("browser crashed").into())
                })
                .unwrap_err();
            assert!(err.is_session());
            assert_eq!(calls, 1);
        }

        #[test]
        fn test_unclassified_error_is_immediate() {
            let err = Waiter::new(fast())
                .poll::<(), _>("config", || Err(PagewaitError::config("bad")))
                .unwrap_err();
            assert!(matches!(err, PagewaitError::Config { .. }));
        }

        #[test]
        fn test_stale_errors_retried_until_ready() {
            let mut calls = 0;
            let waited = Waiter::new(fast())
                .poll("flaky", || {
                    calls += 1;
                    if calls < 3 {
                        Err(DriverError::stale("detached").into())
                    } else {
                        Ok(Attempt::Ready(()))
                    }
                })
                .unwrap();
            assert_eq!(waited.attempts, 3);
        }

        #[test]
        fn test_stale_not_ignored_propagates() {
            let err = Waiter::new(fast().ignore_nothing())
                .poll::<(), _>("flaky", || Err(DriverError::stale("detached").into()))
                .unwrap_err();
            assert!(matches!(err, PagewaitError::StaleElement { .. }));
        }
    }

    mod subject_tests {
        use super::*;

        #[test]
        fn test_false_false_true_takes_three_attempts() {
            let calls = Arc::new(AtomicUsize::new(0));
            let criterion = true_on_attempt(3, calls.clone());
            let waited = wait_until(&(), &criterion, &fast()).unwrap();
            assert_eq!(waited.attempts, 3);
            assert_eq!(calls.load(Ordering::SeqCst), 3);
        }

        #[test]
        fn test_timeout_lists_count_and_unmet() {
            let criteria = vec![
                Criterion::from_fn("A", |_: &()| false),
                Criterion::from_fn("B", |_: &()| true),
                Criterion::from_fn("C", |_: &()| false),
            ];
            let options = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let msg = wait_until_all(&(), &criteria, &options).unwrap_err().to_string();
            assert!(msg.contains("3 criteria"), "{msg}");
            assert!(msg.contains("The following criteria were not met: A, C"), "{msg}");
        }

        #[test]
        fn test_wait_until_any() {
            let calls = Arc::new(AtomicUsize::new(0));
            let criteria = vec![
                Criterion::from_fn("never", |_: &()| false),
                true_on_attempt(2, calls),
            ];
            let waited = wait_until_any(&(), &criteria, &fast()).unwrap();
            assert_eq!(waited.attempts, 2);
        }

        #[test]
        fn test_wait_until_any_timeout() {
            let criteria = vec![Criterion::from_fn("never", |_: &()| false)];
            let options = WaitOptions::new().with_timeout(0);
            let msg = wait_until_any(&(), &criteria, &options).unwrap_err().to_string();
            assert!(msg.contains("any of 1 criterion"), "{msg}");
            assert!(msg.contains("never"), "{msg}");
        }

        #[test]
        fn test_wait_until_reevaluates_after_success() {
            let calls = Arc::new(AtomicUsize::new(0));
            let met = Arc::new(AtomicBool::new(true));
            let counter = calls.clone();
            let flag = met.clone();
            let criterion = Criterion::from_fn("flag set", move |_: &()| {
                counter.fetch_add(1, Ordering::SeqCst);
                flag.load(Ordering::SeqCst)
            });

            let first = wait_until(&(), &criterion, &fast()).unwrap();
            let second = wait_until(&(), &criterion, &fast()).unwrap();
            assert_eq!(first.attempts, 1);
            assert_eq!(second.attempts, 1);
            assert_eq!(calls.load(Ordering::SeqCst), 2);

            met.store(false, Ordering::SeqCst);
            let options = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let err = wait_until(&(), &criterion, &options).unwrap_err();
            assert!(err.is_timeout(), "{err}");
            assert!(calls.load(Ordering::SeqCst) > 2);
        }

        #[test]
        fn test_wait_until_on_typed_subject() {
            let counter = AtomicUsize::new(0);
            let criterion = Criterion::from_fn("counter reached 2", |c: &AtomicUsize| {
                c.fetch_add(1, Ordering::SeqCst) >= 2
            });
            wait_until(&counter, &criterion, &fast()).unwrap();
        }

        #[test]
        fn test_wait_for_condition() {
            let mut n = 0;
            let waited = wait_for(&fast(), "n reaches 2", || {
                n += 1;
                Ok(n >= 2)
            })
            .unwrap();
            assert_eq!(waited.attempts, 2);

            let err = wait_for(&WaitOptions::new().with_timeout(0), "never", || Ok(false)).unwrap_err();
            assert!(err.to_string().contains("never was not satisfied"));
        }
    }

    mod element_tests {
        use super::*;

        #[test]
        fn test_element_appears_later() {
            let session = MockSession::new();
            let writer = session.clone();
            let handle = std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(40));
                writer.append(MockNode::new("button").with_id("save"));
            });

            let element = wait_for_element(&session, &Locator::id("save"), &[is_visible()], &fast()).unwrap();
            handle.join().unwrap();
            assert_eq!(element.tag_name().unwrap(), "button");
            assert!(session.lookups() >= 2);
        }

        #[test]
        fn test_each_attempt_locates_again() {
            let session = MockSession::new();
            let id = session.append(MockNode::new("button").with_id("go").disabled());
            let writer = session.clone();
            let handle = std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(40));
                writer.update(id, |node| node.set_enabled(true));
            });

            wait_for_element(&session, &Locator::id("go"), &[is_enabled()], &fast()).unwrap();
            handle.join().unwrap();
            assert!(session.lookups() >= 2);
        }

        #[test]
        fn test_timeout_message_names_locator() {
            let session = MockSession::new();
            let options = WaitOptions::new().with_timeout(0);
            let err = wait_for_element(&session, &Locator::id("save"), &[], &options).unwrap_err();
            let msg = err.to_string();
            assert!(err.is_timeout());
            assert!(msg.contains("By.Id: save"), "{msg}");
            assert!(msg.contains("0 elements"), "{msg}");
        }

        #[test]
        fn test_not_found_not_ignored_fails_fast() {
            let session = MockSession::new();
            let options = fast().ignore_nothing();
            let err = wait_for_element(&session, &Locator::id("save"), &[], &options).unwrap_err();
            assert!(matches!(err, PagewaitError::ElementNotFound { .. }));
            assert_eq!(session.lookups(), 1);
        }

        #[test]
        fn test_terminated_session_fails_fast() {
            let session = MockSession::new();
            session.terminate();
            let err = wait_for_element(&session, &Locator::id("save"), &[], &fast()).unwrap_err();
            assert!(err.is_session());
        }

        #[test]
        fn test_wait_for_select() {
            let session = MockSession::new();
            let select = session.append(MockNode::new("select").with_id("country"));
            session.append_child(select, MockNode::new("option").with_text("NZ"));
            session.append(MockNode::new("div").with_id("not-a-select"));

            let select = wait_for_select(&session, &Locator::id("country"), &[], &fast()).unwrap();
            assert_eq!(select.option_texts().unwrap(), vec!["NZ".to_string()]);

            let err = wait_for_select(&session, &Locator::id("not-a-select"), &[], &fast()).unwrap_err();
            assert!(matches!(err, PagewaitError::UnexpectedTagName { .. }));
        }

        #[test]
        fn test_wait_for_element_absent() {
            let session = MockSession::new();
            let spinner = session.append(MockNode::new("div").with_class("spinner"));
            let writer = session.clone();
            let handle = std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(40));
                writer.update(spinner, |node| node.set_visible(false));
            });

            let waited = wait_for_element_absent(
                &session,
                &Locator::class_name("spinner"),
                &[is_visible()],
                &fast(),
            )
            .unwrap();
            handle.join().unwrap();
            assert!(waited.attempts >= 2);
        }

        #[test]
        fn test_wait_for_element_absent_timeout() {
            let session = MockSession::new();
            session.append(MockNode::new("div").with_class("spinner"));
            let options = WaitOptions::new().with_timeout(0);
            let msg = wait_for_element_absent(&session, &Locator::class_name("spinner"), &[], &options)
                .unwrap_err()
                .to_string();
            assert!(msg.contains("still present"), "{msg}");
        }
    }
}
