//! End-to-end wait and search behavior against the in-memory driver.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use pagewait::criteria::element::{attribute_value, is_enabled, is_visible, text};
use pagewait::mock::{MockNode, MockSession};
use pagewait::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn fast() -> WaitOptions {
    WaitOptions::new().with_timeout(1_000).with_poll_interval(20)
}

// ============================================================================
// Polling
// ============================================================================

#[test]
fn test_ready_on_third_poll() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let criterion = Criterion::from_fn("third time lucky", move |_: &()| {
        counter.fetch_add(1, Ordering::SeqCst) >= 2
    });
    let options = WaitOptions::new().with_timeout(200).with_poll_interval(20);

    let waited = wait_until(&(), &criterion, &options).unwrap();

    assert_eq!(waited.attempts, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(waited.elapsed >= Duration::from_millis(40));
}

#[test]
fn test_timeout_lists_only_unmet_criteria() {
    let criteria = vec![
        Criterion::from_fn("A", |_: &()| false),
        Criterion::from_fn("B", |_: &()| true),
        Criterion::from_fn("C", |_: &()| false),
    ];
    let options = WaitOptions::new().with_timeout(60).with_poll_interval(20);

    let err = wait_until_all(&(), &criteria, &options).unwrap_err();

    assert!(err.is_timeout());
    let msg = err.to_string();
    assert!(msg.contains("The following criteria were not met: A, C"), "{msg}");
}

#[test]
fn test_any_succeeds_when_one_holds() {
    let criteria = vec![
        Criterion::from_fn("A", |_: &()| false),
        Criterion::from_fn("B", |_: &()| true),
    ];
    let waited = wait_until_any(&(), &criteria, &fast()).unwrap();
    assert_eq!(waited.attempts, 1);
}

#[test]
fn test_zero_timeout_still_attempts_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let options = WaitOptions::new().with_timeout(0).with_poll_interval(20);
    let err = wait_for(&options, "never", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(false)
    })
    .unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn test_find_all_skips_stale_rows() {
    let session = MockSession::new();
    session.append(MockNode::new("li").with_class("row").with_text("one").stale());
    session.append(MockNode::new("li").with_class("row").with_text("two").stale());
    let live = session.append(MockNode::new("li").with_class("row").with_text("three"));

    let found = session
        .find_all(&Locator::css("li.row"), &[is_visible(), is_enabled()])
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].node_id(), live);
}

#[test]
fn test_not_found_message_lists_elements() {
    let session = MockSession::new();
    session.append(MockNode::new("button").with_class("btn").with_text("Cancel"));
    session.append(MockNode::new("button").with_class("btn").with_text("Back"));

    let err = session
        .find_first_or_fail(&Locator::css("button.btn"), &[text("Save", false)])
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("Found 2 elements matching By.CssSelector: button.btn"), "{msg}");
    assert!(msg.contains("none of them met all criteria: Text = 'Save'"), "{msg}");
    assert!(msg.contains("Cancel") && msg.contains("Back"), "{msg}");
}

// ============================================================================
// Element waits
// ============================================================================

#[test]
fn test_element_never_appears() {
    let session = MockSession::new();
    let options = WaitOptions::new().with_timeout(80).with_poll_interval(20);

    let err = wait_for_element(&session, &Locator::id("toast"), &[is_visible()], &options).unwrap_err();

    match &err {
        PagewaitError::PollTimeout { timeout_ms, .. } => assert_eq!(*timeout_ms, 80),
        other => panic!("expected PollTimeout, got {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.contains("By.Id: toast"), "{msg}");
    assert!(msg.contains("0 elements"), "{msg}");
}

#[test]
fn test_element_appears_later() {
    let session = MockSession::new();
    let writer = session.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(60));
        writer.append(MockNode::new("div").with_id("toast").with_text("Saved"));
    });

    let toast = wait_for_element(&session, &Locator::id("toast"), &[is_visible()], &fast()).unwrap();
    handle.join().unwrap();

    assert_eq!(toast.text().unwrap(), "Saved");
}

#[test]
fn test_element_becomes_enabled() {
    let session = MockSession::new();
    let button = session.append(MockNode::new("button").with_id("go").disabled());
    let writer = session.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(60));
        writer.update(button, |node| node.set_enabled(true));
    });

    let found = wait_for_element(&session, &Locator::id("go"), &[is_enabled()], &fast()).unwrap();
    handle.join().unwrap();
    assert_eq!(found.node_id(), button);
}

#[test]
fn test_spinner_goes_away() {
    let session = MockSession::new();
    let spinner = session.append(MockNode::new("div").with_class("spinner"));
    let writer = session.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(60));
        writer.update(spinner, |node| node.set_visible(false));
    });

    wait_for_element_absent(&session, &Locator::class_name("spinner"), &[is_visible()], &fast()).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_wait_for_select_then_choose() {
    let session = MockSession::new();
    let select = session.append(MockNode::new("select").with_name("country"));
    session.append_child(select, MockNode::new("option").with_attr("value", "nz").with_text("New Zealand"));
    session.append_child(select, MockNode::new("option").with_attr("value", "fr").with_text("France"));

    let control = wait_for_select(&session, &Locator::name("country"), &[], &fast()).unwrap();
    control.select_by_value("fr").unwrap();

    let chosen = control.first_selected_option().unwrap();
    assert!(attribute_value("value", "FR", true).is_met(&chosen));
}

#[test]
fn test_session_loss_aborts_wait() {
    let session = MockSession::new();
    let writer = session.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(40));
        writer.terminate();
    });

    let options = WaitOptions::new().with_timeout(5_000).with_poll_interval(10);
    let err = wait_for_element(&session, &Locator::id("never"), &[], &options).unwrap_err();
    handle.join().unwrap();

    assert!(err.is_session(), "{err}");
}

#[test]
fn test_not_found_not_ignored_fails_fast() {
    let session = MockSession::new();
    let options = fast().ignore_nothing();
    let err = wait_for_element(&session, &Locator::id("missing"), &[], &options).unwrap_err();
    assert!(matches!(err, PagewaitError::ElementNotFound { .. }), "{err:?}");
}
