#![allow(clippy::unwrap_used, clippy::expect_used)]

use huddle_core::errors::{ExErrorKind, HuddleError};
use huddle_core::hooks::{guard_fn, static_model};
use huddle_core::logging_facility::test_capture::init_test_capture;
use huddle_core::logging_facility::CapturedEvent;
use huddle_core::{log_op_end, log_op_error, log_op_start, NotificationCollection};
use huddle_core::{NotificationConfig, RouteNode, Severity};
use huddle_core_types::schema::{
    EVENT_DISMISS, EVENT_END, EVENT_END_ERROR, EVENT_INSERT, EVENT_REDIRECT, EVENT_START,
    FIELD_ERR_CODE,
};

mod common;

fn with_path<'a>(events: &'a [CapturedEvent], path: &str) -> Vec<&'a CapturedEvent> {
    events
        .iter()
        .filter(|e| e.field("path") == Some(path))
        .collect()
}

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    capture.assert_event_exists(op_name, EVENT_START);
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one end event");
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_macros_work_as_match_arm_expressions() {
    let capture = init_test_capture();
    let op_name = "test_log_op_match_arm_unique_4";

    for superseded in [false, true] {
        match superseded {
            false => log_op_end!(op_name, duration_ms = 1, superseded = false),
            true => log_op_start!(op_name, superseded = true),
        }
    }

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[1].event.as_deref(), Some(EVENT_START));
}

#[test]
fn test_log_op_error_includes_kind_and_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = HuddleError::RedirectLoop {
        path: "/a".to_string(),
        limit: 10,
    };
    log_op_error!(op_name, err, duration_ms = 5);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(events[0].field(FIELD_ERR_CODE), Some("ERR_REDIRECT_LOOP"));
    assert_eq!(
        events[0].field("err.kind"),
        Some(format!("{:?}", ExErrorKind::RedirectLoop).as_str())
    );
}

#[tokio::test]
async fn test_navigate_emits_start_and_end() {
    let capture = init_test_capture();
    let h = common::harness(vec![
        RouteNode::new("log-case-ok", "log-case-ok").with_model(static_model(1.into()))
    ]);

    h.resolver.navigate("/log-case-ok").await.unwrap();

    let events = capture.events_for_op("navigate");
    let mine = with_path(&events, "/log-case-ok");
    assert!(mine.iter().any(|e| e.event.as_deref() == Some(EVENT_START)));
    let end = mine
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END))
        .expect("end event");
    assert_eq!(end.field("chain_len"), Some("1"));
    assert!(end.field("duration_ms").is_some());
}

#[tokio::test]
async fn test_navigate_failure_emits_end_error_with_code() {
    let capture = init_test_capture();
    let h = common::harness(vec![RouteNode::new("somewhere", "somewhere")]);

    h.resolver.navigate("/log-case-missing").await.unwrap_err();

    let events = capture.events_for_op("navigate");
    let errors: Vec<_> = with_path(&events, "/log-case-missing")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field(FIELD_ERR_CODE), Some("ERR_ROUTE_NOT_FOUND"));
}

#[tokio::test]
async fn test_redirect_emits_redirect_event() {
    let capture = init_test_capture();
    let h = common::harness(vec![
        RouteNode::new("log-case-from", "log-case-from").with_guard(guard_fn(
            |ctx| async move { Ok(ctx.request_redirect("/log-case-to")) },
        )),
        RouteNode::new("log-case-to", "log-case-to"),
    ]);

    h.resolver.navigate("/log-case-from").await.unwrap();

    let events = capture.events_for_op("navigate");
    let redirect = with_path(&events, "/log-case-from")
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_REDIRECT))
        .expect("redirect event");
    assert_eq!(redirect.field("redirect_to"), Some("/log-case-to"));
}

#[tokio::test(start_paused = true)]
async fn test_notifications_emit_insert_and_dismiss() {
    let capture = init_test_capture();
    let notes = NotificationCollection::new(NotificationConfig::default()).unwrap();

    let handle = notes.notify("log-case", Severity::Warning);
    handle.dismiss();

    let id = handle.id().as_u64().to_string();
    let count = |event: &str| {
        capture.count_events(|e| {
            e.op.as_deref() == Some("notify")
                && e.event.as_deref() == Some(event)
                && e.field("notification_id") == Some(id.as_str())
        })
    };
    // ids restart per collection, so other tests may log the same id
    assert!(count(EVENT_INSERT) >= 1);
    assert!(count(EVENT_DISMISS) >= 1);
}
