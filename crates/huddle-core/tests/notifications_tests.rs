#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::time::Duration;

use huddle_core::notifications::MAX_TTL;
use huddle_core::{NotificationCollection, NotificationConfig, Phase, Severity};
use tokio::time::sleep;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn collection() -> NotificationCollection {
    NotificationCollection::new(NotificationConfig::default()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_scenario_three_notifies_evicted_on_schedule() {
    // GIVEN notifications created at t=0, t=1000 and t=2000 with ttl 3000
    let notes = collection();
    let first = notes.notify("first", Severity::Info);
    sleep(ms(1000)).await;
    let second = notes.notify("second", Severity::Success);
    sleep(ms(1000)).await;
    notes.notify("third", Severity::Warning);

    // THEN all three are present at t=2500
    sleep(ms(500)).await;
    assert_eq!(notes.len(), 3);

    // AND only the first is gone at t=3100
    sleep(ms(600)).await;
    assert_eq!(notes.len(), 2);
    assert!(!first.is_present());
    assert!(second.is_present());
    let bodies: Vec<_> = notes.snapshot().iter().map(|n| n.body.clone()).collect();
    assert_eq!(bodies, vec!["second", "third"]);

    // AND everything is gone at t=5100
    sleep(ms(2000)).await;
    assert!(notes.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_identical_siblings_are_removed_by_identity() {
    let notes = collection();
    let older = notes.notify("Saved", Severity::Success);
    sleep(ms(1000)).await;
    let newer = notes.notify("Saved", Severity::Success);

    sleep(ms(2100)).await;

    let remaining = notes.snapshot();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, newer.id());
    assert_ne!(older.id(), newer.id());
    assert_eq!(older.phase(), Phase::Removed);
}

#[tokio::test(start_paused = true)]
async fn test_double_eviction_is_a_no_op() {
    let notes = collection();
    let a = notes.notify("a", Severity::Info);
    let b = notes.notify("b", Severity::Info);

    assert!(notes.evict(a.id()));
    assert!(!notes.evict(a.id()));
    assert_eq!(notes.len(), 1);

    // the timer of the manually evicted entry fires later without effect
    sleep(ms(2000)).await;
    assert_eq!(notes.len(), 1);
    assert!(b.is_present());

    sleep(ms(1100)).await;
    assert!(notes.is_empty());
    assert!(!notes.evict(b.id()));
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_removes_immediately_and_cancels_timer() {
    let notes = collection();
    let handle = notes.notify("bye", Severity::Error);
    let other = notes.notify("stay", Severity::Info);

    assert!(notes.dismiss(handle.id()));
    assert!(!handle.is_present());
    assert!(!handle.dismiss());

    sleep(ms(100)).await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes.snapshot()[0].id, other.id());
}

#[tokio::test(start_paused = true)]
async fn test_phases_advance_forward_on_their_own() {
    let notes = collection();
    let handle = notes.notify("hello", Severity::Info);

    assert_eq!(handle.phase(), Phase::Entering);
    sleep(ms(200)).await;
    assert_eq!(handle.phase(), Phase::Active);
    sleep(ms(2700)).await; // t=2900
    assert_eq!(handle.phase(), Phase::Leaving);
    sleep(ms(200)).await; // t=3100
    assert_eq!(handle.phase(), Phase::Removed);
}

#[tokio::test(start_paused = true)]
async fn test_custom_ttl() {
    let notes = collection();
    let short = notes.notify_with_ttl("short", Severity::Info, ms(500));
    let default = notes.notify("default", Severity::Info);

    assert_eq!(notes.get(short.id()).unwrap().ttl_ms, 500);
    sleep(ms(600)).await;
    assert!(!short.is_present());
    assert!(default.is_present());
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_every_change() {
    let notes = collection();
    let mut view = notes.subscribe();
    assert!(view.borrow_and_update().is_empty());

    let handle = notes.notify("watched", Severity::Info);
    view.changed().await.unwrap();
    {
        let list = view.borrow_and_update();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].phase, Phase::Entering);
    }

    view.changed().await.unwrap();
    assert_eq!(view.borrow_and_update()[0].phase, Phase::Active);

    handle.dismiss();
    view.changed().await.unwrap();
    assert!(view.borrow_and_update().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_is_not_affected_by_later_changes() {
    let notes = collection();
    notes.notify("one", Severity::Info);
    let before = notes.snapshot();

    notes.notify("two", Severity::Info);

    assert_eq!(before.len(), 1);
    assert_eq!(notes.snapshot().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_get_unique_ids() {
    let notes = collection();

    let mut tasks = Vec::new();
    for producer in 0..8 {
        let notes = notes.clone();
        tasks.push(tokio::spawn(async move {
            (0..25)
                .map(|i| {
                    notes
                        .notify_with_ttl(
                            format!("p{}-{}", producer, i),
                            Severity::Info,
                            Duration::from_secs(60),
                        )
                        .id()
                })
                .collect::<Vec<_>>()
        }));
    }

    let mut ids = HashSet::new();
    for task in tasks {
        for id in task.await.unwrap() {
            assert!(ids.insert(id), "duplicate id {}", id);
        }
    }

    assert_eq!(ids.len(), 200);
    assert_eq!(notes.len(), 200);
    let listed: HashSet<_> = notes.snapshot().iter().map(|n| n.id).collect();
    assert_eq!(listed, ids);
}

#[tokio::test(start_paused = true)]
async fn test_handles_outlive_collection() {
    let notes = collection();
    let handle = notes.notify("orphan", Severity::Info);
    drop(notes);

    assert_eq!(handle.phase(), Phase::Removed);
    assert!(!handle.dismiss());
    sleep(ms(3100)).await;
}

#[tokio::test(start_paused = true)]
async fn test_oversized_ttl_is_capped_and_still_evicted() {
    let notes = collection();
    let handle = notes.notify_with_ttl("forever", Severity::Info, Duration::MAX);

    sleep(ms(300)).await;
    assert_eq!(handle.phase(), Phase::Active);
    let stored = notes.get(handle.id()).unwrap();
    assert_eq!(stored.ttl_ms, MAX_TTL.as_millis() as u64);

    sleep(MAX_TTL).await;
    assert!(!handle.is_present());
    assert!(notes.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_collection_cancels_pending_timers() {
    let metrics = tokio::runtime::Handle::current().metrics();
    let notes = collection();
    notes.notify("short", Severity::Info);
    notes.notify_with_ttl("long", Severity::Warning, Duration::from_secs(60));
    assert_eq!(metrics.num_alive_tasks(), 2);

    drop(notes);

    tokio::time::timeout(ms(1000), async {
        while metrics.num_alive_tasks() > 0 {
            sleep(ms(1)).await;
        }
    })
    .await
    .expect("timers should stop long before their deadlines");
}
