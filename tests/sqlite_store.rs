//! SQLite backend integration tests
//!
//! Runs the same write-path invariants the in-memory backend is tested
//! with, against a real (in-memory) SQLite database with migrations
//! applied.

use chrono::{NaiveDate, Utc};
use melete::{ItemId, ProgressEvent, ProgressStore, SqliteStore, UserId};

async fn store() -> SqliteStore {
    let store = SqliteStore::in_memory().await.expect("open sqlite");
    store.run_migrations().await.expect("run migrations");
    store
}

fn day(ordinal: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, ordinal).unwrap()
}

fn event(
    user_id: UserId,
    item_id: ItemId,
    delta_seconds: u64,
    mark_completed: bool,
    occurred_on: NaiveDate,
) -> ProgressEvent {
    ProgressEvent {
        user_id,
        item_id,
        delta_seconds,
        mark_completed,
        occurred_on,
        recorded_at: Utc::now(),
    }
}

#[tokio::test]
async fn upsert_accumulates_time_across_events() {
    let store = store().await;
    let (user, item) = (UserId::new(), ItemId::new());

    store.apply_event(&event(user, item, 30, false, day(1))).await.unwrap();
    let outcome = store
        .apply_event(&event(user, item, 30, false, day(1)))
        .await
        .unwrap();

    assert_eq!(outcome.entry.time_spent_seconds, 60);
    assert!(!outcome.entry.is_completed);
    assert!(outcome.entry.completed_at.is_none());

    let reloaded = store.entry(user, item).await.unwrap().unwrap();
    assert_eq!(reloaded, outcome.entry);
}

#[tokio::test]
async fn completion_transition_is_atomic_and_at_most_once() {
    let store = store().await;
    let (user, item) = (UserId::new(), ItemId::new());

    let first = store
        .apply_event(&event(user, item, 20 * 60, true, day(1)))
        .await
        .unwrap();
    assert!(first.completed_now);
    assert!(first.entry.completed_at.is_some());

    let second = store
        .apply_event(&event(user, item, 20 * 60, true, day(2)))
        .await
        .unwrap();
    assert!(!second.completed_now);
    // completed_at kept from the first transition
    assert_eq!(second.entry.completed_at, first.entry.completed_at);

    // exactly one day was credited, with the completing event's minutes
    let day1 = store.activity_on(user, day(1)).await.unwrap().unwrap();
    assert_eq!(day1.items_completed, 1);
    assert_eq!(day1.minutes_learned, 20);
    assert!(store.activity_on(user, day(2)).await.unwrap().is_none());
}

#[tokio::test]
async fn aggregates_accumulate_within_a_day() {
    let store = store().await;
    let user = UserId::new();

    for minutes in [10u64, 15] {
        store
            .apply_event(&event(user, ItemId::new(), minutes * 60, true, day(1)))
            .await
            .unwrap();
    }

    let activity = store.activity_on(user, day(1)).await.unwrap().unwrap();
    assert_eq!(activity.items_completed, 2);
    assert_eq!(activity.minutes_learned, 25);
}

#[tokio::test]
async fn activity_queries_are_ordered_and_bounded() {
    let store = store().await;
    let user = UserId::new();

    for d in [5, 2, 9] {
        store
            .apply_event(&event(user, ItemId::new(), 10 * 60, true, day(d)))
            .await
            .unwrap();
    }

    let all = store.all_activity(user).await.unwrap();
    assert_eq!(
        all.iter().map(|a| a.date).collect::<Vec<_>>(),
        vec![day(2), day(5), day(9)]
    );

    let window = store.activity_between(user, day(3), day(9)).await.unwrap();
    assert_eq!(
        window.iter().map(|a| a.date).collect::<Vec<_>>(),
        vec![day(5), day(9)]
    );
}

#[tokio::test]
async fn per_user_rollups_and_item_filters() {
    let store = store().await;
    let alice = UserId::new();
    let bob = UserId::new();
    let (a, b, c) = (ItemId::new(), ItemId::new(), ItemId::new());

    store.apply_event(&event(alice, a, 120, true, day(1))).await.unwrap();
    store.apply_event(&event(alice, b, 60, false, day(1))).await.unwrap();
    store.apply_event(&event(bob, c, 999, true, day(1))).await.unwrap();

    assert_eq!(store.completed_count(alice).await.unwrap(), 1);
    assert_eq!(store.total_time_spent(alice).await.unwrap(), 180);

    let entries = store.entries_for_items(alice, &[a, c]).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].item_id, a);

    assert!(store
        .entries_for_items(alice, &[])
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn missing_rows_read_as_empty_not_errors() {
    let store = store().await;
    let user = UserId::new();

    assert!(store.entry(user, ItemId::new()).await.unwrap().is_none());
    assert!(store.activity_on(user, day(1)).await.unwrap().is_none());
    assert!(store.all_activity(user).await.unwrap().is_empty());
    assert_eq!(store.completed_count(user).await.unwrap(), 0);
    assert_eq!(store.total_time_spent(user).await.unwrap(), 0);
}
