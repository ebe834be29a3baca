//! End-to-end scenarios over the engine facade with in-memory storage

use chrono::NaiveDate;
use melete::{
    EngineConfig, ItemId, MeleteError, MemoryStore, PlaylistId, ProgressEngine, StaticCatalog,
    UserId,
};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

fn day(ordinal: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, ordinal).unwrap()
}

struct Fixture {
    engine: ProgressEngine,
    user: UserId,
    playlist: PlaylistId,
    items: Vec<ItemId>,
}

/// Engine over in-memory storage with one 4-item playlist.
fn fixture() -> Fixture {
    init_tracing();

    let user = UserId::new();
    let mut catalog = StaticCatalog::new();
    let playlist = catalog.add_playlist(user, "Distributed systems");
    let items = (1..=4)
        .map(|i| catalog.add_item(playlist, &format!("Chapter {i}")))
        .collect();

    let engine = ProgressEngine::with_store(
        Arc::new(MemoryStore::new()),
        Arc::new(catalog),
        &EngineConfig::default(),
    );

    Fixture {
        engine,
        user,
        playlist,
        items,
    }
}

#[tokio::test]
async fn completion_creates_daily_aggregate_and_streak() {
    let f = fixture();

    // 20 minutes on day 1, completing the item
    f.engine
        .record_progress(f.user, f.items[0], 20 * 60, true, day(1))
        .await
        .unwrap();

    let report = f.engine.streaks(f.user, day(1)).await.unwrap();
    assert_eq!(report.current_streak, 1);
    assert_eq!(report.longest_streak, 1);
    assert_eq!(report.recent_activity.len(), 1);
    assert_eq!(report.recent_activity[0].minutes_learned, 20);
    assert_eq!(report.recent_activity[0].items_completed, 1);
}

#[tokio::test]
async fn gap_day_resets_current_streak() {
    let f = fixture();

    // activity on day 1 and day 3, nothing on day 2
    f.engine
        .record_progress(f.user, f.items[0], 20 * 60, true, day(1))
        .await
        .unwrap();
    f.engine
        .record_progress(f.user, f.items[1], 10 * 60, true, day(3))
        .await
        .unwrap();

    assert_eq!(f.engine.streaks(f.user, day(3)).await.unwrap().current_streak, 1);
    assert_eq!(f.engine.streaks(f.user, day(2)).await.unwrap().current_streak, 0);
    assert_eq!(f.engine.streaks(f.user, day(3)).await.unwrap().longest_streak, 1);
}

#[tokio::test]
async fn three_consecutive_days_make_a_three_day_streak() {
    let f = fixture();

    for (i, d) in [1, 2, 3].into_iter().enumerate() {
        f.engine
            .record_progress(f.user, f.items[i], 5 * 60, true, day(d))
            .await
            .unwrap();
    }

    let report = f.engine.streaks(f.user, day(3)).await.unwrap();
    assert_eq!(report.current_streak, 3);
    assert_eq!(report.longest_streak, 3);
    assert!(report.longest_streak >= report.current_streak);
}

#[tokio::test]
async fn time_deltas_accumulate_and_completion_credits_once() {
    let f = fixture();

    f.engine
        .record_progress(f.user, f.items[0], 30, false, day(1))
        .await
        .unwrap();
    let entry = f
        .engine
        .record_progress(f.user, f.items[0], 30, false, day(1))
        .await
        .unwrap();
    assert_eq!(entry.time_spent_seconds, 60);
    assert!(!entry.is_completed);

    // completing twice credits the aggregate exactly once
    f.engine
        .record_progress(f.user, f.items[0], 600, true, day(1))
        .await
        .unwrap();
    f.engine
        .record_progress(f.user, f.items[0], 600, true, day(1))
        .await
        .unwrap();

    let report = f.engine.streaks(f.user, day(1)).await.unwrap();
    assert_eq!(report.recent_activity[0].items_completed, 1);
    assert_eq!(report.recent_activity[0].minutes_learned, 10);
}

#[tokio::test]
async fn playlist_progress_reports_quarter_done() {
    let f = fixture();

    f.engine
        .record_progress(f.user, f.items[0], 15 * 60, true, day(1))
        .await
        .unwrap();

    let summary = f.engine.playlist_progress(f.user, f.playlist).await.unwrap();
    assert_eq!(summary.total_items, 4);
    assert_eq!(summary.completed_items, 1);
    assert_eq!(summary.progress_percentage, 25.0);
    assert_eq!(summary.total_time_spent_seconds, 15 * 60);
    assert_eq!(summary.playlist_title, "Distributed systems");

    let lines = f.engine.playlist_items(f.user, f.playlist).await.unwrap();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].is_completed);
    assert!(lines[1..].iter().all(|l| !l.is_completed && l.time_spent_seconds == 0));
}

#[tokio::test]
async fn unknown_playlist_and_item_are_not_found() {
    let f = fixture();

    let err = f
        .engine
        .playlist_progress(f.user, PlaylistId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MeleteError::PlaylistNotFound(_)));

    let err = f
        .engine
        .record_progress(f.user, ItemId::new(), 60, false, day(1))
        .await
        .unwrap_err();
    assert!(matches!(err, MeleteError::ItemNotFound(_)));
}

#[tokio::test]
async fn weekly_insights_cover_the_window_ending_at_as_of() {
    let f = fixture();

    f.engine
        .record_progress(f.user, f.items[0], 25 * 60, true, day(8))
        .await
        .unwrap();
    f.engine
        .record_progress(f.user, f.items[1], 5 * 60, true, day(10))
        .await
        .unwrap();
    // day 1 falls outside the 7-day window ending on day 10
    f.engine
        .record_progress(f.user, f.items[2], 60 * 60, true, day(1))
        .await
        .unwrap();

    let insights = f.engine.weekly_insights(f.user, day(10)).await.unwrap();
    assert_eq!(insights.total_minutes, 30);
    assert_eq!(insights.items_completed, 2);
    assert_eq!(insights.daily_breakdown.len(), 7);
    assert_eq!(insights.daily_breakdown[0].date, day(4));
    assert_eq!(insights.daily_breakdown[6].date, day(10));
}

#[tokio::test]
async fn overall_stats_roll_up_across_playlists() {
    let f = fixture();

    f.engine
        .record_progress(f.user, f.items[0], 20 * 60, true, day(1))
        .await
        .unwrap();
    f.engine
        .record_progress(f.user, f.items[1], 10 * 60, false, day(1))
        .await
        .unwrap();

    let stats = f.engine.overall_stats(f.user).await.unwrap();
    assert_eq!(stats.total_items_completed, 1);
    assert_eq!(stats.total_time_minutes, 30);
    assert_eq!(stats.playlist_progress.len(), 1);
    assert_eq!(stats.playlist_progress[0].progress_percentage, 25.0);
}

#[tokio::test]
async fn users_do_not_see_each_other() {
    let f = fixture();
    let other = UserId::new();

    f.engine
        .record_progress(f.user, f.items[0], 20 * 60, true, day(1))
        .await
        .unwrap();

    let summary = f.engine.playlist_progress(other, f.playlist).await.unwrap();
    assert_eq!(summary.completed_items, 0);
    assert_eq!(summary.total_time_spent_seconds, 0);
    assert_eq!(f.engine.streaks(other, day(1)).await.unwrap().current_streak, 0);
}

#[tokio::test]
async fn report_types_serialize_for_the_api_layer() {
    let f = fixture();

    f.engine
        .record_progress(f.user, f.items[0], 15 * 60, true, day(1))
        .await
        .unwrap();

    let summary = f.engine.playlist_progress(f.user, f.playlist).await.unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["progress_percentage"], 25.0);
    assert_eq!(json["total_items"], 4);

    let report = f.engine.streaks(f.user, day(1)).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["current_streak"], 1);
    assert_eq!(json["recent_activity"][0]["date"], "2025-06-01");
}
