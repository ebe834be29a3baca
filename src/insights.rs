//! Cross-playlist statistics, streak reports, and weekly insights
//!
//! Read-side rollups composed from the storage layer and the playlist
//! catalog. Everything here is recomputed per request; the windows are
//! small enough that a linear scan is the whole story.

use crate::catalog::PlaylistCatalog;
use crate::error::Result;
use crate::storage::ProgressStore;
use crate::streaks::StreakCalculator;
use crate::types::{
    percentage, DayMinutes, OverallStats, PlaylistBrief, StreakReport, UserId, WeeklyInsights,
};
use chrono::{Duration, NaiveDate};
use std::sync::Arc;

/// At most this many of the user's playlists appear in overall stats.
const OVERALL_PLAYLIST_LIMIT: usize = 5;

/// Days of history included in a streak report's recent activity.
const RECENT_ACTIVITY_DAYS: i64 = 30;

/// Read-side statistics spanning all of a user's learning
pub struct InsightsReporter {
    store: Arc<dyn ProgressStore>,
    catalog: Arc<dyn PlaylistCatalog>,
    streaks: StreakCalculator,
}

impl InsightsReporter {
    pub fn new(store: Arc<dyn ProgressStore>, catalog: Arc<dyn PlaylistCatalog>) -> Self {
        let streaks = StreakCalculator::new(store.clone());
        Self {
            store,
            catalog,
            streaks,
        }
    }

    /// Totals across all items plus progress on the user's own playlists
    ///
    /// Reports up to the first five playlists the user created; empty
    /// playlists are omitted since they have no meaningful percentage.
    pub async fn overall_stats(&self, user_id: UserId) -> Result<OverallStats> {
        let total_items_completed = self.store.completed_count(user_id).await?;
        let total_time_minutes = self.store.total_time_spent(user_id).await? / 60;

        let mut playlist_progress = Vec::new();
        for playlist_id in self
            .catalog
            .playlists_created_by(user_id)
            .await?
            .into_iter()
            .take(OVERALL_PLAYLIST_LIMIT)
        {
            let item_ids = self.catalog.playlist_item_ids(playlist_id).await?;
            if item_ids.is_empty() {
                continue;
            }
            let completed = self
                .store
                .entries_for_items(user_id, &item_ids)
                .await?
                .iter()
                .filter(|e| e.is_completed)
                .count() as u32;

            playlist_progress.push(PlaylistBrief {
                playlist_id,
                title: self.catalog.playlist_title(playlist_id).await?,
                progress_percentage: percentage(completed, item_ids.len() as u32),
            });
        }

        Ok(OverallStats {
            total_items_completed,
            total_time_minutes,
            playlist_progress,
        })
    }

    /// Current and longest streaks plus the last 30 days of activity,
    /// most recent day first
    pub async fn streak_report(&self, user_id: UserId, as_of: NaiveDate) -> Result<StreakReport> {
        let current_streak = self.streaks.current_streak(user_id, as_of).await?;
        let longest_streak = self.streaks.longest_streak(user_id).await?;

        let from = as_of - Duration::days(RECENT_ACTIVITY_DAYS - 1);
        let mut recent_activity = self.store.activity_between(user_id, from, as_of).await?;
        recent_activity.reverse();

        Ok(StreakReport {
            current_streak,
            longest_streak,
            recent_activity,
        })
    }

    /// Totals and a dense daily breakdown for the 7 calendar days ending
    /// at `as_of`
    ///
    /// Days without an aggregate row appear in the breakdown with zero
    /// minutes rather than being omitted.
    pub async fn weekly_insights(
        &self,
        user_id: UserId,
        as_of: NaiveDate,
    ) -> Result<WeeklyInsights> {
        let from = as_of - Duration::days(6);
        let rows = self.store.activity_between(user_id, from, as_of).await?;

        let total_minutes = rows.iter().map(|day| day.minutes_learned).sum();
        let items_completed = rows.iter().map(|day| day.items_completed).sum();

        let mut daily_breakdown = Vec::with_capacity(7);
        let mut date = from;
        while date <= as_of {
            let minutes = rows
                .iter()
                .find(|day| day.date == date)
                .map(|day| day.minutes_learned)
                .unwrap_or(0);
            daily_breakdown.push(DayMinutes { date, minutes });
            date += Duration::days(1);
        }

        Ok(WeeklyInsights {
            total_minutes,
            items_completed,
            daily_breakdown,
        })
    }
}
