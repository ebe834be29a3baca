//! Engine facade binding the recorder and the read-side calculators
//!
//! A thin API layer maps its endpoints 1:1 onto the methods here;
//! request/response shapes are the serializable report types from
//! [`crate::types`].

use crate::catalog::PlaylistCatalog;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::insights::InsightsReporter;
use crate::playlists::PlaylistAggregator;
use crate::recorder::ProgressRecorder;
use crate::storage::sqlite::SqliteStore;
use crate::storage::ProgressStore;
use crate::types::{
    ItemId, ItemProgress, OverallStats, PlaylistId, PlaylistSummary, ProgressEntry, StreakReport,
    UserId, WeeklyInsights,
};
use chrono::NaiveDate;
use std::sync::Arc;

/// Progress & learning-streak analytics engine
///
/// Owns the single write path and the read-side calculators over one
/// storage backend and one playlist catalog. All per-user state is
/// addressed by the explicit `UserId` on every call; the engine holds
/// no ambient user context.
pub struct ProgressEngine {
    recorder: ProgressRecorder,
    playlists: PlaylistAggregator,
    insights: InsightsReporter,
}

impl ProgressEngine {
    /// Build an engine over an already-constructed storage backend
    pub fn with_store(
        store: Arc<dyn ProgressStore>,
        catalog: Arc<dyn PlaylistCatalog>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            recorder: ProgressRecorder::new(
                store.clone(),
                catalog.clone(),
                config.max_write_retries,
            ),
            playlists: PlaylistAggregator::new(store.clone(), catalog.clone()),
            insights: InsightsReporter::new(store, catalog),
        }
    }

    /// Open the configured SQLite database, run migrations, and build an
    /// engine on top of it
    pub async fn connect(catalog: Arc<dyn PlaylistCatalog>, config: &EngineConfig) -> Result<Self> {
        let store = SqliteStore::new(&config.database_url).await?;
        store.run_migrations().await?;
        Ok(Self::with_store(Arc::new(store), catalog, config))
    }

    /// Record a time-spent/completion event
    pub async fn record_progress(
        &self,
        user_id: UserId,
        item_id: ItemId,
        delta_seconds: i64,
        mark_completed: bool,
        occurred_on: NaiveDate,
    ) -> Result<ProgressEntry> {
        self.recorder
            .record(user_id, item_id, delta_seconds, mark_completed, occurred_on)
            .await
    }

    /// Completion summary for one playlist
    pub async fn playlist_progress(
        &self,
        user_id: UserId,
        playlist_id: PlaylistId,
    ) -> Result<PlaylistSummary> {
        self.playlists.summarize(user_id, playlist_id).await
    }

    /// Per-item progress for one playlist, in playlist order
    pub async fn playlist_items(
        &self,
        user_id: UserId,
        playlist_id: PlaylistId,
    ) -> Result<Vec<ItemProgress>> {
        self.playlists.item_breakdown(user_id, playlist_id).await
    }

    /// Totals across all items plus per-playlist progress
    pub async fn overall_stats(&self, user_id: UserId) -> Result<OverallStats> {
        self.insights.overall_stats(user_id).await
    }

    /// Streak statistics as of a caller-supplied date
    pub async fn streaks(&self, user_id: UserId, as_of: NaiveDate) -> Result<StreakReport> {
        self.insights.streak_report(user_id, as_of).await
    }

    /// Weekly totals and daily breakdown ending at a caller-supplied date
    pub async fn weekly_insights(
        &self,
        user_id: UserId,
        as_of: NaiveDate,
    ) -> Result<WeeklyInsights> {
        self.insights.weekly_insights(user_id, as_of).await
    }
}
