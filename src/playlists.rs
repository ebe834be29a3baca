//! Playlist Progress Aggregator — pure read-side completion summaries
//!
//! Joins a playlist's item set (from the catalog) against the user's
//! ledger entries. Missing entries always read as zero state; the only
//! failure mode is a playlist the catalog does not know.

use crate::catalog::PlaylistCatalog;
use crate::error::Result;
use crate::storage::ProgressStore;
use crate::types::{percentage, ItemProgress, PlaylistId, PlaylistSummary, ProgressEntry, UserId};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-side completion and time-spent summaries for playlists
pub struct PlaylistAggregator {
    store: Arc<dyn ProgressStore>,
    catalog: Arc<dyn PlaylistCatalog>,
}

impl PlaylistAggregator {
    pub fn new(store: Arc<dyn ProgressStore>, catalog: Arc<dyn PlaylistCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Completion summary for one playlist
    ///
    /// An empty playlist is valid and reports 0.0 percent, never a
    /// division error.
    pub async fn summarize(
        &self,
        user_id: UserId,
        playlist_id: PlaylistId,
    ) -> Result<PlaylistSummary> {
        let playlist_title = self.catalog.playlist_title(playlist_id).await?;
        let item_ids = self.catalog.playlist_item_ids(playlist_id).await?;
        let entries = self.store.entries_for_items(user_id, &item_ids).await?;

        let total_items = item_ids.len() as u32;
        let completed_items = entries.iter().filter(|e| e.is_completed).count() as u32;
        let total_time_spent_seconds = entries.iter().map(|e| e.time_spent_seconds).sum();

        Ok(PlaylistSummary {
            playlist_id,
            playlist_title,
            total_items,
            completed_items,
            progress_percentage: percentage(completed_items, total_items),
            total_time_spent_seconds,
        })
    }

    /// Per-item progress lines, in playlist order
    ///
    /// Items without a ledger entry get a synthesized zero-state line.
    pub async fn item_breakdown(
        &self,
        user_id: UserId,
        playlist_id: PlaylistId,
    ) -> Result<Vec<ItemProgress>> {
        let item_ids = self.catalog.playlist_item_ids(playlist_id).await?;
        let entries = self.store.entries_for_items(user_id, &item_ids).await?;
        let by_item: HashMap<_, _> = entries.into_iter().map(|e| (e.item_id, e)).collect();

        let mut lines = Vec::with_capacity(item_ids.len());
        for item_id in item_ids {
            let title = self.catalog.item_title(item_id).await?;
            let line = match by_item.get(&item_id) {
                Some(ProgressEntry {
                    is_completed,
                    time_spent_seconds,
                    ..
                }) => ItemProgress {
                    item_id,
                    title,
                    is_completed: *is_completed,
                    time_spent_seconds: *time_spent_seconds,
                },
                None => ItemProgress {
                    item_id,
                    title,
                    is_completed: false,
                    time_spent_seconds: 0,
                },
            };
            lines.push(line);
        }

        Ok(lines)
    }
}
