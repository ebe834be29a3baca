//! In-memory storage backend
//!
//! Keeps both entities in `BTreeMap`s behind one `RwLock`. A single
//! write guard scopes each `apply_event`, which gives the same
//! both-or-neither guarantee the SQL backend gets from a transaction.
//! Used by the test suite and by embedders that don't need durability.

use crate::error::Result;
use crate::storage::{ProgressStore, RecordOutcome};
use crate::types::{DailyActivity, ItemId, ProgressEntry, ProgressEvent, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    entries: BTreeMap<(UserId, ItemId), ProgressEntry>,
    activity: BTreeMap<(UserId, NaiveDate), DailyActivity>,
}

/// Non-durable storage backend
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn apply_event(&self, event: &ProgressEvent) -> Result<RecordOutcome> {
        // One write guard covers both tables; no partial state is
        // observable and writes to the same pair cannot interleave.
        let mut tables = self.tables.write().await;

        let entry = tables
            .entries
            .entry((event.user_id, event.item_id))
            .or_insert_with(|| ProgressEntry {
                user_id: event.user_id,
                item_id: event.item_id,
                is_completed: false,
                time_spent_seconds: 0,
                completed_at: None,
                last_accessed: event.recorded_at,
            });

        entry.time_spent_seconds = entry.time_spent_seconds.saturating_add(event.delta_seconds);
        entry.last_accessed = event.recorded_at;

        let completed_now = event.mark_completed && !entry.is_completed;
        if completed_now {
            entry.is_completed = true;
            entry.completed_at = Some(event.recorded_at);
        }
        let snapshot = entry.clone();

        if completed_now {
            let day = tables
                .activity
                .entry((event.user_id, event.occurred_on))
                .or_insert_with(|| DailyActivity {
                    user_id: event.user_id,
                    date: event.occurred_on,
                    minutes_learned: 0,
                    items_completed: 0,
                });
            day.minutes_learned = day.minutes_learned.saturating_add(event.delta_minutes());
            day.items_completed = day.items_completed.saturating_add(1);
        }

        Ok(RecordOutcome {
            entry: snapshot,
            completed_now,
        })
    }

    async fn entry(&self, user_id: UserId, item_id: ItemId) -> Result<Option<ProgressEntry>> {
        let tables = self.tables.read().await;
        Ok(tables.entries.get(&(user_id, item_id)).cloned())
    }

    async fn entries_for_items(
        &self,
        user_id: UserId,
        item_ids: &[ItemId],
    ) -> Result<Vec<ProgressEntry>> {
        let tables = self.tables.read().await;
        Ok(item_ids
            .iter()
            .filter_map(|item_id| tables.entries.get(&(user_id, *item_id)).cloned())
            .collect())
    }

    async fn completed_count(&self, user_id: UserId) -> Result<u32> {
        let tables = self.tables.read().await;
        Ok(tables
            .entries
            .range((user_id, ItemId(uuid::Uuid::nil()))..)
            .take_while(|((u, _), _)| *u == user_id)
            .filter(|(_, e)| e.is_completed)
            .count() as u32)
    }

    async fn total_time_spent(&self, user_id: UserId) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .entries
            .range((user_id, ItemId(uuid::Uuid::nil()))..)
            .take_while(|((u, _), _)| *u == user_id)
            .map(|(_, e)| e.time_spent_seconds)
            .sum())
    }

    async fn activity_on(&self, user_id: UserId, date: NaiveDate) -> Result<Option<DailyActivity>> {
        let tables = self.tables.read().await;
        Ok(tables.activity.get(&(user_id, date)).cloned())
    }

    async fn activity_between(
        &self,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyActivity>> {
        let tables = self.tables.read().await;
        Ok(tables
            .activity
            .range((user_id, from)..=(user_id, to))
            .map(|(_, day)| day.clone())
            .collect())
    }

    async fn all_activity(&self, user_id: UserId) -> Result<Vec<DailyActivity>> {
        let tables = self.tables.read().await;
        Ok(tables
            .activity
            .range((user_id, NaiveDate::MIN)..=(user_id, NaiveDate::MAX))
            .map(|(_, day)| day.clone())
            .collect())
    }
}
