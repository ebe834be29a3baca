//! Storage layer for the Melete progress engine
//!
//! Provides the abstraction and implementations for the two persisted
//! entities: progress ledger entries and daily activity aggregates. The
//! write path is a single atomic operation; everything else is read-only.

pub mod memory;
pub mod sqlite;

use crate::error::Result;
use crate::types::{DailyActivity, ItemId, ProgressEntry, ProgressEvent, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Result of applying one progress event
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    /// The ledger entry after the event was applied
    pub entry: ProgressEntry,

    /// Whether this event performed the false→true completion transition
    pub completed_now: bool,
}

/// Storage backend trait defining all required operations
///
/// `apply_event` is the only mutation; implementations must apply the
/// ledger increment and the conditional aggregate increment as one
/// atomic unit — callers observe both or neither. Writes to a single
/// (user, item) pair are serialized by the backend; contention surfaces
/// as [`MeleteError::Conflict`](crate::MeleteError::Conflict) and is
/// retried by the recorder, not by the backend.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Apply a validated progress event
    ///
    /// Upserts the (user, item) ledger entry, adding the event's delta to
    /// `time_spent_seconds` and refreshing `last_accessed`. Iff the event
    /// marks completion and the entry was not already completed, sets
    /// `is_completed`/`completed_at` and increments the day's aggregate:
    /// `items_completed` by one and `minutes_learned` by the event's
    /// whole minutes. An already-completed entry never earns a second
    /// aggregate credit.
    async fn apply_event(&self, event: &ProgressEvent) -> Result<RecordOutcome>;

    /// Ledger entry for a (user, item) pair, if one exists
    async fn entry(&self, user_id: UserId, item_id: ItemId) -> Result<Option<ProgressEntry>>;

    /// Ledger entries a user holds among the given items
    ///
    /// Items without an entry are simply absent from the result.
    async fn entries_for_items(
        &self,
        user_id: UserId,
        item_ids: &[ItemId],
    ) -> Result<Vec<ProgressEntry>>;

    /// Count of the user's completed ledger entries, across all items
    async fn completed_count(&self, user_id: UserId) -> Result<u32>;

    /// Sum of `time_spent_seconds` across all the user's ledger entries
    async fn total_time_spent(&self, user_id: UserId) -> Result<u64>;

    /// The user's aggregate for one calendar day, if one exists
    async fn activity_on(&self, user_id: UserId, date: NaiveDate) -> Result<Option<DailyActivity>>;

    /// The user's aggregates with `from <= date <= to`, ascending by date
    async fn activity_between(
        &self,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyActivity>>;

    /// All of the user's aggregates, ascending by date
    async fn all_activity(&self, user_id: UserId) -> Result<Vec<DailyActivity>>;
}
