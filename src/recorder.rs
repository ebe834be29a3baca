//! Progress Recorder — the engine's single write path
//!
//! Validates incoming events, checks item existence against the playlist
//! catalog, and hands the event to storage as one atomic unit. Write
//! contention reported by the backend is retried here with a short
//! backoff; it never reaches the caller unless retries are exhausted.

use crate::catalog::PlaylistCatalog;
use crate::error::{MeleteError, Result};
use crate::storage::ProgressStore;
use crate::types::{ItemId, ProgressEntry, ProgressEvent, UserId};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A single event may not claim more than a day of time-on-task.
pub const MAX_DELTA_SECONDS: i64 = 86_400;

/// Records time-spent/completion events against the progress ledger
pub struct ProgressRecorder {
    store: Arc<dyn ProgressStore>,
    catalog: Arc<dyn PlaylistCatalog>,
    max_write_retries: u32,
}

impl ProgressRecorder {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        catalog: Arc<dyn PlaylistCatalog>,
        max_write_retries: u32,
    ) -> Self {
        Self {
            store,
            catalog,
            max_write_retries,
        }
    }

    /// Record a progress event for a (user, item) pair
    ///
    /// Adds `delta_seconds` to the entry's accumulated time. This is
    /// additive, not idempotent: callers re-sending the same delta double
    /// count it, and the engine does not deduplicate by request id. When
    /// `mark_completed` is true and the entry was not yet completed, the
    /// completion is stamped and `occurred_on`'s daily aggregate is
    /// credited exactly once.
    ///
    /// `occurred_on` is the calendar day in the user's effective
    /// timezone; the engine never infers it.
    ///
    /// Returns the updated ledger entry so callers can report new totals.
    pub async fn record(
        &self,
        user_id: UserId,
        item_id: ItemId,
        delta_seconds: i64,
        mark_completed: bool,
        occurred_on: NaiveDate,
    ) -> Result<ProgressEntry> {
        if delta_seconds < 0 {
            return Err(MeleteError::Validation(format!(
                "time delta must be non-negative, got {delta_seconds}"
            )));
        }
        if delta_seconds > MAX_DELTA_SECONDS {
            return Err(MeleteError::Validation(format!(
                "time delta {delta_seconds}s exceeds the per-event maximum of {MAX_DELTA_SECONDS}s"
            )));
        }

        if !self.catalog.item_exists(item_id).await? {
            return Err(MeleteError::ItemNotFound(item_id));
        }

        let event = ProgressEvent {
            user_id,
            item_id,
            delta_seconds: delta_seconds as u64,
            mark_completed,
            occurred_on,
            recorded_at: Utc::now(),
        };

        let mut attempt = 0;
        loop {
            match self.store.apply_event(&event).await {
                Ok(outcome) => {
                    if outcome.completed_now {
                        info!(
                            user = %user_id,
                            item = %item_id,
                            date = %occurred_on,
                            "Item completed"
                        );
                    } else {
                        debug!(user = %user_id, item = %item_id, "Progress recorded");
                    }
                    return Ok(outcome.entry);
                }
                Err(MeleteError::Conflict(reason)) if attempt < self.max_write_retries => {
                    attempt += 1;
                    warn!(
                        user = %user_id,
                        item = %item_id,
                        attempt,
                        reason = %reason,
                        "Write conflict, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(25 * u64::from(attempt))).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
