//! SQLite storage backend implementation
//!
//! Persists the progress ledger and daily activity aggregates in two
//! tables with composite-key uniqueness. Each `apply_event` runs inside
//! one transaction so the ledger increment and the conditional aggregate
//! increment commit together or not at all. Write contention (SQLITE_BUSY
//! and friends) is reported as `Conflict` for the recorder to retry.

use crate::error::{MeleteError, Result};
use crate::storage::{ProgressStore, RecordOutcome};
use crate::types::{DailyActivity, ItemId, ProgressEntry, ProgressEvent, UserId};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{ConnectOptions, Row};
use std::str::FromStr;
use tracing::{debug, info};

/// SQLite storage backend
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite storage backend
    ///
    /// # Arguments
    /// * `database_url` - Path to SQLite database file (e.g., "sqlite://melete.db")
    pub async fn new(database_url: &str) -> Result<Self> {
        info!("Connecting to SQLite database: {}", database_url);

        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        // Disable logging for queries (too verbose)
        options = options.disable_statement_logging();

        let pool = SqlitePool::connect_with(options).await?;

        info!("SQLite connection established");

        Ok(Self { pool })
    }

    /// In-memory database for tests
    ///
    /// Limited to a single connection: SQLite in-memory databases are
    /// private to their connection, so a larger pool would hand out
    /// empty databases.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        sqlx::migrate!("./migrations/sqlite").run(&self.pool).await?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Convert database row to ProgressEntry
    fn row_to_entry(row: &SqliteRow) -> Result<ProgressEntry> {
        let user_str: String = row.try_get("user_id")?;
        let item_str: String = row.try_get("item_id")?;
        let user_id = UserId::from_string(&user_str)
            .map_err(|e| MeleteError::Other(format!("corrupt user id in ledger: {e}")))?;
        let item_id = ItemId::from_string(&item_str)
            .map_err(|e| MeleteError::Other(format!("corrupt item id in ledger: {e}")))?;

        Ok(ProgressEntry {
            user_id,
            item_id,
            is_completed: row.try_get::<i64, _>("is_completed")? != 0,
            time_spent_seconds: row.try_get::<i64, _>("time_spent_seconds")? as u64,
            completed_at: row.try_get::<Option<DateTime<Utc>>, _>("completed_at")?,
            last_accessed: row.try_get("last_accessed")?,
        })
    }

    /// Convert database row to DailyActivity
    fn row_to_activity(row: &SqliteRow) -> Result<DailyActivity> {
        let user_str: String = row.try_get("user_id")?;
        let user_id = UserId::from_string(&user_str)
            .map_err(|e| MeleteError::Other(format!("corrupt user id in aggregate: {e}")))?;

        Ok(DailyActivity {
            user_id,
            date: row.try_get::<NaiveDate, _>("date")?,
            minutes_learned: row.try_get::<i64, _>("minutes_learned")? as u64,
            items_completed: row.try_get::<i64, _>("items_completed")? as u32,
        })
    }

    async fn try_apply(&self, event: &ProgressEvent) -> Result<RecordOutcome> {
        debug!(
            user = %event.user_id,
            item = %event.item_id,
            delta = event.delta_seconds,
            "Applying progress event"
        );

        let mut tx = self.pool.begin().await?;

        // The transition decision reads the prior row inside the same
        // transaction. A concurrent writer that commits in between makes
        // this transaction fail with SQLITE_BUSY, which surfaces as
        // Conflict and is retried by the recorder.
        let prior_completed: Option<i64> = sqlx::query_scalar(
            "SELECT is_completed FROM progress_entries WHERE user_id = ? AND item_id = ?",
        )
        .bind(event.user_id.to_string())
        .bind(event.item_id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let was_completed = prior_completed.unwrap_or(0) != 0;
        let completed_now = event.mark_completed && !was_completed;
        let completed_at = completed_now.then_some(event.recorded_at);

        sqlx::query(
            r#"
            INSERT INTO progress_entries (
                user_id, item_id, is_completed, time_spent_seconds, completed_at, last_accessed
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, item_id) DO UPDATE SET
                time_spent_seconds = progress_entries.time_spent_seconds + excluded.time_spent_seconds,
                is_completed = MAX(progress_entries.is_completed, excluded.is_completed),
                completed_at = COALESCE(progress_entries.completed_at, excluded.completed_at),
                last_accessed = excluded.last_accessed
            "#,
        )
        .bind(event.user_id.to_string())
        .bind(event.item_id.to_string())
        .bind(event.mark_completed as i64)
        .bind(event.delta_seconds as i64)
        .bind(completed_at)
        .bind(event.recorded_at)
        .execute(&mut *tx)
        .await?;

        if completed_now {
            sqlx::query(
                r#"
                INSERT INTO daily_activity (user_id, date, minutes_learned, items_completed)
                VALUES (?, ?, ?, 1)
                ON CONFLICT(user_id, date) DO UPDATE SET
                    minutes_learned = daily_activity.minutes_learned + excluded.minutes_learned,
                    items_completed = daily_activity.items_completed + excluded.items_completed
                "#,
            )
            .bind(event.user_id.to_string())
            .bind(event.occurred_on)
            .bind(event.delta_minutes() as i64)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query(
            "SELECT user_id, item_id, is_completed, time_spent_seconds, completed_at, last_accessed
             FROM progress_entries WHERE user_id = ? AND item_id = ?",
        )
        .bind(event.user_id.to_string())
        .bind(event.item_id.to_string())
        .fetch_one(&mut *tx)
        .await?;
        let entry = Self::row_to_entry(&row)?;

        tx.commit().await?;

        Ok(RecordOutcome {
            entry,
            completed_now,
        })
    }
}

/// Whether a sqlx error is SQLite write contention rather than a real failure
fn is_busy(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            // 5 = SQLITE_BUSY, 6 = SQLITE_LOCKED, 517 = SQLITE_BUSY_SNAPSHOT
            matches!(db.code().as_deref(), Some("5") | Some("6") | Some("517"))
                || db.message().contains("database is locked")
        }
        _ => false,
    }
}

#[async_trait]
impl ProgressStore for SqliteStore {
    async fn apply_event(&self, event: &ProgressEvent) -> Result<RecordOutcome> {
        match self.try_apply(event).await {
            Err(MeleteError::Database(err)) if is_busy(&err) => {
                Err(MeleteError::Conflict(err.to_string()))
            }
            other => other,
        }
    }

    async fn entry(&self, user_id: UserId, item_id: ItemId) -> Result<Option<ProgressEntry>> {
        let row = sqlx::query(
            "SELECT user_id, item_id, is_completed, time_spent_seconds, completed_at, last_accessed
             FROM progress_entries WHERE user_id = ? AND item_id = ?",
        )
        .bind(user_id.to_string())
        .bind(item_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn entries_for_items(
        &self,
        user_id: UserId,
        item_ids: &[ItemId],
    ) -> Result<Vec<ProgressEntry>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        // sqlite has no array binds; expand placeholders per item
        let placeholders = vec!["?"; item_ids.len()].join(", ");
        let sql = format!(
            "SELECT user_id, item_id, is_completed, time_spent_seconds, completed_at, last_accessed
             FROM progress_entries WHERE user_id = ? AND item_id IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql).bind(user_id.to_string());
        for item_id in item_ids {
            query = query.bind(item_id.to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn completed_count(&self, user_id: UserId) -> Result<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM progress_entries WHERE user_id = ? AND is_completed = 1",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u32)
    }

    async fn total_time_spent(&self, user_id: UserId) -> Result<u64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(time_spent_seconds), 0) FROM progress_entries WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(total as u64)
    }

    async fn activity_on(&self, user_id: UserId, date: NaiveDate) -> Result<Option<DailyActivity>> {
        let row = sqlx::query(
            "SELECT user_id, date, minutes_learned, items_completed
             FROM daily_activity WHERE user_id = ? AND date = ?",
        )
        .bind(user_id.to_string())
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_activity).transpose()
    }

    async fn activity_between(
        &self,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyActivity>> {
        let rows = sqlx::query(
            "SELECT user_id, date, minutes_learned, items_completed
             FROM daily_activity
             WHERE user_id = ? AND date >= ? AND date <= ?
             ORDER BY date ASC",
        )
        .bind(user_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_activity).collect()
    }

    async fn all_activity(&self, user_id: UserId) -> Result<Vec<DailyActivity>> {
        let rows = sqlx::query(
            "SELECT user_id, date, minutes_learned, items_completed
             FROM daily_activity WHERE user_id = ? ORDER BY date ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_activity).collect()
    }
}
