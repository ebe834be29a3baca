//! Melete - Progress & Learning-Streak Analytics Engine
//!
//! Tracks what learners do with their playlists: per-item time spent and
//! completion, per-day activity rollups, and the statistics derived from
//! them — current and longest streaks, weekly insights, and
//! playlist-level completion percentages.
//!
//! # Architecture
//!
//! The system is organized into several layers:
//! - **Types**: the two persisted entities (ledger entry, daily
//!   aggregate) and the derived report types
//! - **Storage**: backends behind the `ProgressStore` trait (SQLite,
//!   in-memory)
//! - **Recorder**: the single write path — validation, catalog checks,
//!   atomic apply, conflict retries
//! - **Calculators**: pure read-side streak, playlist, and insight
//!   computations
//!
//! Playlists themselves live in an external catalog consumed through the
//! [`PlaylistCatalog`] trait; user identity arrives as an explicit
//! [`UserId`] on every call.
//!
//! # Example
//!
//! ```ignore
//! use melete::{EngineConfig, ProgressEngine, StaticCatalog, UserId};
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let catalog = Arc::new(load_catalog());
//!     let config = EngineConfig::from_env()?;
//!     let engine = ProgressEngine::connect(catalog, &config).await?;
//!
//!     let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
//!     let entry = engine
//!         .record_progress(user, item, 300, true, today)
//!         .await?;
//!     println!("total time on item: {}s", entry.time_spent_seconds);
//!
//!     let report = engine.streaks(user, today).await?;
//!     println!("current streak: {} days", report.current_streak);
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod insights;
pub mod playlists;
pub mod recorder;
pub mod storage;
pub mod streaks;
pub mod types;

// Re-export commonly used types
pub use catalog::{PlaylistCatalog, StaticCatalog};
pub use config::EngineConfig;
pub use engine::ProgressEngine;
pub use error::{MeleteError, Result};
pub use insights::InsightsReporter;
pub use playlists::PlaylistAggregator;
pub use recorder::ProgressRecorder;
pub use storage::{memory::MemoryStore, sqlite::SqliteStore, ProgressStore, RecordOutcome};
pub use streaks::StreakCalculator;
pub use types::{
    DailyActivity, DayMinutes, ItemId, ItemProgress, OverallStats, PlaylistBrief, PlaylistId,
    PlaylistSummary, ProgressEntry, ProgressEvent, StreakReport, UserId, WeeklyInsights,
};
