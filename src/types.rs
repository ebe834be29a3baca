//! Core data types for the Melete progress engine
//!
//! This module defines the two persisted entities — the progress ledger
//! entry and the daily activity aggregate — together with the identifier
//! newtypes and the derived report types computed on read. Derived types
//! are never persisted; they are recomputed from the two entities on
//! every request.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an identifier from a string
            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type! {
    /// Identifies a learner
    ///
    /// Supplied by the identity collaborator with every call; the engine
    /// trusts it as given and never authenticates.
    UserId
}

id_type! {
    /// Identifies a learning item inside a playlist
    ///
    /// Item existence and ordering are owned by the playlist catalog;
    /// the engine only references items.
    ItemId
}

id_type! {
    /// Identifies a playlist owned by the playlist catalog
    PlaylistId
}

/// Durable record of one user's relationship to one learning item
///
/// Exactly one entry exists per (user, item) pair, created lazily on the
/// first progress event. `time_spent_seconds` only ever grows, and
/// `completed_at` is set exactly once, on the false→true completion
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Owning user
    pub user_id: UserId,

    /// Learning item this entry tracks
    pub item_id: ItemId,

    /// Whether the user has completed the item
    pub is_completed: bool,

    /// Accumulated time on task, in seconds (monotonically non-decreasing)
    pub time_spent_seconds: u64,

    /// When the completion transition happened, if it has
    pub completed_at: Option<DateTime<Utc>>,

    /// Updated on every write to this entry
    pub last_accessed: DateTime<Utc>,
}

/// Per-user, per-calendar-day activity rollup used for streak computation
///
/// The date is supplied by the caller in the user's effective timezone;
/// the engine does not infer timezones. Both counters are additive and
/// never corrected downward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub user_id: UserId,

    /// Calendar date in the user's effective timezone
    pub date: NaiveDate,

    /// Whole minutes of learning credited to this day
    pub minutes_learned: u64,

    /// Completion transitions credited to this day
    pub items_completed: u32,
}

impl DailyActivity {
    /// Whether this day counts toward a streak
    pub fn is_active(&self) -> bool {
        self.minutes_learned > 0
    }
}

/// A validated progress event, the single unit of write work
///
/// Built by the recorder after validation and catalog checks; the storage
/// layer applies it atomically to the ledger entry and, on a completion
/// transition, the day's aggregate.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub user_id: UserId,
    pub item_id: ItemId,

    /// Seconds of time-on-task added by this event
    pub delta_seconds: u64,

    /// Whether the caller is marking the item completed
    pub mark_completed: bool,

    /// Calendar day this activity belongs to (caller-supplied)
    pub occurred_on: NaiveDate,

    /// Wall-clock time the event was accepted
    pub recorded_at: DateTime<Utc>,
}

impl ProgressEvent {
    /// Whole minutes represented by this event's delta, truncating
    pub fn delta_minutes(&self) -> u64 {
        self.delta_seconds / 60
    }
}

/// Completion summary for one playlist, computed on read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub playlist_id: PlaylistId,
    pub playlist_title: String,
    pub total_items: u32,
    pub completed_items: u32,

    /// `completed / total * 100`, rounded to one decimal; 0.0 for an
    /// empty playlist
    pub progress_percentage: f64,
    pub total_time_spent_seconds: u64,
}

/// Per-item progress line in a playlist breakdown
///
/// Items the user has never touched get a synthesized zero-state line
/// rather than being omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProgress {
    pub item_id: ItemId,
    pub title: String,
    pub is_completed: bool,
    pub time_spent_seconds: u64,
}

/// Streak statistics plus recent activity, most recent day first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakReport {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub recent_activity: Vec<DailyActivity>,
}

/// One day in a weekly breakdown; zero-filled for days without activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMinutes {
    pub date: NaiveDate,
    pub minutes: u64,
}

/// Totals and daily breakdown for the 7 calendar days ending at `as_of`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyInsights {
    pub total_minutes: u64,
    pub items_completed: u32,
    pub daily_breakdown: Vec<DayMinutes>,
}

/// Abbreviated per-playlist progress used in overall statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistBrief {
    pub playlist_id: PlaylistId,
    pub title: String,
    pub progress_percentage: f64,
}

/// Cross-playlist learning statistics for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_items_completed: u32,
    pub total_time_minutes: u64,
    pub playlist_progress: Vec<PlaylistBrief>,
}

/// Round a completion ratio to a one-decimal percentage
pub(crate) fn percentage(completed: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = completed as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = ItemId::new();
        let parsed = ItemId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 5), 100.0);
    }

    #[test]
    fn test_delta_minutes_truncates() {
        let event = ProgressEvent {
            user_id: UserId::new(),
            item_id: ItemId::new(),
            delta_seconds: 119,
            mark_completed: true,
            occurred_on: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            recorded_at: Utc::now(),
        };
        assert_eq!(event.delta_minutes(), 1);
    }

    #[test]
    fn test_zero_minute_day_is_not_active() {
        let day = DailyActivity {
            user_id: UserId::new(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            minutes_learned: 0,
            items_completed: 1,
        };
        assert!(!day.is_active());
    }
}
