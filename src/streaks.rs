//! Streak Calculator — pure read-side streak statistics
//!
//! A streak is a maximal run of consecutive calendar days with nonzero
//! recorded minutes. One semantic applies everywhere: a day with no
//! aggregate row, or a row with `minutes_learned == 0`, breaks a streak.
//! The calculators never mutate anything and tolerate sparse data.

use crate::error::Result;
use crate::storage::ProgressStore;
use crate::types::UserId;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;

/// Backward walks stop after a year; a longer current streak is not
/// representable without a full-history scan on every request.
const CURRENT_STREAK_HORIZON_DAYS: i64 = 365;

/// Read-side streak statistics over a user's daily activity aggregates
pub struct StreakCalculator {
    store: Arc<dyn ProgressStore>,
}

impl StreakCalculator {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Length of the streak ending at `as_of`
    ///
    /// Walks backward one day at a time from `as_of`; a day counts iff
    /// an aggregate exists with nonzero minutes. The first failing day —
    /// `as_of` itself included — ends the walk, so a user inactive today
    /// has a current streak of 0 regardless of history.
    pub async fn current_streak(&self, user_id: UserId, as_of: NaiveDate) -> Result<u32> {
        let horizon = as_of - Duration::days(CURRENT_STREAK_HORIZON_DAYS);
        let rows = self.store.activity_between(user_id, horizon, as_of).await?;

        let active_minutes: HashMap<NaiveDate, u64> = rows
            .into_iter()
            .map(|day| (day.date, day.minutes_learned))
            .collect();

        let mut streak = 0;
        let mut day = as_of;
        while day > horizon {
            match active_minutes.get(&day) {
                Some(&minutes) if minutes > 0 => {
                    streak += 1;
                    day -= Duration::days(1);
                }
                _ => break,
            }
        }

        Ok(streak)
    }

    /// Longest streak across the user's whole recorded history
    ///
    /// 0 when the user has no day with nonzero minutes.
    pub async fn longest_streak(&self, user_id: UserId) -> Result<u32> {
        let rows = self.store.all_activity(user_id).await?;
        Ok(longest_run(rows.iter().filter_map(|day| {
            day.is_active().then_some(day.date)
        })))
    }

    /// Longest streak within `from..=to`, same adjacency logic
    pub async fn longest_streak_between(
        &self,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u32> {
        let rows = self.store.activity_between(user_id, from, to).await?;
        Ok(longest_run(rows.iter().filter_map(|day| {
            day.is_active().then_some(day.date)
        })))
    }
}

/// Longest run of consecutive dates in an ascending date sequence
fn longest_run(dates: impl Iterator<Item = NaiveDate>) -> u32 {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for date in dates {
        run = match prev {
            Some(p) if date == p + Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }

    longest
}
