//! Daily activity streak.
//!
//! A streak counts consecutive calendar days on which the user was active.
//! Days are derived from instants through a single [`DayPolicy`], so every
//! caller agrees on where midnight falls.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Offset, Utc};

/// Maps an instant to the calendar day it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPolicy {
    offset: FixedOffset,
}

impl Default for DayPolicy {
    fn default() -> Self {
        Self::utc()
    }
}

impl DayPolicy {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Days start at local midnight of a fixed offset east of UTC.
    /// Returns `None` when the offset is outside ±24h.
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        let secs = minutes.checked_mul(60)?;
        FixedOffset::east_opt(secs).map(|offset| Self { offset })
    }

    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    /// Consecutive active days. Saturates at `u32::MAX` instead of wrapping.
    pub current_streak: u32,
    pub last_active_date: DateTime<Utc>,
    /// False when the user was already credited for this day.
    pub changed: bool,
}

/// Pure daily-streak state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakEvaluator {
    policy: DayPolicy,
}

impl StreakEvaluator {
    pub fn new(policy: DayPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DayPolicy {
        self.policy
    }

    /// Evaluate activity at `today` against the stored state.
    ///
    /// - no previous activity: start at 1
    /// - same day: nothing changes, the stored instant is kept
    /// - previous day: extend by one
    /// - any other gap (including a stored day in the future): restart at 1
    pub fn evaluate(
        &self,
        today: DateTime<Utc>,
        last_active_date: Option<DateTime<Utc>>,
        current_streak: u32,
    ) -> StreakUpdate {
        let Some(last) = last_active_date else {
            return Self::restart(today);
        };

        let last_day = self.policy.day_of(last);
        let today_day = self.policy.day_of(today);

        if last_day == today_day {
            return StreakUpdate {
                current_streak,
                last_active_date: last,
                changed: false,
            };
        }

        let yesterday = today_day.checked_sub_days(Days::new(1));
        if yesterday == Some(last_day) {
            return StreakUpdate {
                current_streak: current_streak.saturating_add(1),
                last_active_date: today,
                changed: true,
            };
        }

        Self::restart(today)
    }

    fn restart(today: DateTime<Utc>) -> StreakUpdate {
        StreakUpdate {
            current_streak: 1,
            last_active_date: today,
            changed: true,
        }
    }
}
