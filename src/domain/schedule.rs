//! Weekly recurring vibe schedule rules.
//!
//! A [`ScheduleRule`] maps a (day-of-week, start-time, end-time) window to a
//! [`Vibe`], with a priority for resolving overlaps. Overnight windows
//! (`end_time < start_time`) are explicitly supported: the rule covers
//! `[start, midnight)` on its own day and `[00:00, end]` on the following
//! day, so a Friday 22:00–02:00 rule still matches at Saturday 01:00.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::RuleId;
use super::live_state::Vibe;
use crate::error::GatewayError;

/// Number of days in the scheduling week. Day-of-week values are
/// `0 = Sunday … 6 = Saturday`.
pub const DAYS_PER_WEEK: u8 = 7;

/// Parses a `"HH:MM"` time-of-day string.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] when the string is not a valid
/// 24-hour `HH:MM` value.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, GatewayError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| GatewayError::InvalidRequest(format!("invalid time of day: {s}")))
}

/// A single weekly recurring vibe window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRule {
    /// Rule identifier; also the deterministic tie-break for equal priorities.
    pub id: RuleId,
    /// Day of week the window starts on (0 = Sunday … 6 = Saturday).
    pub day_of_week: u8,
    /// Local start time (inclusive).
    pub start_time: NaiveTime,
    /// Local end time (inclusive). Earlier than `start_time` for overnight windows.
    pub end_time: NaiveTime,
    /// Vibe applied while the window is active.
    pub vibe: Vibe,
    /// Higher priority wins when windows overlap.
    pub priority: i32,
    /// Inactive rules never match.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ScheduleRule {
    /// Creates a validated rule.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] when `day_of_week` is out of
    /// range or the window is degenerate (`start_time == end_time`).
    pub fn new(
        day_of_week: u8,
        start_time: NaiveTime,
        end_time: NaiveTime,
        vibe: Vibe,
        priority: i32,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, GatewayError> {
        if day_of_week >= DAYS_PER_WEEK {
            return Err(GatewayError::InvalidRequest(format!(
                "day_of_week must be 0..=6, got {day_of_week}"
            )));
        }
        if start_time == end_time {
            return Err(GatewayError::InvalidRequest(
                "schedule window must not be empty (start_time == end_time)".to_string(),
            ));
        }
        Ok(Self {
            id: RuleId::new(),
            day_of_week,
            start_time,
            end_time,
            vibe,
            priority,
            is_active,
            created_at: now,
        })
    }

    /// Whether this window wraps past midnight.
    #[must_use]
    pub fn is_overnight(&self) -> bool {
        self.end_time < self.start_time
    }

    /// Whether the rule covers the given local day-of-week and time-of-day.
    ///
    /// Inactive rules never match. Overnight rules match on their own day
    /// from `start_time` onward and on the following day up to `end_time`.
    #[must_use]
    pub fn matches_at(&self, day_of_week: u8, time: NaiveTime) -> bool {
        if !self.is_active {
            return false;
        }
        if self.is_overnight() {
            (day_of_week == self.day_of_week && time >= self.start_time)
                || (day_of_week == (self.day_of_week + 1) % DAYS_PER_WEEK
                    && time <= self.end_time)
        } else {
            day_of_week == self.day_of_week
                && time >= self.start_time
                && time <= self.end_time
        }
    }
}
