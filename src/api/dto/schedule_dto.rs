//! Schedule-rule DTOs and vibe query responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{RuleId, ScheduleRule, Vibe};
use crate::engine::vibe::VibeChange;

/// Request body for `POST /venues/:id/schedule`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateScheduleRuleRequest {
    /// Day of week (0 = Sunday … 6 = Saturday).
    pub day_of_week: u8,
    /// Local start time in `HH:MM`.
    pub start_time: String,
    /// Local end time in `HH:MM`. Earlier than `start_time` for overnight
    /// windows.
    pub end_time: String,
    /// Vibe applied while the window is active.
    pub vibe: Vibe,
    /// Priority; higher wins on overlap. Defaults to 0.
    #[serde(default)]
    pub priority: i32,
    /// Whether the rule is active. Defaults to true.
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// Schedule rule as exposed on the wire.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleRuleDto {
    /// Rule identifier.
    pub rule_id: RuleId,
    /// Day of week (0 = Sunday … 6 = Saturday).
    pub day_of_week: u8,
    /// Local start time in `HH:MM`.
    pub start_time: String,
    /// Local end time in `HH:MM`.
    pub end_time: String,
    /// Vibe applied while the window is active.
    pub vibe: Vibe,
    /// Priority.
    pub priority: i32,
    /// Whether the rule is active.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<ScheduleRule> for ScheduleRuleDto {
    fn from(rule: ScheduleRule) -> Self {
        Self {
            rule_id: rule.id,
            day_of_week: rule.day_of_week,
            start_time: rule.start_time.format("%H:%M").to_string(),
            end_time: rule.end_time.format("%H:%M").to_string(),
            vibe: rule.vibe,
            priority: rule.priority,
            is_active: rule.is_active,
            created_at: rule.created_at,
        }
    }
}

/// Response body for `GET /venues/:id/vibe/current`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentVibeResponse {
    /// Currently scheduled vibe, or null when no active rule matches.
    pub vibe: Option<Vibe>,
    /// The instant the resolution was evaluated at.
    pub evaluated_at: DateTime<Utc>,
}

/// Response body for `GET /venues/:id/vibe/next`.
#[derive(Debug, Serialize, ToSchema)]
pub struct NextVibeChangeResponse {
    /// Vibe the venue will switch to.
    pub vibe: Vibe,
    /// Local start time of the upcoming window in `HH:MM`.
    pub starts_at: String,
    /// Local day of week of the upcoming window (0 = Sunday … 6 = Saturday).
    pub day_of_week: u8,
    /// Identifier of the winning rule.
    pub rule_id: RuleId,
}

impl From<VibeChange> for NextVibeChangeResponse {
    fn from(change: VibeChange) -> Self {
        Self {
            vibe: change.vibe,
            starts_at: change.starts_at.format("%H:%M").to_string(),
            day_of_week: change.day_of_week,
            rule_id: change.rule_id,
        }
    }
}
