//! Automation DTOs: tick reports, scenario presets, status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::service::{AutomationStatus, TickReport};

/// Request body for `POST /automation/scenario`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScenarioRequest {
    /// Preset name: `ALL_BUSY`, `ALL_QUIET`, or `VIBE_SHIFT`.
    pub preset: String,
}

/// Outcome of a tick or scenario run.
#[derive(Debug, Serialize, ToSchema)]
pub struct TickReportResponse {
    /// Venues examined.
    pub scanned: usize,
    /// Venues whose live state changed.
    pub updated: usize,
    /// Venues skipped.
    pub skipped: usize,
    /// The instant the run was evaluated at.
    pub evaluated_at: DateTime<Utc>,
}

impl TickReportResponse {
    /// Wraps a [`TickReport`] with the evaluation instant.
    #[must_use]
    pub fn new(report: TickReport, evaluated_at: DateTime<Utc>) -> Self {
        Self {
            scanned: report.scanned,
            updated: report.updated,
            skipped: report.skipped,
            evaluated_at,
        }
    }
}

/// Response body for `GET /automation/status`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AutomationStatusResponse {
    /// Active schedule rules for the current local day.
    pub active_rule_count: usize,
    /// Total venues under automation.
    pub venue_count: usize,
    /// Most recent live-state write, if any venue exists.
    pub last_update_at: Option<DateTime<Utc>>,
}

impl From<AutomationStatus> for AutomationStatusResponse {
    fn from(status: AutomationStatus) -> Self {
        Self {
            active_rule_count: status.active_rule_count,
            venue_count: status.venue_count,
            last_update_at: status.last_update_at,
        }
    }
}
