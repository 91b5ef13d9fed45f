//! Venue-related DTOs for create, get, list, and live-state operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::{Busyness, VenueCategory, VenueId, VenueLiveState, VenueSummary, Vibe};

/// Request body for `POST /venues`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVenueRequest {
    /// Display name (max 120 chars).
    pub name: String,
    /// Venue category; selects the busyness simulation curve.
    pub category: VenueCategory,
}

/// Response body for `POST /venues` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateVenueResponse {
    /// Unique venue identifier.
    pub venue_id: VenueId,
    /// Name echoed from request.
    pub name: String,
    /// Category echoed from request.
    pub category: VenueCategory,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Live state as exposed on the wire.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct LiveStateDto {
    /// Current busyness level.
    pub busyness: Busyness,
    /// Current vibe label.
    pub vibe: Vibe,
    /// When the busyness level last changed.
    pub busyness_updated_at: DateTime<Utc>,
    /// When the vibe last changed.
    pub vibe_updated_at: DateTime<Utc>,
    /// Most recent live-state write of either kind.
    pub updated_at: DateTime<Utc>,
}

impl From<VenueLiveState> for LiveStateDto {
    fn from(state: VenueLiveState) -> Self {
        Self {
            busyness: state.busyness.level,
            vibe: state.vibe.value,
            busyness_updated_at: state.busyness.updated_at,
            vibe_updated_at: state.vibe.updated_at,
            updated_at: state.updated_at,
        }
    }
}

/// Venue summary for list and detail responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct VenueSummaryDto {
    /// Venue identifier.
    pub venue_id: VenueId,
    /// Display name.
    pub name: String,
    /// Category.
    pub category: VenueCategory,
    /// Current live state.
    pub live_state: LiveStateDto,
    /// Number of schedule rules.
    pub rule_count: usize,
    /// Number of offers.
    pub offer_count: usize,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<VenueSummary> for VenueSummaryDto {
    fn from(summary: VenueSummary) -> Self {
        Self {
            venue_id: summary.venue_id,
            name: summary.name,
            category: summary.category,
            live_state: LiveStateDto::from(summary.live_state),
            rule_count: summary.rule_count,
            offer_count: summary.offer_count,
            created_at: summary.created_at,
        }
    }
}

/// Paginated list response for `GET /venues`.
#[derive(Debug, Serialize, ToSchema)]
pub struct VenueListResponse {
    /// Venue summaries.
    pub data: Vec<VenueSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Request body for `PUT /venues/:id/live-state` (manual override).
///
/// Absent fields keep both their value and timestamp.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OverrideLiveStateRequest {
    /// New busyness level, if overriding.
    #[serde(default)]
    pub busyness: Option<Busyness>,
    /// New vibe, if overriding.
    #[serde(default)]
    pub vibe: Option<Vibe>,
}
