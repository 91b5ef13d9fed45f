//! Offer-related DTOs: create, list, redeem, stats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Busyness, Offer, OfferId, OfferRedemption, OfferType, VenueId};
use crate::service::OfferStats;

/// Request body for `POST /venues/:id/offers`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOfferRequest {
    /// Short display title (max 160 chars).
    pub title: String,
    /// Promotion kind.
    pub offer_type: OfferType,
    /// Minimum busyness for eligibility. Defaults to QUIET (always shown).
    #[serde(default = "default_min_busyness")]
    pub min_busyness: Busyness,
    /// Start of the availability window (inclusive).
    pub starts_at: DateTime<Utc>,
    /// End of the availability window (inclusive). Must be after `starts_at`.
    pub ends_at: DateTime<Utc>,
    /// Whether the offer starts active. Defaults to true.
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_min_busyness() -> Busyness {
    Busyness::Quiet
}

fn default_is_active() -> bool {
    true
}

/// Offer as exposed on the wire.
#[derive(Debug, Serialize, ToSchema)]
pub struct OfferDto {
    /// Offer identifier.
    pub offer_id: OfferId,
    /// Display title.
    pub title: String,
    /// Promotion kind.
    pub offer_type: OfferType,
    /// Minimum busyness for eligibility.
    pub min_busyness: Busyness,
    /// Window start (inclusive).
    pub starts_at: DateTime<Utc>,
    /// Window end (inclusive).
    pub ends_at: DateTime<Utc>,
    /// Active flag.
    pub is_active: bool,
    /// Cumulative views.
    pub view_count: u64,
    /// Cumulative clicks.
    pub click_count: u64,
    /// Cumulative redemptions.
    pub redeem_count: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Offer> for OfferDto {
    fn from(offer: Offer) -> Self {
        Self {
            offer_id: offer.id,
            title: offer.title,
            offer_type: offer.offer_type,
            min_busyness: offer.min_busyness,
            starts_at: offer.starts_at,
            ends_at: offer.ends_at,
            is_active: offer.is_active,
            view_count: offer.view_count,
            click_count: offer.click_count,
            redeem_count: offer.redeem_count,
            created_at: offer.created_at,
        }
    }
}

/// Request body for `PATCH /offers/:id/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOfferStatusRequest {
    /// New active flag.
    pub is_active: bool,
}

/// Request body for `POST /offers/:id/redeem`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemOfferRequest {
    /// Redeeming user, when known.
    #[serde(default)]
    pub user_id: Option<uuid::Uuid>,
    /// Origin label (e.g. `"DEMO"`, `"APP"`). Defaults server-side.
    #[serde(default)]
    pub source: Option<String>,
}

/// Response body for a successful redemption.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedemptionResponse {
    /// Ledger row identifier.
    pub redemption_id: uuid::Uuid,
    /// Redeemed offer.
    pub offer_id: OfferId,
    /// Owning venue.
    pub venue_id: VenueId,
    /// Origin label.
    pub source: String,
    /// Redemption timestamp.
    pub redeemed_at: DateTime<Utc>,
}

impl From<OfferRedemption> for RedemptionResponse {
    fn from(redemption: OfferRedemption) -> Self {
        Self {
            redemption_id: redemption.id,
            offer_id: redemption.offer_id,
            venue_id: redemption.venue_id,
            source: redemption.source,
            redeemed_at: redemption.redeemed_at,
        }
    }
}

/// Response body for `GET /offers/:id/stats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct OfferStatsResponse {
    /// Cumulative views.
    pub views: u64,
    /// Cumulative clicks.
    pub clicks: u64,
    /// Cumulative redemptions.
    pub redemptions: u64,
    /// Redemptions per view, as a percentage.
    pub conversion_rate: f64,
}

impl From<OfferStats> for OfferStatsResponse {
    fn from(stats: OfferStats) -> Self {
        Self {
            views: stats.views,
            clicks: stats.clicks,
            redemptions: stats.redemptions,
            conversion_rate: stats.conversion_rate,
        }
    }
}
