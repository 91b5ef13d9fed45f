//! Promotional offers and the append-only redemption ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::live_state::Busyness;
use super::{OfferId, VenueId};
use crate::error::GatewayError;

/// Kind of promotion an offer represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferType {
    /// Percentage discount.
    PercentOff,
    /// Buy one get one.
    Bogo,
    /// A free item with purchase.
    FreeItem,
    /// Time-boxed drink pricing.
    HappyHour,
    /// Reduced or waived entry.
    EntryDeal,
}

/// A venue promotion with an absolute availability window and a
/// minimum-busyness requirement.
///
/// Counters are cumulative and only ever incremented; the engine never
/// deletes offers. All counter mutation happens under the owning venue's
/// entry write lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Offer identifier.
    pub id: OfferId,
    /// Short display title.
    pub title: String,
    /// Promotion kind.
    pub offer_type: OfferType,
    /// The venue must be at least this busy for the offer to be eligible.
    pub min_busyness: Busyness,
    /// Start of the availability window (inclusive).
    pub starts_at: DateTime<Utc>,
    /// End of the availability window (inclusive).
    pub ends_at: DateTime<Utc>,
    /// Owner toggle; inactive offers are never eligible.
    pub is_active: bool,
    /// Times the offer was shown.
    pub view_count: u64,
    /// Times the offer was tapped.
    pub click_count: u64,
    /// Successful redemptions.
    pub redeem_count: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp (status toggles and counter bumps).
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Creates a validated offer with zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] when `ends_at <= starts_at`.
    /// This is a hard write-time precondition; eligibility evaluation
    /// assumes every stored window is well-formed.
    pub fn new(
        title: String,
        offer_type: OfferType,
        min_busyness: Busyness,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, GatewayError> {
        if ends_at <= starts_at {
            return Err(GatewayError::InvalidRequest(
                "offer window must end after it starts".to_string(),
            ));
        }
        Ok(Self {
            id: OfferId::new(),
            title,
            offer_type,
            min_busyness,
            starts_at,
            ends_at,
            is_active,
            view_count: 0,
            click_count: 0,
            redeem_count: 0,
            created_at: now,
            updated_at: now,
        })
    }
}

/// One successful redemption. Append-only: never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRedemption {
    /// Ledger row identifier.
    pub id: uuid::Uuid,
    /// The redeemed offer.
    pub offer_id: OfferId,
    /// The venue the offer belongs to.
    pub venue_id: VenueId,
    /// Redeeming user, when known.
    pub user_id: Option<uuid::Uuid>,
    /// Origin label (e.g. `"DEMO"`, `"APP"`).
    pub source: String,
    /// Instant the redemption was recorded.
    pub redeemed_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_inverted_window() {
        let now = Utc::now();
        let result = Offer::new(
            "2-for-1 cocktails".to_string(),
            OfferType::Bogo,
            Busyness::Quiet,
            now,
            now - chrono::Duration::hours(1),
            true,
            now,
        );
        assert!(result.is_err());
    }

    #[test]
    fn new_rejects_zero_length_window() {
        let now = Utc::now();
        let result = Offer::new(
            "flash deal".to_string(),
            OfferType::PercentOff,
            Busyness::Quiet,
            now,
            now,
            true,
            now,
        );
        assert!(result.is_err());
    }

    #[test]
    fn new_offer_has_zeroed_counters() {
        let now = Utc::now();
        let offer = Offer::new(
            "happy hour".to_string(),
            OfferType::HappyHour,
            Busyness::Moderate,
            now,
            now + chrono::Duration::hours(4),
            true,
            now,
        )
        .ok()
        .unwrap_or_else(|| {
            panic!("valid offer");
        });
        assert_eq!(offer.view_count, 0);
        assert_eq!(offer.click_count, 0);
        assert_eq!(offer.redeem_count, 0);
        assert!(offer.is_active);
    }
}
