//! Offer service: eligibility listing, engagement counters, and redemption.
//!
//! Redemption treats "check eligibility" + "record redemption" as a single
//! critical section under the owning venue's write lock: no other redemption
//! for the same offer can be evaluated against a stale busyness or window
//! snapshot, and the ledger append and counter bump land together.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    Busyness, EventBus, Offer, OfferId, OfferRedemption, OfferType, VenueEvent, VenueId,
    VenueRegistry,
};
use crate::engine::eligibility;
use crate::error::GatewayError;
use crate::persistence::PostgresPersistence;
use crate::persistence::models::RedemptionRow;

/// Default redemption source label when the caller provides none.
const DEFAULT_REDEMPTION_SOURCE: &str = "DEMO";

/// Engagement and conversion summary for one offer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OfferStats {
    /// Times the offer was shown.
    pub views: u64,
    /// Times the offer was tapped.
    pub clicks: u64,
    /// Successful redemptions.
    pub redemptions: u64,
    /// Redemptions per view, as a percentage rounded to two decimals.
    pub conversion_rate: f64,
}

/// Orchestration layer for all offer operations.
#[derive(Debug, Clone)]
pub struct OfferService {
    registry: Arc<VenueRegistry>,
    event_bus: EventBus,
    mirror: Option<PostgresPersistence>,
}

impl OfferService {
    /// Creates a new `OfferService`.
    #[must_use]
    pub fn new(
        registry: Arc<VenueRegistry>,
        event_bus: EventBus,
        mirror: Option<PostgresPersistence>,
    ) -> Self {
        Self {
            registry,
            event_bus,
            mirror,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Creates a new offer on a venue.
    ///
    /// The window precondition (`ends_at > starts_at`) is enforced here at
    /// write time; eligibility evaluation assumes stored windows are valid.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for an inverted window or
    /// [`GatewayError::VenueNotFound`] for a missing venue.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_offer(
        &self,
        venue_id: VenueId,
        title: String,
        offer_type: OfferType,
        min_busyness: Busyness,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        is_active: bool,
    ) -> Result<Offer, GatewayError> {
        let now = Utc::now();
        let offer = Offer::new(
            title,
            offer_type,
            min_busyness,
            starts_at,
            ends_at,
            is_active,
            now,
        )?;
        let offer_id = offer.id;

        let entry_lock = self.registry.get(venue_id).await?;
        let mut entry = entry_lock.write().await;
        entry.offers.insert(offer_id, offer.clone());
        drop(entry);

        self.registry.register_offer(offer_id, venue_id).await;

        let _ = self.event_bus.publish(VenueEvent::OfferCreated {
            venue_id,
            offer_id,
            title: offer.title.clone(),
            timestamp: now,
        });

        tracing::info!(%venue_id, %offer_id, "offer created");
        Ok(offer)
    }

    /// Returns all offers for a venue, newest window first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
    pub async fn list_offers(&self, venue_id: VenueId) -> Result<Vec<Offer>, GatewayError> {
        let entry_lock = self.registry.get(venue_id).await?;
        let entry = entry_lock.read().await;
        let mut offers: Vec<Offer> = entry.offers.values().cloned().collect();
        offers.sort_by(|a, b| b.starts_at.cmp(&a.starts_at));
        Ok(offers)
    }

    /// Returns the offers eligible for display and redemption at `now`,
    /// given the venue's current busyness, earliest window first.
    ///
    /// Fails closed: a venue that cannot be resolved yields an error, never
    /// an eligible list.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
    pub async fn eligible_offers(
        &self,
        venue_id: VenueId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Offer>, GatewayError> {
        let entry_lock = self.registry.get(venue_id).await?;
        let entry = entry_lock.read().await;
        let current = entry.live_state.busyness.level;
        let mut offers: Vec<Offer> = entry
            .offers
            .values()
            .filter(|o| eligibility::is_eligible(o, current, now))
            .cloned()
            .collect();
        offers.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(offers)
    }

    /// Returns one offer by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OfferNotFound`] if the offer does not exist.
    pub async fn get_offer(&self, offer_id: OfferId) -> Result<Offer, GatewayError> {
        let venue_id = self
            .registry
            .venue_for_offer(offer_id)
            .await
            .ok_or(GatewayError::OfferNotFound(*offer_id.as_uuid()))?;
        let entry_lock = self.registry.get(venue_id).await?;
        let entry = entry_lock.read().await;
        entry
            .offers
            .get(&offer_id)
            .cloned()
            .ok_or(GatewayError::OfferNotFound(*offer_id.as_uuid()))
    }

    /// Records one view. Views count engagement regardless of eligibility.
    ///
    /// Returns the new cumulative view count.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OfferNotFound`] if the offer does not exist.
    pub async fn record_view(&self, offer_id: OfferId) -> Result<u64, GatewayError> {
        let count = self
            .bump_counter(offer_id, |offer| {
                offer.view_count = offer.view_count.saturating_add(1);
                offer.view_count
            })
            .await?;
        if let Some(mirror) = self.mirror.clone() {
            tokio::spawn(async move {
                if let Err(e) = mirror.increment_view_count(*offer_id.as_uuid()).await {
                    tracing::warn!(%offer_id, error = %e, "view counter mirror write failed");
                }
            });
        }
        Ok(count)
    }

    /// Records one click. Same semantics as [`Self::record_view`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OfferNotFound`] if the offer does not exist.
    pub async fn record_click(&self, offer_id: OfferId) -> Result<u64, GatewayError> {
        let count = self
            .bump_counter(offer_id, |offer| {
                offer.click_count = offer.click_count.saturating_add(1);
                offer.click_count
            })
            .await?;
        if let Some(mirror) = self.mirror.clone() {
            tokio::spawn(async move {
                if let Err(e) = mirror.increment_click_count(*offer_id.as_uuid()).await {
                    tracing::warn!(%offer_id, error = %e, "click counter mirror write failed");
                }
            });
        }
        Ok(count)
    }

    /// Owner toggle for an offer's active flag.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OfferNotFound`] if the offer does not exist.
    pub async fn update_status(
        &self,
        offer_id: OfferId,
        is_active: bool,
    ) -> Result<Offer, GatewayError> {
        let venue_id = self
            .registry
            .venue_for_offer(offer_id)
            .await
            .ok_or(GatewayError::OfferNotFound(*offer_id.as_uuid()))?;
        let entry_lock = self.registry.get(venue_id).await?;
        let mut entry = entry_lock.write().await;
        let offer = entry
            .offers
            .get_mut(&offer_id)
            .ok_or(GatewayError::OfferNotFound(*offer_id.as_uuid()))?;
        offer.is_active = is_active;
        offer.updated_at = Utc::now();
        Ok(offer.clone())
    }

    /// Engagement summary for one offer.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OfferNotFound`] if the offer does not exist.
    pub async fn offer_stats(&self, offer_id: OfferId) -> Result<OfferStats, GatewayError> {
        let offer = self.get_offer(offer_id).await?;
        let conversion_rate = if offer.view_count > 0 {
            #[allow(clippy::cast_precision_loss)]
            let rate = offer.redeem_count as f64 / offer.view_count as f64 * 100.0;
            (rate * 100.0).round() / 100.0
        } else {
            0.0
        };
        Ok(OfferStats {
            views: offer.view_count,
            clicks: offer.click_count,
            redemptions: offer.redeem_count,
            conversion_rate,
        })
    }

    /// Redeems an offer at the instant `now`.
    ///
    /// The full eligibility check runs *at redemption time*, under the venue
    /// write lock — eligibility is never trusted from a prior read, since
    /// busyness may have changed between list and redeem. On success the
    /// ledger row and counter bump are applied together before the lock is
    /// released.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Ineligible`] with the typed reason when the
    /// offer cannot be redeemed; no state is mutated in that case.
    pub async fn redeem(
        &self,
        offer_id: OfferId,
        user_id: Option<uuid::Uuid>,
        source: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<OfferRedemption, GatewayError> {
        let venue_id = self
            .registry
            .venue_for_offer(offer_id)
            .await
            .ok_or(GatewayError::Ineligible(
                eligibility::EligibilityError::OfferNotFound,
            ))?;
        let entry_lock = self.registry.get(venue_id).await?;
        let mut entry = entry_lock.write().await;

        let current = entry.live_state.busyness.level;
        let offer = entry
            .offers
            .get_mut(&offer_id)
            .ok_or(GatewayError::Ineligible(
                eligibility::EligibilityError::OfferNotFound,
            ))?;

        eligibility::check(offer, current, now)?;

        offer.redeem_count = offer.redeem_count.saturating_add(1);
        offer.updated_at = now;
        let redeem_count = offer.redeem_count;

        let redemption = OfferRedemption {
            id: uuid::Uuid::new_v4(),
            offer_id,
            venue_id,
            user_id,
            source: source.unwrap_or_else(|| DEFAULT_REDEMPTION_SOURCE.to_string()),
            redeemed_at: now,
        };
        entry.redemptions.push(redemption.clone());
        drop(entry);

        let _ = self.event_bus.publish(VenueEvent::OfferRedeemed {
            venue_id,
            offer_id,
            redemption_id: redemption.id,
            redeem_count,
            timestamp: now,
        });

        if let Some(mirror) = self.mirror.clone() {
            let row = RedemptionRow {
                id: redemption.id,
                offer_id: *offer_id.as_uuid(),
                venue_id: *venue_id.as_uuid(),
                user_id: redemption.user_id,
                source: redemption.source.clone(),
                redeemed_at: redemption.redeemed_at,
            };
            tokio::spawn(async move {
                if let Err(e) = mirror.record_redemption(&row).await {
                    tracing::warn!(offer_id = %row.offer_id, error = %e, "redemption mirror write failed");
                }
            });
        }

        tracing::info!(%venue_id, %offer_id, redeem_count, "offer redeemed");
        Ok(redemption)
    }

    /// Returns a venue's redemption ledger, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
    pub async fn list_redemptions(
        &self,
        venue_id: VenueId,
    ) -> Result<Vec<OfferRedemption>, GatewayError> {
        let entry_lock = self.registry.get(venue_id).await?;
        let entry = entry_lock.read().await;
        Ok(entry.redemptions.clone())
    }

    /// Applies a counter mutation to one offer under its venue's write lock.
    async fn bump_counter<F>(&self, offer_id: OfferId, f: F) -> Result<u64, GatewayError>
    where
        F: FnOnce(&mut Offer) -> u64,
    {
        let venue_id = self
            .registry
            .venue_for_offer(offer_id)
            .await
            .ok_or(GatewayError::OfferNotFound(*offer_id.as_uuid()))?;
        let entry_lock = self.registry.get(venue_id).await?;
        let mut entry = entry_lock.write().await;
        let offer = entry
            .offers
            .get_mut(&offer_id)
            .ok_or(GatewayError::OfferNotFound(*offer_id.as_uuid()))?;
        offer.updated_at = Utc::now();
        Ok(f(offer))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{VenueCategory, VenueEntry};
    use crate::engine::eligibility::EligibilityError;
    use chrono::Duration;

    async fn make_fixture(busyness: Busyness) -> (OfferService, VenueId) {
        let registry = Arc::new(VenueRegistry::new());
        let event_bus = EventBus::new(1000);

        let mut entry = VenueEntry::new(VenueId::new(), "The Vault".to_string(), VenueCategory::Bar);
        let venue_id = entry.venue_id;
        let _ = entry.live_state.set_busyness(busyness, Utc::now());
        let _ = registry.insert(entry).await;

        (OfferService::new(registry, event_bus, None), venue_id)
    }

    async fn add_offer(
        service: &OfferService,
        venue_id: VenueId,
        min_busyness: Busyness,
        now: DateTime<Utc>,
    ) -> Offer {
        service
            .create_offer(
                venue_id,
                "half-price entry".to_string(),
                OfferType::EntryDeal,
                min_busyness,
                now - Duration::hours(1),
                now + Duration::hours(1),
                true,
            )
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("offer creation failed");
            })
    }

    #[tokio::test]
    async fn create_offer_rejects_inverted_window() {
        let (service, venue_id) = make_fixture(Busyness::Quiet).await;
        let now = Utc::now();
        let result = service
            .create_offer(
                venue_id,
                "bad".to_string(),
                OfferType::Bogo,
                Busyness::Quiet,
                now,
                now - Duration::hours(1),
                true,
            )
            .await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn eligible_offer_listed_and_redeemable() {
        // Venue BUSY, offer requires MODERATE, window covers now.
        let (service, venue_id) = make_fixture(Busyness::Busy).await;
        let now = Utc::now();
        let offer = add_offer(&service, venue_id, Busyness::Moderate, now).await;

        let eligible = service
            .eligible_offers(venue_id, now)
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("listing failed");
            });
        assert!(eligible.iter().any(|o| o.id == offer.id));

        let result = service.redeem(offer.id, None, None, now).await;
        assert!(result.is_ok());

        let stored = service.get_offer(offer.id).await.ok().unwrap_or_else(|| {
            panic!("offer missing");
        });
        assert_eq!(stored.redeem_count, 1);
    }

    #[tokio::test]
    async fn busyness_gate_rejects_listing_and_redeem() {
        // Venue QUIET, offer requires BUSY.
        let (service, venue_id) = make_fixture(Busyness::Quiet).await;
        let now = Utc::now();
        let offer = add_offer(&service, venue_id, Busyness::Busy, now).await;

        let eligible = service
            .eligible_offers(venue_id, now)
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("listing failed");
            });
        assert!(eligible.is_empty());

        let result = service.redeem(offer.id, None, None, now).await;
        assert!(matches!(
            result,
            Err(GatewayError::Ineligible(EligibilityError::BusynessNotMet))
        ));

        let stored = service.get_offer(offer.id).await.ok().unwrap_or_else(|| {
            panic!("offer missing");
        });
        assert_eq!(stored.redeem_count, 0);
        let ledger = service
            .list_redemptions(venue_id)
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("ledger read failed");
            });
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn redeem_unknown_offer_is_typed_not_found() {
        let (service, _venue_id) = make_fixture(Busyness::Busy).await;
        let result = service.redeem(OfferId::new(), None, None, Utc::now()).await;
        assert!(matches!(
            result,
            Err(GatewayError::Ineligible(EligibilityError::OfferNotFound))
        ));
    }

    #[tokio::test]
    async fn redeem_inactive_offer_rejected() {
        let (service, venue_id) = make_fixture(Busyness::Busy).await;
        let now = Utc::now();
        let offer = add_offer(&service, venue_id, Busyness::Quiet, now).await;
        let _ = service.update_status(offer.id, false).await;

        let result = service.redeem(offer.id, None, None, now).await;
        assert!(matches!(
            result,
            Err(GatewayError::Ineligible(EligibilityError::OfferInactive))
        ));
    }

    #[tokio::test]
    async fn redeem_outside_window_rejected() {
        let (service, venue_id) = make_fixture(Busyness::Busy).await;
        let now = Utc::now();
        let offer = add_offer(&service, venue_id, Busyness::Quiet, now).await;

        let late = offer.ends_at + Duration::seconds(1);
        let result = service.redeem(offer.id, None, None, late).await;
        assert!(matches!(
            result,
            Err(GatewayError::Ineligible(EligibilityError::OutsideWindow))
        ));
    }

    #[tokio::test]
    async fn concurrent_redemptions_count_exactly() {
        let (service, venue_id) = make_fixture(Busyness::Busy).await;
        let now = Utc::now();
        let offer = add_offer(&service, venue_id, Busyness::Quiet, now).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let service = service.clone();
            let offer_id = offer.id;
            handles.push(tokio::spawn(async move {
                service.redeem(offer_id, None, None, now).await
            }));
        }
        let mut ok = 0;
        for handle in handles {
            let Ok(result) = handle.await else {
                panic!("task panicked");
            };
            if result.is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 10);

        let stored = service.get_offer(offer.id).await.ok().unwrap_or_else(|| {
            panic!("offer missing");
        });
        assert_eq!(stored.redeem_count, 10);
        let ledger = service
            .list_redemptions(venue_id)
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("ledger read failed");
            });
        assert_eq!(ledger.len(), 10);
    }

    #[tokio::test]
    async fn view_and_click_count_regardless_of_eligibility() {
        // Offer requires BUSY, venue is QUIET; engagement still counts.
        let (service, venue_id) = make_fixture(Busyness::Quiet).await;
        let now = Utc::now();
        let offer = add_offer(&service, venue_id, Busyness::Busy, now).await;

        assert_eq!(service.record_view(offer.id).await.ok(), Some(1));
        assert_eq!(service.record_view(offer.id).await.ok(), Some(2));
        assert_eq!(service.record_click(offer.id).await.ok(), Some(1));

        let stats = service.offer_stats(offer.id).await.ok().unwrap_or_else(|| {
            panic!("stats failed");
        });
        assert_eq!(stats.views, 2);
        assert_eq!(stats.clicks, 1);
        assert_eq!(stats.redemptions, 0);
    }

    #[tokio::test]
    async fn conversion_rate_rounds_to_two_decimals() {
        let (service, venue_id) = make_fixture(Busyness::Busy).await;
        let now = Utc::now();
        let offer = add_offer(&service, venue_id, Busyness::Quiet, now).await;

        for _ in 0..3 {
            let _ = service.record_view(offer.id).await;
        }
        let _ = service.redeem(offer.id, None, None, now).await;

        let stats = service.offer_stats(offer.id).await.ok().unwrap_or_else(|| {
            panic!("stats failed");
        });
        // 1 redemption / 3 views = 33.33%.
        assert!((stats.conversion_rate - 33.33).abs() < 1e-9);
    }

    #[tokio::test]
    async fn redemption_carries_source_and_user() {
        let (service, venue_id) = make_fixture(Busyness::Busy).await;
        let now = Utc::now();
        let offer = add_offer(&service, venue_id, Busyness::Quiet, now).await;

        let user = uuid::Uuid::new_v4();
        let redemption = service
            .redeem(offer.id, Some(user), Some("APP".to_string()), now)
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("redeem failed");
            });
        assert_eq!(redemption.user_id, Some(user));
        assert_eq!(redemption.source, "APP");

        let defaulted = service
            .redeem(offer.id, None, None, now)
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("redeem failed");
            });
        assert_eq!(defaulted.source, DEFAULT_REDEMPTION_SOURCE);
    }
}
