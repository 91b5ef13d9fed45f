//! Concurrent venue storage with per-venue fine-grained locking.
//!
//! [`VenueRegistry`] stores all venues in a `HashMap` where each entry is
//! individually protected by a [`tokio::sync::RwLock`]. This allows
//! concurrent reads on the same venue and concurrent writes on different
//! venues — a scheduler tick touching venue A never blocks a redemption on
//! venue B, and no lock is ever held across the full venue set.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::venue_entry::{VenueEntry, VenueSummary};
use super::{OfferId, VenueId};
use crate::error::GatewayError;

/// Central store for all venues plus a secondary offer-to-venue index.
///
/// # Concurrency
///
/// - Multiple tasks may read the same venue concurrently.
/// - Writes to different venues are concurrent.
/// - Writes to the same venue are serialized; redemption uses this to make
///   "check eligibility + record redemption" a single critical section.
#[derive(Debug)]
pub struct VenueRegistry {
    venues: RwLock<HashMap<VenueId, Arc<RwLock<VenueEntry>>>>,
    /// Offer id → owning venue, for id-only offer operations.
    offer_index: RwLock<HashMap<OfferId, VenueId>>,
}

impl VenueRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            venues: RwLock::new(HashMap::new()),
            offer_index: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new venue entry into the registry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if a venue with the same
    /// ID already exists (should never happen with UUID v4).
    pub async fn insert(&self, entry: VenueEntry) -> Result<VenueId, GatewayError> {
        let venue_id = entry.venue_id;
        let mut map = self.venues.write().await;
        if map.contains_key(&venue_id) {
            return Err(GatewayError::InvalidRequest(format!(
                "venue {venue_id} already exists"
            )));
        }
        map.insert(venue_id, Arc::new(RwLock::new(entry)));
        Ok(venue_id)
    }

    /// Returns a shared reference to the venue entry behind its per-venue lock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if no venue with the given ID
    /// exists.
    pub async fn get(&self, venue_id: VenueId) -> Result<Arc<RwLock<VenueEntry>>, GatewayError> {
        let map = self.venues.read().await;
        map.get(&venue_id)
            .cloned()
            .ok_or(GatewayError::VenueNotFound(*venue_id.as_uuid()))
    }

    /// Removes a venue, its schedule, offers, and ledger. Index entries for
    /// the venue's offers are dropped as well.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if no venue with the given ID
    /// exists.
    pub async fn remove(&self, venue_id: VenueId) -> Result<(), GatewayError> {
        let arc = {
            let mut map = self.venues.write().await;
            map.remove(&venue_id)
                .ok_or(GatewayError::VenueNotFound(*venue_id.as_uuid()))?
        };
        let entry = arc.read().await;
        let mut index = self.offer_index.write().await;
        for offer_id in entry.offers.keys() {
            index.remove(offer_id);
        }
        Ok(())
    }

    /// Records an offer as belonging to a venue in the secondary index.
    pub async fn register_offer(&self, offer_id: OfferId, venue_id: VenueId) {
        self.offer_index.write().await.insert(offer_id, venue_id);
    }

    /// Resolves the venue owning an offer, if the offer is known.
    pub async fn venue_for_offer(&self, offer_id: OfferId) -> Option<VenueId> {
        self.offer_index.read().await.get(&offer_id).copied()
    }

    /// Returns summaries of all venues.
    pub async fn list(&self) -> Vec<VenueSummary> {
        let map = self.venues.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            summaries.push(VenueSummary::from(&*entry));
        }
        summaries
    }

    /// Returns a snapshot of all venue IDs.
    ///
    /// Tick loops iterate over this snapshot and lock venues one at a time,
    /// so a venue removed mid-tick is simply skipped.
    pub async fn venue_ids(&self) -> Vec<VenueId> {
        self.venues.read().await.keys().copied().collect()
    }

    /// Returns the number of venues in the registry.
    pub async fn len(&self) -> usize {
        self.venues.read().await.len()
    }

    /// Returns `true` if the registry contains no venues.
    pub async fn is_empty(&self) -> bool {
        self.venues.read().await.is_empty()
    }
}

impl Default for VenueRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::venue_entry::VenueCategory;

    fn make_entry() -> VenueEntry {
        VenueEntry::new(VenueId::new(), "The Basement".to_string(), VenueCategory::Bar)
    }

    #[tokio::test]
    async fn insert_and_get() {
        let registry = VenueRegistry::new();
        let entry = make_entry();
        let id = entry.venue_id;

        let result = registry.insert(entry).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap_or_default(), id);

        let fetched = registry.get(id).await;
        assert!(fetched.is_ok());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let registry = VenueRegistry::new();
        let result = registry.get(VenueId::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn remove_drops_venue_and_offer_index() {
        let registry = VenueRegistry::new();
        let mut entry = make_entry();
        let id = entry.venue_id;
        let offer_id = OfferId::new();
        // Simulate an offer already attached to the entry.
        let now = chrono::Utc::now();
        let offer = crate::domain::offer::Offer::new(
            "test".to_string(),
            crate::domain::offer::OfferType::FreeItem,
            crate::domain::live_state::Busyness::Quiet,
            now,
            now + chrono::Duration::hours(1),
            true,
            now,
        )
        .ok()
        .unwrap_or_else(|| panic!("valid offer"));
        let offer_id_real = offer.id;
        entry.offers.insert(offer_id_real, offer);

        let _ = registry.insert(entry).await;
        registry.register_offer(offer_id_real, id).await;
        registry.register_offer(offer_id, id).await;

        assert!(registry.remove(id).await.is_ok());
        assert!(registry.get(id).await.is_err());
        assert!(registry.venue_for_offer(offer_id_real).await.is_none());
    }

    #[tokio::test]
    async fn remove_nonexistent_returns_error() {
        let registry = VenueRegistry::new();
        let result = registry.remove(VenueId::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_returns_all() {
        let registry = VenueRegistry::new();
        let _ = registry.insert(make_entry()).await;
        let _ = registry.insert(make_entry()).await;

        let list = registry.list().await;
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn offer_index_resolves_owner() {
        let registry = VenueRegistry::new();
        let entry = make_entry();
        let venue_id = entry.venue_id;
        let _ = registry.insert(entry).await;

        let offer_id = OfferId::new();
        registry.register_offer(offer_id, venue_id).await;
        assert_eq!(registry.venue_for_offer(offer_id).await, Some(venue_id));
        assert!(registry.venue_for_offer(OfferId::new()).await.is_none());
    }

    #[test]
    fn len_and_is_empty() {
        tokio_test::block_on(async {
            let registry = VenueRegistry::new();
            assert!(registry.is_empty().await);
            assert_eq!(registry.len().await, 0);

            let _ = registry.insert(make_entry()).await;
            assert!(!registry.is_empty().await);
            assert_eq!(registry.len().await, 1);
        });
    }
}
