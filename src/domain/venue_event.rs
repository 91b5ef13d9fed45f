//! Domain events reflecting venue state mutations.
//!
//! Every successful write emits a [`VenueEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers; this
//! is the fire-and-forget notification seam — a failed or absent delivery
//! never fails the write that produced the event.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::live_state::{Busyness, Vibe};
use super::{OfferId, VenueId};

/// What caused a live-state change.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    /// A periodic automation tick.
    AutomationTick,
    /// A bulk scenario preset.
    ScenarioPreset,
    /// The manual override endpoint.
    ManualOverride,
}

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum VenueEvent {
    /// Emitted when a new venue is created.
    VenueCreated {
        /// Venue identifier.
        venue_id: VenueId,
        /// Venue display name.
        name: String,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a venue is removed.
    VenueRemoved {
        /// Venue identifier.
        venue_id: VenueId,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a venue's vibe changes.
    VibeChanged {
        /// Venue identifier.
        venue_id: VenueId,
        /// Vibe before the change.
        old_vibe: Vibe,
        /// Vibe after the change.
        new_vibe: Vibe,
        /// What drove the change.
        origin: ChangeOrigin,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a venue's busyness level changes.
    BusynessChanged {
        /// Venue identifier.
        venue_id: VenueId,
        /// Level before the change.
        old_level: Busyness,
        /// Level after the change.
        new_level: Busyness,
        /// What drove the change.
        origin: ChangeOrigin,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when an offer is created.
    OfferCreated {
        /// Owning venue.
        venue_id: VenueId,
        /// Offer identifier.
        offer_id: OfferId,
        /// Offer title.
        title: String,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a successful redemption.
    OfferRedeemed {
        /// Owning venue.
        venue_id: VenueId,
        /// Redeemed offer.
        offer_id: OfferId,
        /// Ledger row id.
        redemption_id: uuid::Uuid,
        /// Cumulative redemption count after this one.
        redeem_count: u64,
        /// Redemption timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a bulk scenario preset is applied.
    ScenarioApplied {
        /// Venue the preset touched (one event per venue).
        venue_id: VenueId,
        /// Preset name (`"ALL_BUSY"`, `"ALL_QUIET"`, `"VIBE_SHIFT"`).
        preset: String,
        /// Application timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl VenueEvent {
    /// Returns the venue ID associated with this event.
    #[must_use]
    pub fn venue_id(&self) -> VenueId {
        match self {
            Self::VenueCreated { venue_id, .. }
            | Self::VenueRemoved { venue_id, .. }
            | Self::VibeChanged { venue_id, .. }
            | Self::BusynessChanged { venue_id, .. }
            | Self::OfferCreated { venue_id, .. }
            | Self::OfferRedeemed { venue_id, .. }
            | Self::ScenarioApplied { venue_id, .. } => *venue_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::VenueCreated { .. } => "venue_created",
            Self::VenueRemoved { .. } => "venue_removed",
            Self::VibeChanged { .. } => "vibe_changed",
            Self::BusynessChanged { .. } => "busyness_changed",
            Self::OfferCreated { .. } => "offer_created",
            Self::OfferRedeemed { .. } => "offer_redeemed",
            Self::ScenarioApplied { .. } => "scenario_applied",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn vibe_changed_event_type() {
        let event = VenueEvent::VibeChanged {
            venue_id: VenueId::new(),
            old_vibe: Vibe::Chill,
            new_vibe: Vibe::Party,
            origin: ChangeOrigin::AutomationTick,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "vibe_changed");
    }

    #[test]
    fn busyness_changed_serializes() {
        let event = VenueEvent::BusynessChanged {
            venue_id: VenueId::new(),
            old_level: Busyness::Quiet,
            new_level: Busyness::Busy,
            origin: ChangeOrigin::ScenarioPreset,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event);
        assert!(json.is_ok());
        let json_str = json.unwrap_or_default();
        assert!(json_str.contains("busyness_changed"));
        assert!(json_str.contains("BUSY"));
    }

    #[test]
    fn venue_id_accessor() {
        let id = VenueId::new();
        let event = VenueEvent::VenueRemoved {
            venue_id: id,
            timestamp: Utc::now(),
        };
        assert_eq!(event.venue_id(), id);
    }
}
