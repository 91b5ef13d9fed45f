//! Venue entry combining directory data with its owned live stores.
//!
//! Each venue in the registry is stored as a [`VenueEntry`]: directory
//! fields (name, category), the single live-state record, the weekly vibe
//! schedule, the offer set, and the append-only redemption ledger. The
//! stores are composed into the entry so they share the venue's lock and
//! cascade with venue removal.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::live_state::VenueLiveState;
use super::offer::{Offer, OfferRedemption};
use super::schedule::ScheduleRule;
use super::{OfferId, VenueId};

/// Venue category driving the busyness simulation curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueCategory {
    /// Cocktail / drinks bar.
    Bar,
    /// Nightclub.
    Club,
    /// Restaurant.
    Restaurant,
    /// Casino. No dedicated diurnal curve; simulation falls back to MODERATE.
    Casino,
}

impl VenueCategory {
    /// Wire-format string (`"BAR"`, `"CLUB"`, …).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "BAR",
            Self::Club => "CLUB",
            Self::Restaurant => "RESTAURANT",
            Self::Casino => "CASINO",
        }
    }
}

/// Aggregate for a single venue and everything it owns.
#[derive(Debug)]
pub struct VenueEntry {
    /// Unique venue identifier (immutable after creation).
    pub venue_id: VenueId,

    /// Display name.
    pub name: String,

    /// Category; selects the busyness simulation curve.
    pub category: VenueCategory,

    /// The single live-state record. Mutated by automation ticks, scenario
    /// presets, and the manual override path.
    pub live_state: VenueLiveState,

    /// Weekly recurring vibe windows. Owner-edited, never auto-mutated.
    pub schedule: Vec<ScheduleRule>,

    /// Offers owned by this venue.
    pub offers: HashMap<OfferId, Offer>,

    /// Append-only redemption ledger.
    pub redemptions: Vec<OfferRedemption>,

    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
}

impl VenueEntry {
    /// Creates a new entry with default live state and empty stores.
    #[must_use]
    pub fn new(venue_id: VenueId, name: String, category: VenueCategory) -> Self {
        let now = Utc::now();
        Self {
            venue_id,
            name,
            category,
            live_state: VenueLiveState::initial(now),
            schedule: Vec::new(),
            offers: HashMap::new(),
            redemptions: Vec::new(),
            created_at: now,
        }
    }
}

/// Lightweight venue projection for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct VenueSummary {
    /// Venue identifier.
    pub venue_id: VenueId,
    /// Display name.
    pub name: String,
    /// Category.
    pub category: VenueCategory,
    /// Current live state.
    pub live_state: VenueLiveState,
    /// Number of schedule rules (active and inactive).
    pub rule_count: usize,
    /// Number of offers.
    pub offer_count: usize,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&VenueEntry> for VenueSummary {
    fn from(entry: &VenueEntry) -> Self {
        Self {
            venue_id: entry.venue_id,
            name: entry.name.clone(),
            category: entry.category,
            live_state: entry.live_state,
            rule_count: entry.schedule.len(),
            offer_count: entry.offers.len(),
            created_at: entry.created_at,
        }
    }
}
