//! Domain layer: core types, venue registry, and event system.
//!
//! This module contains the server-side data model: venue/offer/rule
//! identity, live state with its ranked busyness scale, weekly schedule
//! rules, offers and the redemption ledger, the venue registry for
//! concurrent storage, and the event bus for broadcasting state changes.

pub mod event_bus;
pub mod ids;
pub mod live_state;
pub mod offer;
pub mod schedule;
pub mod venue_entry;
pub mod venue_event;
pub mod venue_registry;

pub use event_bus::EventBus;
pub use ids::{OfferId, RuleId, VenueId};
pub use live_state::{Busyness, BusynessState, VenueLiveState, Vibe, VibeState};
pub use offer::{Offer, OfferRedemption, OfferType};
pub use schedule::ScheduleRule;
pub use venue_entry::{VenueCategory, VenueEntry, VenueSummary};
pub use venue_event::{ChangeOrigin, VenueEvent};
pub use venue_registry::VenueRegistry;
