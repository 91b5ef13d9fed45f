//! Service layer: orchestration over the registry, engine, and event bus.
//!
//! Services are stateless coordinators. Every mutation method follows the
//! pattern: acquire the venue lock → apply engine logic → update state →
//! emit events → mirror to persistence fire-and-forget → return result.

pub mod automation;
pub mod offer_service;
pub mod venue_service;

pub use automation::{AutomationService, AutomationStatus, ScenarioPreset, TickReport};
pub use offer_service::{OfferService, OfferStats};
pub use venue_service::VenueService;
