//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::{AutomationService, OfferService, VenueService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Venue directory, schedule, and live-state operations.
    pub venue_service: Arc<VenueService>,
    /// Offer eligibility, counters, and redemption.
    pub offer_service: Arc<OfferService>,
    /// Periodic ticks, scenario presets, and automation status.
    pub automation_service: Arc<AutomationService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
