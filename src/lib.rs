//! # pulse-gateway
//!
//! REST API and WebSocket gateway for venue live-state scheduling and
//! offer eligibility.
//!
//! The core of the service is temporal: a weekly vibe schedule is resolved
//! against the venue-local clock, a busyness level is simulated from
//! category-specific diurnal curves, and offers are gated by an absolute
//! time window plus a minimum-busyness threshold. Periodic automation ticks
//! drive the live state; requests read it and redeem against it.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── VenueService / OfferService / AutomationService (service/)
//!     ├── Vibe + Busyness + Eligibility engines (engine/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── VenueRegistry (domain/)
//!     │
//!     └── PostgreSQL mirror (ledger, counters, history)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
