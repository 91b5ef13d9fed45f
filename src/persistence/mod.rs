//! Persistence layer: PostgreSQL redemption ledger and live-state history.
//!
//! The in-memory registry is the source of truth for live data; PostgreSQL
//! is the durable mirror for the append-only redemption ledger, engagement
//! counters, and live-state change history. Services write to the mirror
//! fire-and-forget: a mirror failure is logged and never fails the request
//! or tick that produced it.

pub mod models;
pub mod postgres;

pub use postgres::PostgresPersistence;
