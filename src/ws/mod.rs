//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams venue events (vibe changes,
//! busyness changes, offer redemptions) to subscribed clients. This is the
//! delivery side of the fire-and-forget notification seam: a slow or absent
//! client never affects the writes that produced the events.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
