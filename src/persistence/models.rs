//! Database models for the redemption ledger and live-state history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A redemption ledger row from the `offer_redemptions` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionRow {
    /// Ledger row ID (client-generated UUID, same as the in-memory record).
    pub id: Uuid,
    /// Redeemed offer.
    pub offer_id: Uuid,
    /// Venue the offer belongs to.
    pub venue_id: Uuid,
    /// Redeeming user, when known.
    pub user_id: Option<Uuid>,
    /// Origin label (e.g. `"DEMO"`, `"APP"`).
    pub source: String,
    /// Redemption timestamp.
    pub redeemed_at: DateTime<Utc>,
}

/// A live-state change row from the `live_state_history` table.
///
/// One row per applied change, so the table doubles as an audit trail for
/// tick and override activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveStateRow {
    /// Auto-increment row ID.
    pub id: i64,
    /// Venue the state belongs to.
    pub venue_id: Uuid,
    /// Busyness level as its wire string (`"QUIET"`, …).
    pub busyness: String,
    /// Vibe as its wire string (`"CHILL"`, …).
    pub vibe: String,
    /// When the busyness pair last changed.
    pub busyness_updated_at: DateTime<Utc>,
    /// When the vibe pair last changed.
    pub vibe_updated_at: DateTime<Utc>,
    /// Server-side insertion timestamp.
    pub recorded_at: DateTime<Utc>,
}
