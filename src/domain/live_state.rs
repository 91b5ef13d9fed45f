//! Venue live state: busyness level and vibe label with per-field timestamps.
//!
//! [`Busyness`] is a strictly ordered scale — QUIET < MODERATE < BUSY — with
//! an explicit rank table so threshold comparisons are a compile-time-checked
//! concept rather than an array-index convention. [`VenueLiveState`] groups
//! each value with the timestamp of its last change so the two signals can be
//! updated independently but never half-written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Crowd-level tier of a venue, ordered from least to most busy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Busyness {
    /// Few or no patrons.
    Quiet,
    /// Steady crowd, room to spare.
    Moderate,
    /// At or near capacity.
    Busy,
}

impl Busyness {
    /// Numeric rank used for threshold comparisons: QUIET=1, MODERATE=2, BUSY=3.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Quiet => 1,
            Self::Moderate => 2,
            Self::Busy => 3,
        }
    }

    /// Returns `true` when this level satisfies a minimum-busyness
    /// requirement, i.e. `self` is at least as busy as `required`.
    #[must_use]
    pub const fn meets(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }

    /// Wire-format string (`"QUIET"`, `"MODERATE"`, `"BUSY"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiet => "QUIET",
            Self::Moderate => "MODERATE",
            Self::Busy => "BUSY",
        }
    }
}

/// Atmosphere label of a venue, driven by the weekly vibe schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vibe {
    /// Relaxed, low-key.
    Chill,
    /// Conversational, mingling crowd.
    Social,
    /// High energy, dancing.
    Party,
    /// Intimate, date-night.
    Romantic,
    /// After-hours crowd.
    LateNight,
}

impl Vibe {
    /// Wire-format string (`"CHILL"`, …, `"LATE_NIGHT"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chill => "CHILL",
            Self::Social => "SOCIAL",
            Self::Party => "PARTY",
            Self::Romantic => "ROMANTIC",
            Self::LateNight => "LATE_NIGHT",
        }
    }
}

/// Busyness level together with the instant it last changed.
///
/// Updated only as a pair — a level write always refreshes the timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusynessState {
    /// Current crowd-level tier.
    pub level: Busyness,
    /// When `level` last changed.
    pub updated_at: DateTime<Utc>,
}

/// Vibe label together with the instant it last changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibeState {
    /// Current atmosphere label.
    pub value: Vibe,
    /// When `value` last changed.
    pub updated_at: DateTime<Utc>,
}

/// Live state of a single venue: exactly one per venue, created with the
/// venue and removed with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueLiveState {
    /// Busyness pair.
    pub busyness: BusynessState,
    /// Vibe pair.
    pub vibe: VibeState,
    /// Timestamp of the most recent write to either pair.
    pub updated_at: DateTime<Utc>,
}

impl VenueLiveState {
    /// Initial live state at venue creation: QUIET / CHILL.
    #[must_use]
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            busyness: BusynessState {
                level: Busyness::Quiet,
                updated_at: now,
            },
            vibe: VibeState {
                value: Vibe::Chill,
                updated_at: now,
            },
            updated_at: now,
        }
    }

    /// Replaces the busyness pair, returning the previous level.
    pub fn set_busyness(&mut self, level: Busyness, now: DateTime<Utc>) -> Busyness {
        let old = self.busyness.level;
        self.busyness = BusynessState {
            level,
            updated_at: now,
        };
        self.updated_at = now;
        old
    }

    /// Replaces the vibe pair, returning the previous value.
    pub fn set_vibe(&mut self, value: Vibe, now: DateTime<Utc>) -> Vibe {
        let old = self.vibe.value;
        self.vibe = VibeState {
            value,
            updated_at: now,
        };
        self.updated_at = now;
        old
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn busyness_rank_is_strictly_increasing() {
        assert!(Busyness::Quiet.rank() < Busyness::Moderate.rank());
        assert!(Busyness::Moderate.rank() < Busyness::Busy.rank());
    }

    #[test]
    fn meets_is_monotonic() {
        // Anything meets QUIET; only BUSY meets BUSY.
        for level in [Busyness::Quiet, Busyness::Moderate, Busyness::Busy] {
            assert!(level.meets(Busyness::Quiet));
        }
        assert!(!Busyness::Quiet.meets(Busyness::Busy));
        assert!(!Busyness::Moderate.meets(Busyness::Busy));
        assert!(Busyness::Busy.meets(Busyness::Busy));
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&Vibe::LateNight).unwrap_or_default();
        assert_eq!(json, "\"LATE_NIGHT\"");
        let parsed: Busyness = serde_json::from_str("\"MODERATE\"").ok().unwrap_or_else(|| {
            panic!("deserialization failed");
        });
        assert_eq!(parsed, Busyness::Moderate);
    }

    #[test]
    fn set_busyness_updates_pair_and_aggregate() {
        let t0 = Utc::now();
        let mut state = VenueLiveState::initial(t0);
        let t1 = t0 + chrono::Duration::minutes(5);

        let old = state.set_busyness(Busyness::Busy, t1);
        assert_eq!(old, Busyness::Quiet);
        assert_eq!(state.busyness.level, Busyness::Busy);
        assert_eq!(state.busyness.updated_at, t1);
        assert_eq!(state.updated_at, t1);
        // Vibe pair untouched.
        assert_eq!(state.vibe.updated_at, t0);
    }

    #[test]
    fn set_vibe_leaves_busyness_pair_untouched() {
        let t0 = Utc::now();
        let mut state = VenueLiveState::initial(t0);
        let t1 = t0 + chrono::Duration::minutes(5);

        let old = state.set_vibe(Vibe::Party, t1);
        assert_eq!(old, Vibe::Chill);
        assert_eq!(state.vibe.value, Vibe::Party);
        assert_eq!(state.vibe.updated_at, t1);
        assert_eq!(state.busyness.updated_at, t0);
    }
}
