//! Automation scheduler: periodic vibe and busyness re-evaluation.
//!
//! Two independent ticks drive the live-state store: the vibe tick applies
//! the weekly schedule and the busyness tick applies the category curves.
//! The tick bodies are plain async functions taking an explicit `now`, free
//! of any scheduling dependency, so tests call them directly with pinned
//! instants; [`AutomationService::spawn`] wraps them in
//! [`tokio::time::interval`] loops for production.
//!
//! Each venue is an independent unit of work: a venue that disappears or
//! fails mid-tick is logged and skipped, never aborting the rest, and no
//! lock is held across the full venue set.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::domain::{
    Busyness, ChangeOrigin, EventBus, VenueEvent, VenueId, VenueLiveState, VenueRegistry, Vibe,
};
use crate::engine::busyness::simulate_busyness;
use crate::engine::vibe::{LocalMoment, resolve_current_vibe};
use crate::error::GatewayError;
use crate::persistence::PostgresPersistence;

/// Outcome of one tick across all venues.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TickReport {
    /// Venues examined.
    pub scanned: usize,
    /// Venues whose live state changed.
    pub updated: usize,
    /// Venues skipped (removed mid-tick).
    pub skipped: usize,
}

/// One-shot bulk presets bypassing the schedule entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioPreset {
    /// Every venue BUSY / PARTY.
    AllBusy,
    /// Every venue back to QUIET / CHILL.
    AllQuiet,
    /// Toggle each venue's vibe between CHILL and PARTY.
    VibeShift,
}

impl ScenarioPreset {
    /// Wire-format name (`"ALL_BUSY"`, `"ALL_QUIET"`, `"VIBE_SHIFT"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllBusy => "ALL_BUSY",
            Self::AllQuiet => "ALL_QUIET",
            Self::VibeShift => "VIBE_SHIFT",
        }
    }
}

impl FromStr for ScenarioPreset {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL_BUSY" => Ok(Self::AllBusy),
            "ALL_QUIET" => Ok(Self::AllQuiet),
            "VIBE_SHIFT" => Ok(Self::VibeShift),
            other => Err(GatewayError::InvalidRequest(format!(
                "unknown scenario preset: {other}"
            ))),
        }
    }
}

/// Read-only automation observability snapshot.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AutomationStatus {
    /// Active schedule rules whose day-of-week is the current local day.
    pub active_rule_count: usize,
    /// Total venues under automation.
    pub venue_count: usize,
    /// Most recent live-state write across all venues, if any venue exists.
    pub last_update_at: Option<DateTime<Utc>>,
}

/// Periodic driver for live-state re-evaluation.
#[derive(Debug, Clone)]
pub struct AutomationService {
    registry: Arc<VenueRegistry>,
    event_bus: EventBus,
    local_offset: FixedOffset,
    mirror: Option<PostgresPersistence>,
}

impl AutomationService {
    /// Creates a new `AutomationService`.
    #[must_use]
    pub fn new(
        registry: Arc<VenueRegistry>,
        event_bus: EventBus,
        local_offset: FixedOffset,
        mirror: Option<PostgresPersistence>,
    ) -> Self {
        Self {
            registry,
            event_bus,
            local_offset,
            mirror,
        }
    }

    /// Vibe tick: re-resolves every venue's scheduled vibe at `now` and
    /// writes back only when it differs from the stored value.
    ///
    /// Venues with no matching active rule are left unchanged — the last
    /// known vibe persists. Idempotent: re-running with unchanged inputs
    /// produces no writes and no events.
    pub async fn run_vibe_tick(&self, now: DateTime<Utc>) -> TickReport {
        let moment = LocalMoment::from_utc(now, self.local_offset);
        let mut report = TickReport::default();

        for venue_id in self.registry.venue_ids().await {
            report.scanned += 1;
            let Ok(entry_lock) = self.registry.get(venue_id).await else {
                report.skipped += 1;
                tracing::warn!(%venue_id, "venue vanished mid-tick, skipping");
                continue;
            };
            let mut entry = entry_lock.write().await;

            let Some(resolved) = resolve_current_vibe(&entry.schedule, moment) else {
                continue;
            };
            if resolved == entry.live_state.vibe.value {
                continue;
            }

            let old = entry.live_state.set_vibe(resolved, now);
            let state = entry.live_state;
            drop(entry);

            report.updated += 1;
            let _ = self.event_bus.publish(VenueEvent::VibeChanged {
                venue_id,
                old_vibe: old,
                new_vibe: resolved,
                origin: ChangeOrigin::AutomationTick,
                timestamp: now,
            });
            self.mirror_live_state(venue_id, state);
            tracing::debug!(%venue_id, old = old.as_str(), new = resolved.as_str(), "vibe updated");
        }

        if report.updated > 0 {
            tracing::info!(updated = report.updated, scanned = report.scanned, "vibe tick applied");
        }
        report
    }

    /// Busyness tick: re-simulates every venue's busyness from its category
    /// curve at the venue-local hour and writes back only on change.
    ///
    /// Idempotent with the same `now`.
    pub async fn run_busyness_tick(&self, now: DateTime<Utc>) -> TickReport {
        let moment = LocalMoment::from_utc(now, self.local_offset);
        let hour = moment.hour();
        let mut report = TickReport::default();

        for venue_id in self.registry.venue_ids().await {
            report.scanned += 1;
            let Ok(entry_lock) = self.registry.get(venue_id).await else {
                report.skipped += 1;
                tracing::warn!(%venue_id, "venue vanished mid-tick, skipping");
                continue;
            };
            let mut entry = entry_lock.write().await;

            let simulated = simulate_busyness(hour, entry.category);
            if simulated == entry.live_state.busyness.level {
                continue;
            }

            let old = entry.live_state.set_busyness(simulated, now);
            let state = entry.live_state;
            drop(entry);

            report.updated += 1;
            let _ = self.event_bus.publish(VenueEvent::BusynessChanged {
                venue_id,
                old_level: old,
                new_level: simulated,
                origin: ChangeOrigin::AutomationTick,
                timestamp: now,
            });
            self.mirror_live_state(venue_id, state);
            tracing::debug!(%venue_id, old = old.as_str(), new = simulated.as_str(), "busyness updated");
        }

        if report.updated > 0 {
            tracing::info!(
                updated = report.updated,
                scanned = report.scanned,
                hour,
                "busyness tick applied"
            );
        }
        report
    }

    /// Applies a bulk scenario preset to every venue, bypassing the
    /// schedule. Both (value, timestamp) pairs are refreshed on every venue
    /// the preset touches.
    pub async fn apply_scenario_preset(
        &self,
        preset: ScenarioPreset,
        now: DateTime<Utc>,
    ) -> TickReport {
        let mut report = TickReport::default();

        for venue_id in self.registry.venue_ids().await {
            report.scanned += 1;
            let Ok(entry_lock) = self.registry.get(venue_id).await else {
                report.skipped += 1;
                continue;
            };
            let mut entry = entry_lock.write().await;

            let (level, vibe) = match preset {
                ScenarioPreset::AllBusy => (Busyness::Busy, Vibe::Party),
                ScenarioPreset::AllQuiet => (Busyness::Quiet, Vibe::Chill),
                ScenarioPreset::VibeShift => {
                    let toggled = if entry.live_state.vibe.value == Vibe::Chill {
                        Vibe::Party
                    } else {
                        Vibe::Chill
                    };
                    (entry.live_state.busyness.level, toggled)
                }
            };

            let old_level = entry.live_state.set_busyness(level, now);
            let old_vibe = entry.live_state.set_vibe(vibe, now);
            let state = entry.live_state;
            drop(entry);

            report.updated += 1;
            if old_level != level {
                let _ = self.event_bus.publish(VenueEvent::BusynessChanged {
                    venue_id,
                    old_level,
                    new_level: level,
                    origin: ChangeOrigin::ScenarioPreset,
                    timestamp: now,
                });
            }
            if old_vibe != vibe {
                let _ = self.event_bus.publish(VenueEvent::VibeChanged {
                    venue_id,
                    old_vibe,
                    new_vibe: vibe,
                    origin: ChangeOrigin::ScenarioPreset,
                    timestamp: now,
                });
            }
            let _ = self.event_bus.publish(VenueEvent::ScenarioApplied {
                venue_id,
                preset: preset.as_str().to_string(),
                timestamp: now,
            });
            self.mirror_live_state(venue_id, state);
        }

        tracing::info!(preset = preset.as_str(), affected = report.updated, "scenario applied");
        report
    }

    /// Read-only status snapshot: today's active rule count, venue count,
    /// and the most recent live-state write.
    pub async fn automation_status(&self, now: DateTime<Utc>) -> AutomationStatus {
        let moment = LocalMoment::from_utc(now, self.local_offset);
        let mut active_rule_count = 0;
        let mut last_update_at: Option<DateTime<Utc>> = None;
        let mut venue_count = 0;

        for venue_id in self.registry.venue_ids().await {
            let Ok(entry_lock) = self.registry.get(venue_id).await else {
                continue;
            };
            let entry = entry_lock.read().await;
            venue_count += 1;
            active_rule_count += entry
                .schedule
                .iter()
                .filter(|r| r.is_active && r.day_of_week == moment.day_of_week)
                .count();
            let updated_at = entry.live_state.updated_at;
            if last_update_at.is_none_or(|latest| updated_at > latest) {
                last_update_at = Some(updated_at);
            }
        }

        AutomationStatus {
            active_rule_count,
            venue_count,
            last_update_at,
        }
    }

    /// Spawns the two periodic tick loops for the process lifetime.
    ///
    /// The vibe loop runs more often than the busyness loop: vibes change on
    /// schedule boundaries while busyness is a slower-moving simulated
    /// signal. The loops are not user-cancellable and never exit on tick
    /// errors; a failed tick is retried wholesale on the next interval.
    #[must_use]
    pub fn spawn(
        self: Arc<Self>,
        vibe_interval: Duration,
        busyness_interval: Duration,
    ) -> (JoinHandle<()>, JoinHandle<()>) {
        let vibe_service = Arc::clone(&self);
        let vibe_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(vibe_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let report = vibe_service.run_vibe_tick(Utc::now()).await;
                tracing::debug!(scanned = report.scanned, updated = report.updated, "vibe tick");
            }
        });

        let busyness_service = self;
        let busyness_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(busyness_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let report = busyness_service.run_busyness_tick(Utc::now()).await;
                tracing::debug!(
                    scanned = report.scanned,
                    updated = report.updated,
                    "busyness tick"
                );
            }
        });

        (vibe_handle, busyness_handle)
    }

    /// Mirrors a live-state change to persistence, fire-and-forget.
    fn mirror_live_state(&self, venue_id: VenueId, state: VenueLiveState) {
        if let Some(mirror) = self.mirror.clone() {
            tokio::spawn(async move {
                if let Err(e) = mirror.save_live_state(*venue_id.as_uuid(), &state).await {
                    tracing::warn!(%venue_id, error = %e, "live-state mirror write failed");
                }
            });
        }
    }
}
