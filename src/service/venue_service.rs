//! Venue service: venue directory, schedule rules, live-state reads and
//! manual overrides.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use crate::domain::{
    Busyness, ChangeOrigin, EventBus, RuleId, ScheduleRule, VenueCategory, VenueEntry, VenueEvent,
    VenueId, VenueLiveState, VenueRegistry, VenueSummary, Vibe,
};
use crate::engine::vibe::{LocalMoment, VibeChange, resolve_current_vibe, resolve_next_change};
use crate::error::GatewayError;
use crate::persistence::PostgresPersistence;

/// Orchestration layer for venue and schedule operations.
///
/// Holds the registry for state, the event bus for notifications, the
/// deployment's venue-local zone offset, and an optional persistence mirror.
#[derive(Debug, Clone)]
pub struct VenueService {
    registry: Arc<VenueRegistry>,
    event_bus: EventBus,
    local_offset: FixedOffset,
    mirror: Option<PostgresPersistence>,
}

impl VenueService {
    /// Creates a new `VenueService`.
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

    /// Returns a reference to the inner [`VenueRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<VenueRegistry> {
        &self.registry
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// The deployment's venue-local zone offset.
    #[must_use]
    pub fn local_offset(&self) -> FixedOffset {
        self.local_offset
    }

    /// Creates a new venue with default live state (QUIET / CHILL).
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if registry insertion fails.
    pub async fn create_venue(
        &self,
        name: String,
        category: VenueCategory,
    ) -> Result<VenueId, GatewayError> {
        let entry = VenueEntry::new(VenueId::new(), name.clone(), category);
        let venue_id = self.registry.insert(entry).await?;

        let _ = self.event_bus.publish(VenueEvent::VenueCreated {
            venue_id,
            name,
            timestamp: Utc::now(),
        });

        tracing::info!(%venue_id, category = category.as_str(), "venue created");
        Ok(venue_id)
    }

    /// Returns a summary of one venue.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
    pub async fn get_venue(&self, venue_id: VenueId) -> Result<VenueSummary, GatewayError> {
        let entry_lock = self.registry.get(venue_id).await?;
        let entry = entry_lock.read().await;
        Ok(VenueSummary::from(&*entry))
    }

    /// Returns summaries of all venues.
    pub async fn list_venues(&self) -> Vec<VenueSummary> {
        self.registry.list().await
    }

    /// Removes a venue and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
    pub async fn remove_venue(&self, venue_id: VenueId) -> Result<(), GatewayError> {
        self.registry.remove(venue_id).await?;

        let _ = self.event_bus.publish(VenueEvent::VenueRemoved {
            venue_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%venue_id, "venue removed");
        Ok(())
    }

    // ── Schedule ────────────────────────────────────────────────────────

    /// Adds a validated schedule rule to a venue.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] on malformed rules or
    /// [`GatewayError::VenueNotFound`] if the venue does not exist.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_schedule_rule(
        &self,
        venue_id: VenueId,
        day_of_week: u8,
        start_time: chrono::NaiveTime,
        end_time: chrono::NaiveTime,
        vibe: Vibe,
        priority: i32,
        is_active: bool,
    ) -> Result<ScheduleRule, GatewayError> {
        let rule = ScheduleRule::new(
            day_of_week,
            start_time,
            end_time,
            vibe,
            priority,
            is_active,
            Utc::now(),
        )?;

        let entry_lock = self.registry.get(venue_id).await?;
        let mut entry = entry_lock.write().await;
        entry.schedule.push(rule);
        drop(entry);

        tracing::info!(%venue_id, rule_id = %rule.id, day_of_week, "schedule rule added");
        Ok(rule)
    }

    /// Returns all schedule rules for a venue.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
    pub async fn list_schedule(&self, venue_id: VenueId) -> Result<Vec<ScheduleRule>, GatewayError> {
        let entry_lock = self.registry.get(venue_id).await?;
        let entry = entry_lock.read().await;
        let mut rules = entry.schedule.clone();
        rules.sort_by(|a, b| {
            a.day_of_week
                .cmp(&b.day_of_week)
                .then(a.start_time.cmp(&b.start_time))
                .then(b.priority.cmp(&a.priority))
        });
        Ok(rules)
    }

    /// Removes a schedule rule from a venue.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RuleNotFound`] if the rule does not exist on
    /// that venue, or [`GatewayError::VenueNotFound`] for a missing venue.
    pub async fn remove_schedule_rule(
        &self,
        venue_id: VenueId,
        rule_id: RuleId,
    ) -> Result<(), GatewayError> {
        let entry_lock = self.registry.get(venue_id).await?;
        let mut entry = entry_lock.write().await;
        let before = entry.schedule.len();
        entry.schedule.retain(|r| r.id != rule_id);
        if entry.schedule.len() == before {
            return Err(GatewayError::RuleNotFound(*rule_id.as_uuid()));
        }
        Ok(())
    }

    // ── Vibe queries ────────────────────────────────────────────────────

    /// Resolves the venue's currently scheduled vibe at `now`, or `None`
    /// when no active rule covers the instant.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if the venue does not exist —
    /// a missing venue is never treated as "no rule".
    pub async fn current_vibe(
        &self,
        venue_id: VenueId,
        now: DateTime<Utc>,
    ) -> Result<Option<Vibe>, GatewayError> {
        let entry_lock = self.registry.get(venue_id).await?;
        let entry = entry_lock.read().await;
        let moment = LocalMoment::from_utc(now, self.local_offset);
        Ok(resolve_current_vibe(&entry.schedule, moment))
    }

    /// Resolves the venue's next scheduled vibe change strictly after `now`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
    pub async fn next_vibe_change(
        &self,
        venue_id: VenueId,
        now: DateTime<Utc>,
    ) -> Result<Option<VibeChange>, GatewayError> {
        let entry_lock = self.registry.get(venue_id).await?;
        let entry = entry_lock.read().await;
        let moment = LocalMoment::from_utc(now, self.local_offset);
        Ok(resolve_next_change(&entry.schedule, moment))
    }

    // ── Live state ──────────────────────────────────────────────────────

    /// Returns the venue's current live state.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
    pub async fn live_state(&self, venue_id: VenueId) -> Result<VenueLiveState, GatewayError> {
        let entry_lock = self.registry.get(venue_id).await?;
        let entry = entry_lock.read().await;
        Ok(entry.live_state)
    }

    /// Manual override of a venue's live state, bypassing the schedule.
    ///
    /// Whichever fields are present are updated as their (value, timestamp)
    /// pair; absent fields keep both value and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
    pub async fn override_live_state(
        &self,
        venue_id: VenueId,
        busyness: Option<Busyness>,
        vibe: Option<Vibe>,
        now: DateTime<Utc>,
    ) -> Result<VenueLiveState, GatewayError> {
        let entry_lock = self.registry.get(venue_id).await?;
        let mut entry = entry_lock.write().await;

        if let Some(level) = busyness {
            let old = entry.live_state.set_busyness(level, now);
            if old != level {
                let _ = self.event_bus.publish(VenueEvent::BusynessChanged {
                    venue_id,
                    old_level: old,
                    new_level: level,
                    origin: ChangeOrigin::ManualOverride,
                    timestamp: now,
                });
            }
        }
        if let Some(value) = vibe {
            let old = entry.live_state.set_vibe(value, now);
            if old != value {
                let _ = self.event_bus.publish(VenueEvent::VibeChanged {
                    venue_id,
                    old_vibe: old,
                    new_vibe: value,
                    origin: ChangeOrigin::ManualOverride,
                    timestamp: now,
                });
            }
        }

        let state = entry.live_state;
        drop(entry);

        self.mirror_live_state(venue_id, state);
        tracing::info!(%venue_id, "live state overridden");
        Ok(state)
    }

    /// Counts venues at each busyness level, in rank order.
    pub async fn busyness_breakdown(&self) -> Vec<(Busyness, usize)> {
        let summaries = self.registry.list().await;
        let mut counts = [
            (Busyness::Quiet, 0usize),
            (Busyness::Moderate, 0),
            (Busyness::Busy, 0),
        ];
        for summary in &summaries {
            for slot in &mut counts {
                if slot.0 == summary.live_state.busyness.level {
                    slot.1 += 1;
                }
            }
        }
        counts.to_vec()
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

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::schedule::parse_time_of_day;

    fn make_service() -> VenueService {
        let registry = Arc::new(VenueRegistry::new());
        let event_bus = EventBus::new(1000);
        let offset = FixedOffset::east_opt(0).unwrap_or_else(|| {
            panic!("valid offset");
        });
        VenueService::new(registry, event_bus, offset, None)
    }

    fn t(s: &str) -> chrono::NaiveTime {
        parse_time_of_day(s).ok().unwrap_or_else(|| {
            panic!("bad test time: {s}");
        })
    }

    #[tokio::test]
    async fn create_venue_starts_quiet_and_chill() {
        let service = make_service();
        let id = service
            .create_venue("Velvet Room".to_string(), VenueCategory::Club)
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("venue creation failed");
            });

        let state = service.live_state(id).await.ok().unwrap_or_else(|| {
            panic!("live state missing");
        });
        assert_eq!(state.busyness.level, Busyness::Quiet);
        assert_eq!(state.vibe.value, Vibe::Chill);
    }

    #[tokio::test]
    async fn create_venue_emits_event() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();

        let result = service
            .create_venue("Night Owl".to_string(), VenueCategory::Bar)
            .await;
        assert!(result.is_ok());

        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "venue_created");
    }

    #[tokio::test]
    async fn add_rule_rejects_bad_day() {
        let service = make_service();
        let id = service
            .create_venue("Corner Bar".to_string(), VenueCategory::Bar)
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("venue creation failed");
            });

        let result = service
            .add_schedule_rule(id, 9, t("10:00"), t("12:00"), Vibe::Chill, 0, true)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn remove_rule_not_found() {
        let service = make_service();
        let id = service
            .create_venue("Corner Bar".to_string(), VenueCategory::Bar)
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("venue creation failed");
            });

        let result = service.remove_schedule_rule(id, RuleId::new()).await;
        assert!(matches!(result, Err(GatewayError::RuleNotFound(_))));
    }

    #[tokio::test]
    async fn current_vibe_for_missing_venue_is_not_found() {
        let service = make_service();
        let result = service.current_vibe(VenueId::new(), Utc::now()).await;
        assert!(matches!(result, Err(GatewayError::VenueNotFound(_))));
    }

    #[tokio::test]
    async fn override_updates_only_named_pairs() {
        let service = make_service();
        let id = service
            .create_venue("Velvet Room".to_string(), VenueCategory::Club)
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("venue creation failed");
            });

        let before = service.live_state(id).await.ok().unwrap_or_else(|| {
            panic!("live state missing");
        });
        let now = Utc::now() + chrono::Duration::minutes(1);

        let after = service
            .override_live_state(id, Some(Busyness::Busy), None, now)
            .await
            .ok()
            .unwrap_or_else(|| {
                panic!("override failed");
            });

        assert_eq!(after.busyness.level, Busyness::Busy);
        assert_eq!(after.busyness.updated_at, now);
        // The vibe pair is untouched, timestamp included.
        assert_eq!(after.vibe.value, before.vibe.value);
        assert_eq!(after.vibe.updated_at, before.vibe.updated_at);
    }

    #[tokio::test]
    async fn busyness_breakdown_counts_levels() {
        let service = make_service();
        let a = service
            .create_venue("A".to_string(), VenueCategory::Bar)
            .await
            .ok()
            .unwrap_or_else(|| panic!("create failed"));
        let _b = service
            .create_venue("B".to_string(), VenueCategory::Bar)
            .await
            .ok()
            .unwrap_or_else(|| panic!("create failed"));
        let _ = service
            .override_live_state(a, Some(Busyness::Busy), None, Utc::now())
            .await;

        let breakdown = service.busyness_breakdown().await;
        let quiet = breakdown
            .iter()
            .find(|(l, _)| *l == Busyness::Quiet)
            .map(|(_, c)| *c);
        let busy = breakdown
            .iter()
            .find(|(l, _)| *l == Busyness::Busy)
            .map(|(_, c)| *c);
        assert_eq!(quiet, Some(1));
        assert_eq!(busy, Some(1));
    }
}
