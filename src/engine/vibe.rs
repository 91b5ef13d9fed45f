//! Vibe resolution: derives a venue's current vibe and next scheduled
//! change from its weekly rule set.
//!
//! The subtle part is time handling. A rule is expressed in venue-local
//! day-of-week and time-of-day, so an instant must be converted to the
//! venue's zone *once* and both components read from that converted value.
//! Mixing a UTC day-of-week with a local time-of-day silently shifts every
//! window that straddles the zone's midnight; [`LocalMoment`] exists to make
//! that mistake unrepresentable in this module.

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Timelike, Utc};
use serde::Serialize;

use crate::domain::schedule::DAYS_PER_WEEK;
use crate::domain::{RuleId, ScheduleRule, Vibe};

/// An instant expressed in venue-local terms: day-of-week and time-of-day
/// taken from the same converted timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalMoment {
    /// Local day of week (0 = Sunday … 6 = Saturday).
    pub day_of_week: u8,
    /// Local time of day.
    pub time: NaiveTime,
}

impl LocalMoment {
    /// Converts a UTC instant into the venue's local frame.
    #[must_use]
    pub fn from_utc(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = now.with_timezone(&offset);
        #[allow(clippy::cast_possible_truncation)]
        let day_of_week = local.weekday().num_days_from_sunday() as u8;
        Self {
            day_of_week,
            time: local.time(),
        }
    }

    /// Local hour of day (0–23), used by the busyness simulation.
    #[must_use]
    pub fn hour(&self) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        {
            self.time.hour() as u8
        }
    }
}

/// The next scheduled vibe change for a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VibeChange {
    /// Vibe the venue will switch to.
    pub vibe: Vibe,
    /// Local start time of the upcoming window.
    pub starts_at: NaiveTime,
    /// Local day of week of the upcoming window (0 = Sunday … 6 = Saturday).
    pub day_of_week: u8,
    /// Identifier of the winning rule.
    pub rule_id: RuleId,
}

/// Resolves the single currently-active vibe, or `None` when no active rule
/// covers the moment.
///
/// When several active rules cover the same instant the highest `priority`
/// wins; equal priorities break to the lowest rule id, so resolution is
/// deterministic regardless of insertion order.
#[must_use]
pub fn resolve_current_vibe(rules: &[ScheduleRule], moment: LocalMoment) -> Option<Vibe> {
    rules
        .iter()
        .filter(|r| r.matches_at(moment.day_of_week, moment.time))
        .min_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|r| r.vibe)
}

/// Finds the next scheduled vibe change strictly after the moment.
///
/// Searches the remainder of today by `start_time`, then walks forward
/// day-by-day (wrapping after a full week, so a rule earlier today is found
/// again seven days out). Returns `None` when the venue has no active rules
/// at all. Start instants are compared by the rule's own day — an overnight
/// rule "changes" the vibe when its window opens, not when it spills past
/// midnight.
#[must_use]
pub fn resolve_next_change(rules: &[ScheduleRule], moment: LocalMoment) -> Option<VibeChange> {
    let next_today = rules
        .iter()
        .filter(|r| {
            r.is_active && r.day_of_week == moment.day_of_week && r.start_time > moment.time
        })
        .min_by(|a, b| order_by_start(a, b));
    if let Some(rule) = next_today {
        return Some(to_change(rule));
    }

    for day_ahead in 1..=u32::from(DAYS_PER_WEEK) {
        #[allow(clippy::cast_possible_truncation)]
        let day = ((u32::from(moment.day_of_week) + day_ahead) % u32::from(DAYS_PER_WEEK)) as u8;
        let first = rules
            .iter()
            .filter(|r| r.is_active && r.day_of_week == day)
            .min_by(|a, b| order_by_start(a, b));
        if let Some(rule) = first {
            return Some(to_change(rule));
        }
    }
    None
}

/// Ordering for "which rule starts first": earliest `start_time`, then
/// highest priority, then lowest id.
fn order_by_start(a: &ScheduleRule, b: &ScheduleRule) -> std::cmp::Ordering {
    a.start_time
        .cmp(&b.start_time)
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.id.cmp(&b.id))
}

fn to_change(rule: &ScheduleRule) -> VibeChange {
    VibeChange {
        vibe: rule.vibe,
        starts_at: rule.start_time,
        day_of_week: rule.day_of_week,
        rule_id: rule.id,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(s: &str) -> NaiveTime {
        crate::domain::schedule::parse_time_of_day(s).ok().unwrap_or_else(|| {
            panic!("bad test time: {s}");
        })
    }

    fn rule(day: u8, start: &str, end: &str, vibe: Vibe, priority: i32) -> ScheduleRule {
        ScheduleRule::new(day, t(start), t(end), vibe, priority, true, Utc::now())
            .ok()
            .unwrap_or_else(|| {
                panic!("valid rule");
            })
    }

    fn moment(day: u8, time: &str) -> LocalMoment {
        LocalMoment {
            day_of_week: day,
            time: t(time),
        }
    }

    // ── LocalMoment conversion ──────────────────────────────────────────

    #[test]
    fn from_utc_applies_offset() {
        // 2026-03-06 is a Friday. 23:30 UTC at +02:00 is Saturday 01:30 local.
        let now = Utc.with_ymd_and_hms(2026, 3, 6, 23, 30, 0).single().unwrap_or_else(|| {
            panic!("valid instant");
        });
        let offset = FixedOffset::east_opt(2 * 3600).unwrap_or_else(|| {
            panic!("valid offset");
        });
        let m = LocalMoment::from_utc(now, offset);
        assert_eq!(m.day_of_week, 6); // Saturday
        assert_eq!(m.time, t("01:30"));
        assert_eq!(m.hour(), 1);
    }

    #[test]
    fn from_utc_negative_offset_shifts_back_across_midnight() {
        // Sunday 2026-03-08 00:30 UTC at -01:00 is Saturday 23:30 local.
        let now = Utc.with_ymd_and_hms(2026, 3, 8, 0, 30, 0).single().unwrap_or_else(|| {
            panic!("valid instant");
        });
        let offset = FixedOffset::west_opt(3600).unwrap_or_else(|| {
            panic!("valid offset");
        });
        let m = LocalMoment::from_utc(now, offset);
        assert_eq!(m.day_of_week, 6);
        assert_eq!(m.time, t("23:30"));
    }

    // ── resolve_current_vibe ────────────────────────────────────────────

    #[test]
    fn no_rules_resolves_to_none() {
        assert_eq!(resolve_current_vibe(&[], moment(5, "20:00")), None);
    }

    #[test]
    fn single_matching_rule_wins() {
        let rules = vec![rule(5, "19:00", "23:00", Vibe::Party, 0)];
        assert_eq!(
            resolve_current_vibe(&rules, moment(5, "20:00")),
            Some(Vibe::Party)
        );
        assert_eq!(resolve_current_vibe(&rules, moment(5, "18:00")), None);
        assert_eq!(resolve_current_vibe(&rules, moment(4, "20:00")), None);
    }

    #[test]
    fn overnight_rule_matches_into_next_day() {
        // Friday 22:00 - 02:00 LATE_NIGHT.
        let rules = vec![rule(5, "22:00", "02:00", Vibe::LateNight, 0)];
        assert_eq!(
            resolve_current_vibe(&rules, moment(5, "23:30")),
            Some(Vibe::LateNight)
        );
        assert_eq!(
            resolve_current_vibe(&rules, moment(6, "01:00")),
            Some(Vibe::LateNight)
        );
        assert_eq!(resolve_current_vibe(&rules, moment(6, "03:00")), None);
    }

    #[test]
    fn higher_priority_wins_overlap() {
        let rules = vec![
            rule(5, "18:00", "23:00", Vibe::Social, 1),
            rule(5, "20:00", "22:00", Vibe::Party, 2),
        ];
        assert_eq!(
            resolve_current_vibe(&rules, moment(5, "21:00")),
            Some(Vibe::Party)
        );
        // Outside the high-priority window the broad rule applies again.
        assert_eq!(
            resolve_current_vibe(&rules, moment(5, "19:00")),
            Some(Vibe::Social)
        );
    }

    #[test]
    fn priority_two_beats_priority_one_repeatably() {
        let rules = vec![
            rule(2, "10:00", "14:00", Vibe::Chill, 1),
            rule(2, "10:00", "14:00", Vibe::Romantic, 2),
        ];
        for _ in 0..10 {
            assert_eq!(
                resolve_current_vibe(&rules, moment(2, "12:00")),
                Some(Vibe::Romantic)
            );
        }
    }

    #[test]
    fn equal_priority_breaks_to_lowest_rule_id() {
        let mut a = rule(3, "10:00", "14:00", Vibe::Chill, 5);
        let mut b = rule(3, "10:00", "14:00", Vibe::Party, 5);
        a.id = RuleId::from_uuid(uuid::Uuid::from_bytes([1u8; 16]));
        b.id = RuleId::from_uuid(uuid::Uuid::from_bytes([2u8; 16]));

        // Same result in both storage orders.
        let forward = vec![a, b];
        let backward = vec![b, a];
        assert_eq!(
            resolve_current_vibe(&forward, moment(3, "12:00")),
            Some(Vibe::Chill)
        );
        assert_eq!(
            resolve_current_vibe(&backward, moment(3, "12:00")),
            Some(Vibe::Chill)
        );
    }

    #[test]
    fn inactive_rules_are_ignored() {
        let mut r = rule(5, "19:00", "23:00", Vibe::Party, 0);
        r.is_active = false;
        assert_eq!(resolve_current_vibe(&[r], moment(5, "20:00")), None);
    }

    // ── resolve_next_change ─────────────────────────────────────────────

    #[test]
    fn next_change_prefers_later_today() {
        let rules = vec![
            rule(5, "17:00", "19:00", Vibe::Social, 0),
            rule(5, "22:00", "02:00", Vibe::LateNight, 0),
            rule(6, "12:00", "15:00", Vibe::Chill, 0),
        ];
        let change = resolve_next_change(&rules, moment(5, "18:00"));
        let Some(change) = change else {
            panic!("expected a change");
        };
        assert_eq!(change.vibe, Vibe::LateNight);
        assert_eq!(change.day_of_week, 5);
        assert_eq!(change.starts_at, t("22:00"));
    }

    #[test]
    fn next_change_walks_forward_days() {
        // Rules only Monday (1) - Thursday (4); query on Sunday (0).
        let rules = vec![
            rule(1, "18:00", "22:00", Vibe::Social, 0),
            rule(3, "18:00", "22:00", Vibe::Party, 0),
            rule(4, "18:00", "22:00", Vibe::Chill, 0),
        ];
        let change = resolve_next_change(&rules, moment(0, "12:00"));
        let Some(change) = change else {
            panic!("expected a change");
        };
        // Nearest upcoming Monday rule.
        assert_eq!(change.day_of_week, 1);
        assert_eq!(change.vibe, Vibe::Social);
    }

    #[test]
    fn next_change_wraps_week_to_earlier_rule_today() {
        // Only rule starts earlier today; the next occurrence is 7 days out.
        let rules = vec![rule(2, "10:00", "12:00", Vibe::Chill, 0)];
        let change = resolve_next_change(&rules, moment(2, "15:00"));
        let Some(change) = change else {
            panic!("expected a change");
        };
        assert_eq!(change.day_of_week, 2);
        assert_eq!(change.starts_at, t("10:00"));
    }

    #[test]
    fn next_change_none_without_active_rules() {
        assert!(resolve_next_change(&[], moment(0, "12:00")).is_none());

        let mut r = rule(1, "10:00", "12:00", Vibe::Chill, 0);
        r.is_active = false;
        assert!(resolve_next_change(&[r], moment(0, "12:00")).is_none());
    }

    #[test]
    fn next_change_same_start_prefers_priority_then_id() {
        let mut a = rule(5, "20:00", "23:00", Vibe::Social, 1);
        let b = rule(5, "20:00", "23:00", Vibe::Party, 3);
        a.id = RuleId::from_uuid(uuid::Uuid::from_bytes([0u8; 16]));
        let change = resolve_next_change(&[a, b], moment(5, "10:00"));
        let Some(change) = change else {
            panic!("expected a change");
        };
        assert_eq!(change.vibe, Vibe::Party);
    }

    #[test]
    fn no_match_on_sunday_with_weekday_only_schedule() {
        // Current vibe resolves to none; next change is Monday's rule.
        let rules = vec![
            rule(1, "18:00", "22:00", Vibe::Social, 0),
            rule(2, "18:00", "22:00", Vibe::Social, 0),
            rule(3, "18:00", "22:00", Vibe::Social, 0),
            rule(4, "18:00", "22:00", Vibe::Party, 0),
        ];
        let m = moment(0, "19:00");
        assert_eq!(resolve_current_vibe(&rules, m), None);
        let change = resolve_next_change(&rules, m);
        let Some(change) = change else {
            panic!("expected a change");
        };
        assert_eq!(change.day_of_week, 1);
    }
}
