//! Busyness simulation: synthetic crowd levels from diurnal curves.
//!
//! Each venue category follows a fixed step function over the local hour of
//! day. The curves are deliberately coarse — this is a demand signal for the
//! eligibility gate, not a forecast.

use crate::domain::{Busyness, VenueCategory};

/// Computes the simulated busyness for a category at a local hour (0–23).
///
/// Categories without a dedicated curve (currently casinos) sit at a flat
/// MODERATE, as does any out-of-range hour.
#[must_use]
pub const fn simulate_busyness(hour: u8, category: VenueCategory) -> Busyness {
    match category {
        VenueCategory::Club => match hour {
            0..=5 => Busyness::Busy,      // late night peak
            6..=16 => Busyness::Quiet,    // closed / daytime
            17..=20 => Busyness::Moderate, // early evening
            21..=23 => Busyness::Busy,
            _ => Busyness::Moderate,
        },
        VenueCategory::Bar => match hour {
            0..=2 => Busyness::Busy,
            3..=15 => Busyness::Quiet,
            16..=18 => Busyness::Moderate, // happy hour
            19..=22 => Busyness::Busy,
            23 => Busyness::Moderate,      // winding down
            _ => Busyness::Moderate,
        },
        VenueCategory::Restaurant => match hour {
            0..=10 => Busyness::Quiet,
            11..=13 => Busyness::Busy,     // lunch rush
            14..=16 => Busyness::Quiet,    // afternoon lull
            17..=20 => Busyness::Busy,     // dinner rush
            21..=23 => Busyness::Moderate, // late dining
            _ => Busyness::Moderate,
        },
        VenueCategory::Casino => Busyness::Moderate,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn club_is_quiet_daytime_busy_late() {
        assert_eq!(simulate_busyness(3, VenueCategory::Club), Busyness::Busy);
        assert_eq!(simulate_busyness(12, VenueCategory::Club), Busyness::Quiet);
        assert_eq!(
            simulate_busyness(18, VenueCategory::Club),
            Busyness::Moderate
        );
        assert_eq!(simulate_busyness(23, VenueCategory::Club), Busyness::Busy);
    }

    #[test]
    fn bar_peaks_evening_winds_down_at_midnight_edge() {
        assert_eq!(simulate_busyness(1, VenueCategory::Bar), Busyness::Busy);
        assert_eq!(simulate_busyness(10, VenueCategory::Bar), Busyness::Quiet);
        assert_eq!(simulate_busyness(17, VenueCategory::Bar), Busyness::Moderate);
        assert_eq!(simulate_busyness(21, VenueCategory::Bar), Busyness::Busy);
        assert_eq!(simulate_busyness(23, VenueCategory::Bar), Busyness::Moderate);
    }

    #[test]
    fn restaurant_has_lunch_and_dinner_peaks() {
        assert_eq!(
            simulate_busyness(8, VenueCategory::Restaurant),
            Busyness::Quiet
        );
        assert_eq!(
            simulate_busyness(12, VenueCategory::Restaurant),
            Busyness::Busy
        );
        assert_eq!(
            simulate_busyness(15, VenueCategory::Restaurant),
            Busyness::Quiet
        );
        assert_eq!(
            simulate_busyness(19, VenueCategory::Restaurant),
            Busyness::Busy
        );
        assert_eq!(
            simulate_busyness(22, VenueCategory::Restaurant),
            Busyness::Moderate
        );
    }

    #[test]
    fn category_without_curve_defaults_to_moderate() {
        for hour in 0..24 {
            assert_eq!(
                simulate_busyness(hour, VenueCategory::Casino),
                Busyness::Moderate
            );
        }
    }

    #[test]
    fn every_hour_is_covered_for_every_category() {
        for category in [
            VenueCategory::Bar,
            VenueCategory::Club,
            VenueCategory::Restaurant,
            VenueCategory::Casino,
        ] {
            for hour in 0..24 {
                // Just exercising the whole domain; the function is total.
                let _ = simulate_busyness(hour, category);
            }
        }
    }
}
