//! Offer eligibility: the combined time-window and busyness-threshold test.
//!
//! The busyness comparison is monotonic, not equality: an offer's
//! `min_busyness` means "at least this busy". An offer requiring QUIET is
//! available at any level; one requiring BUSY only when the venue is
//! actually BUSY. The availability window is a closed interval on both ends.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Busyness, Offer};

/// Typed reason an offer cannot be redeemed right now.
///
/// These are expected, recoverable outcomes — the caller decides the
/// user-facing messaging. Transient infrastructure failures are a different
/// error class entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityError {
    /// No offer with the given id exists.
    #[error("OFFER_NOT_FOUND")]
    OfferNotFound,
    /// The owner has deactivated the offer.
    #[error("OFFER_INACTIVE")]
    OfferInactive,
    /// `now` is outside the offer's availability window.
    #[error("OUTSIDE_WINDOW")]
    OutsideWindow,
    /// The venue is not busy enough to satisfy `min_busyness`.
    #[error("BUSYNESS_NOT_MET")]
    BusynessNotMet,
}

/// Runs the full eligibility test for one offer against the venue's current
/// busyness at the given instant.
///
/// Check order: active flag, then window, then busyness gate — so the
/// returned reason names the first failing condition.
///
/// # Errors
///
/// Returns the first failing [`EligibilityError`] condition.
pub fn check(
    offer: &Offer,
    venue_busyness: Busyness,
    now: DateTime<Utc>,
) -> Result<(), EligibilityError> {
    if !offer.is_active {
        return Err(EligibilityError::OfferInactive);
    }
    if now < offer.starts_at || now > offer.ends_at {
        return Err(EligibilityError::OutsideWindow);
    }
    if !venue_busyness.meets(offer.min_busyness) {
        return Err(EligibilityError::BusynessNotMet);
    }
    Ok(())
}

/// Boolean form of [`check`], for filtering offer lists.
#[must_use]
pub fn is_eligible(offer: &Offer, venue_busyness: Busyness, now: DateTime<Utc>) -> bool {
    check(offer, venue_busyness, now).is_ok()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::OfferType;
    use chrono::Duration;

    fn offer_with(min_busyness: Busyness, now: DateTime<Utc>) -> Offer {
        Offer::new(
            "test offer".to_string(),
            OfferType::PercentOff,
            min_busyness,
            now - Duration::hours(1),
            now + Duration::hours(1),
            true,
            now,
        )
        .ok()
        .unwrap_or_else(|| {
            panic!("valid offer");
        })
    }

    #[test]
    fn monotonic_eligibility_over_busyness_ranks() {
        // If an offer is eligible at rank b2, it is eligible at every b1 >= b2.
        let now = Utc::now();
        let levels = [Busyness::Quiet, Busyness::Moderate, Busyness::Busy];
        for required in levels {
            let offer = offer_with(required, now);
            for current in levels {
                let eligible = is_eligible(&offer, current, now);
                assert_eq!(
                    eligible,
                    current.rank() >= required.rank(),
                    "required={required:?} current={current:?}"
                );
            }
        }
    }

    #[test]
    fn quiet_requirement_available_at_any_level() {
        let now = Utc::now();
        let offer = offer_with(Busyness::Quiet, now);
        assert!(is_eligible(&offer, Busyness::Quiet, now));
        assert!(is_eligible(&offer, Busyness::Moderate, now));
        assert!(is_eligible(&offer, Busyness::Busy, now));
    }

    #[test]
    fn busy_requirement_rejected_below_busy() {
        let now = Utc::now();
        let offer = offer_with(Busyness::Busy, now);
        assert_eq!(
            check(&offer, Busyness::Quiet, now),
            Err(EligibilityError::BusynessNotMet)
        );
        assert_eq!(
            check(&offer, Busyness::Moderate, now),
            Err(EligibilityError::BusynessNotMet)
        );
        assert!(check(&offer, Busyness::Busy, now).is_ok());
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        let now = Utc::now();
        let mut offer = offer_with(Busyness::Quiet, now);
        offer.starts_at = now;
        offer.ends_at = now + Duration::hours(2);
        assert!(is_eligible(&offer, Busyness::Quiet, now));

        offer.starts_at = now - Duration::hours(2);
        offer.ends_at = now;
        assert!(is_eligible(&offer, Busyness::Quiet, now));
    }

    #[test]
    fn one_instant_outside_window_is_rejected() {
        let now = Utc::now();
        let offer = offer_with(Busyness::Quiet, now);
        let before = offer.starts_at - Duration::seconds(1);
        let after = offer.ends_at + Duration::seconds(1);
        assert_eq!(
            check(&offer, Busyness::Busy, before),
            Err(EligibilityError::OutsideWindow)
        );
        assert_eq!(
            check(&offer, Busyness::Busy, after),
            Err(EligibilityError::OutsideWindow)
        );
    }

    #[test]
    fn inactive_offer_reported_before_other_reasons() {
        let now = Utc::now();
        let mut offer = offer_with(Busyness::Busy, now);
        offer.is_active = false;
        // Would also fail the busyness gate; inactive wins.
        assert_eq!(
            check(&offer, Busyness::Quiet, now),
            Err(EligibilityError::OfferInactive)
        );
    }

    #[test]
    fn error_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&EligibilityError::BusynessNotMet).unwrap_or_default();
        assert_eq!(json, "\"BUSYNESS_NOT_MET\"");
    }
}
