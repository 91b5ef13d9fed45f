//! Pure temporal logic: vibe resolution, busyness simulation, eligibility.
//!
//! Everything in this module is a side-effect-free function of its inputs.
//! "Now" is always an explicit parameter — nothing here reads the system
//! clock or touches a store — so every boundary and timezone edge case can
//! be pinned in a test with an exact instant.

pub mod busyness;
pub mod eligibility;
pub mod vibe;

pub use busyness::simulate_busyness;
pub use eligibility::EligibilityError;
pub use vibe::{LocalMoment, VibeChange, resolve_current_vibe, resolve_next_change};
