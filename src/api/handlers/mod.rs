//! REST endpoint handlers organized by resource.

pub mod automation;
pub mod offer;
pub mod schedule;
pub mod system;
pub mod venue;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(venue::routes())
        .merge(schedule::routes())
        .merge(offer::routes())
        .merge(automation::routes())
}
