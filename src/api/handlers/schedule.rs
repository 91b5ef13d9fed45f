//! Schedule handlers: rule CRUD and vibe resolution queries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CreateScheduleRuleRequest, CurrentVibeResponse, NextVibeChangeResponse, ScheduleRuleDto,
};
use crate::app_state::AppState;
use crate::domain::schedule::parse_time_of_day;
use crate::domain::{RuleId, VenueId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /venues/:id/schedule` — Add a schedule rule.
///
/// # Errors
///
/// Returns [`GatewayError`] on malformed rules or a missing venue.
#[utoipa::path(
    post,
    path = "/api/v1/venues/{id}/schedule",
    tag = "Schedule",
    summary = "Add a schedule rule",
    description = "Adds a weekly recurring vibe window. Times are venue-local HH:MM; an end time earlier than the start time wraps past midnight.",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
    ),
    request_body = CreateScheduleRuleRequest,
    responses(
        (status = 201, description = "Rule created", body = ScheduleRuleDto),
        (status = 400, description = "Invalid rule", body = ErrorResponse),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn create_rule(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CreateScheduleRuleRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let start_time = parse_time_of_day(&req.start_time)?;
    let end_time = parse_time_of_day(&req.end_time)?;

    let rule = state
        .venue_service
        .add_schedule_rule(
            VenueId::from_uuid(id),
            req.day_of_week,
            start_time,
            end_time,
            req.vibe,
            req.priority,
            req.is_active,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ScheduleRuleDto::from(rule))))
}

/// `GET /venues/:id/schedule` — List a venue's schedule rules.
///
/// # Errors
///
/// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/venues/{id}/schedule",
    tag = "Schedule",
    summary = "List schedule rules",
    description = "Returns all rules for a venue ordered by day, start time, and priority.",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
    ),
    responses(
        (status = 200, description = "Schedule rules", body = Vec<ScheduleRuleDto>),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn list_rules(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let rules = state
        .venue_service
        .list_schedule(VenueId::from_uuid(id))
        .await?;
    let dtos: Vec<ScheduleRuleDto> = rules.into_iter().map(ScheduleRuleDto::from).collect();
    Ok(Json(dtos))
}

/// `DELETE /venues/:id/schedule/:rule_id` — Remove a schedule rule.
///
/// # Errors
///
/// Returns [`GatewayError::RuleNotFound`] or [`GatewayError::VenueNotFound`].
#[utoipa::path(
    delete,
    path = "/api/v1/venues/{id}/schedule/{rule_id}",
    tag = "Schedule",
    summary = "Delete a schedule rule",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
        ("rule_id" = uuid::Uuid, Path, description = "Rule UUID"),
    ),
    responses(
        (status = 204, description = "Rule deleted"),
        (status = 404, description = "Venue or rule not found", body = ErrorResponse),
    )
)]
pub async fn delete_rule(
    State(state): State<AppState>,
    Path((id, rule_id)): Path<(uuid::Uuid, uuid::Uuid)>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .venue_service
        .remove_schedule_rule(VenueId::from_uuid(id), RuleId::from_uuid(rule_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /venues/:id/vibe/current` — Resolve the current scheduled vibe.
///
/// # Errors
///
/// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/venues/{id}/vibe/current",
    tag = "Schedule",
    summary = "Resolve current vibe",
    description = "Resolves the venue's currently scheduled vibe. Returns null when no active rule covers the current venue-local instant.",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
    ),
    responses(
        (status = 200, description = "Resolution result", body = CurrentVibeResponse),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn current_vibe(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let now = Utc::now();
    let vibe = state
        .venue_service
        .current_vibe(VenueId::from_uuid(id), now)
        .await?;
    Ok(Json(CurrentVibeResponse {
        vibe,
        evaluated_at: now,
    }))
}

/// `GET /venues/:id/vibe/next` — Find the next scheduled vibe change.
///
/// # Errors
///
/// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/venues/{id}/vibe/next",
    tag = "Schedule",
    summary = "Next vibe change",
    description = "Returns the first upcoming rule start — later today, or walking forward day-by-day for up to a week. 204 when the venue has no active rules.",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
    ),
    responses(
        (status = 200, description = "Upcoming change", body = NextVibeChangeResponse),
        (status = 204, description = "No active rules"),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn next_vibe_change(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let change = state
        .venue_service
        .next_vibe_change(VenueId::from_uuid(id), Utc::now())
        .await?;
    match change {
        Some(change) => Ok(Json(NextVibeChangeResponse::from(change)).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Schedule routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/venues/{id}/schedule", post(create_rule).get(list_rules))
        .route("/venues/{id}/schedule/{rule_id}", axum::routing::delete(delete_rule))
        .route("/venues/{id}/vibe/current", get(current_vibe))
        .route("/venues/{id}/vibe/next", get(next_vibe_change))
}
