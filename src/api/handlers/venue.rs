//! Venue handlers: create, list, get, delete, live state.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CreateVenueRequest, CreateVenueResponse, LiveStateDto, OverrideLiveStateRequest,
    PaginationMeta, PaginationParams, VenueListResponse, VenueSummaryDto,
};
use crate::app_state::AppState;
use crate::domain::VenueId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /venues` — Create a new venue.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid input.
#[utoipa::path(
    post,
    path = "/api/v1/venues",
    tag = "Venues",
    summary = "Create a new venue",
    description = "Creates a venue with default live state (QUIET busyness, CHILL vibe). The category selects the busyness simulation curve.",
    request_body = CreateVenueRequest,
    responses(
        (status = 201, description = "Venue created successfully", body = CreateVenueResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_venue(
    State(state): State<AppState>,
    Json(req): Json<CreateVenueRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if req.name.trim().is_empty() || req.name.len() > 120 {
        return Err(GatewayError::InvalidRequest(
            "venue name must be 1-120 characters".to_string(),
        ));
    }

    let venue_id = state
        .venue_service
        .create_venue(req.name.clone(), req.category)
        .await?;

    let response = CreateVenueResponse {
        venue_id,
        name: req.name,
        category: req.category,
        created_at: Utc::now(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /venues` — List all venues with pagination.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/venues",
    tag = "Venues",
    summary = "List venues",
    description = "Returns a paginated list of all venues with their current live state.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated venue list", body = VenueListResponse),
    )
)]
pub async fn list_venues(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let params = params.clamped();
    let mut summaries = state.venue_service.list_venues().await;
    summaries.sort_by(|a, b| a.name.cmp(&b.name));

    #[allow(clippy::cast_possible_truncation)]
    let total = summaries.len() as u32;
    let per_page = params.per_page;
    let page = params.page;
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };

    let start = ((page - 1) * per_page) as usize;
    let data: Vec<VenueSummaryDto> = summaries
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .map(VenueSummaryDto::from)
        .collect();

    Ok(Json(VenueListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /venues/:id` — Get venue details.
///
/// # Errors
///
/// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/venues/{id}",
    tag = "Venues",
    summary = "Get venue details",
    description = "Returns one venue with its current live state, rule count, and offer count.",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
    ),
    responses(
        (status = 200, description = "Venue details", body = VenueSummaryDto),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let summary = state
        .venue_service
        .get_venue(VenueId::from_uuid(id))
        .await?;
    Ok(Json(VenueSummaryDto::from(summary)))
}

/// `DELETE /venues/:id` — Remove a venue.
///
/// # Errors
///
/// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/venues/{id}",
    tag = "Venues",
    summary = "Delete a venue",
    description = "Removes a venue together with its schedule, offers, and redemption ledger.",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
    ),
    responses(
        (status = 204, description = "Venue deleted"),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn delete_venue(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .venue_service
        .remove_venue(VenueId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /venues/:id/live-state` — Current live state.
///
/// # Errors
///
/// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/venues/{id}/live-state",
    tag = "Venues",
    summary = "Get live state",
    description = "Returns the venue's current busyness and vibe with per-field change timestamps.",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
    ),
    responses(
        (status = 200, description = "Current live state", body = LiveStateDto),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn get_live_state(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let live = state
        .venue_service
        .live_state(VenueId::from_uuid(id))
        .await?;
    Ok(Json(LiveStateDto::from(live)))
}

/// `PUT /venues/:id/live-state` — Manual live-state override.
///
/// # Errors
///
/// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
#[utoipa::path(
    put,
    path = "/api/v1/venues/{id}/live-state",
    tag = "Venues",
    summary = "Override live state",
    description = "Administrative override bypassing the schedule. Only the fields present in the body are updated, each as a (value, timestamp) pair.",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
    ),
    request_body = OverrideLiveStateRequest,
    responses(
        (status = 200, description = "Updated live state", body = LiveStateDto),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn override_live_state(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<OverrideLiveStateRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let live = state
        .venue_service
        .override_live_state(VenueId::from_uuid(id), req.busyness, req.vibe, Utc::now())
        .await?;
    Ok(Json(LiveStateDto::from(live)))
}

/// Venue management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/venues", axum::routing::post(create_venue).get(list_venues))
        .route("/venues/{id}", get(get_venue).delete(delete_venue))
        .route(
            "/venues/{id}/live-state",
            get(get_live_state).put(override_live_state),
        )
}
