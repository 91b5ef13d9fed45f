//! Offer handlers: create, list, eligibility, engagement, redemption.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CreateOfferRequest, OfferDto, OfferStatsResponse, RedeemOfferRequest, RedemptionResponse,
    UpdateOfferStatusRequest,
};
use crate::app_state::AppState;
use crate::domain::{OfferId, VenueId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /venues/:id/offers` — Create an offer.
///
/// # Errors
///
/// Returns [`GatewayError`] on an inverted window or missing venue.
#[utoipa::path(
    post,
    path = "/api/v1/venues/{id}/offers",
    tag = "Offers",
    summary = "Create an offer",
    description = "Creates a promotion with an absolute availability window and a minimum-busyness requirement. The window must end after it starts.",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
    ),
    request_body = CreateOfferRequest,
    responses(
        (status = 201, description = "Offer created", body = OfferDto),
        (status = 400, description = "Invalid offer window", body = ErrorResponse),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn create_offer(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CreateOfferRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if req.title.trim().is_empty() || req.title.len() > 160 {
        return Err(GatewayError::InvalidRequest(
            "offer title must be 1-160 characters".to_string(),
        ));
    }

    let offer = state
        .offer_service
        .create_offer(
            VenueId::from_uuid(id),
            req.title,
            req.offer_type,
            req.min_busyness,
            req.starts_at,
            req.ends_at,
            req.is_active,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(OfferDto::from(offer))))
}

/// `GET /venues/:id/offers` — All offers for a venue.
///
/// # Errors
///
/// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/venues/{id}/offers",
    tag = "Offers",
    summary = "List offers",
    description = "Returns every offer for a venue regardless of eligibility, newest window first.",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
    ),
    responses(
        (status = 200, description = "Offers", body = Vec<OfferDto>),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn list_offers(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let offers = state
        .offer_service
        .list_offers(VenueId::from_uuid(id))
        .await?;
    let dtos: Vec<OfferDto> = offers.into_iter().map(OfferDto::from).collect();
    Ok(Json(dtos))
}

/// `GET /venues/:id/offers/eligible` — Offers eligible right now.
///
/// # Errors
///
/// Returns [`GatewayError::VenueNotFound`] if the venue does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/venues/{id}/offers/eligible",
    tag = "Offers",
    summary = "List eligible offers",
    description = "Filters the venue's offers to those whose window contains now and whose minimum-busyness requirement is met by the venue's current level.",
    params(
        ("id" = uuid::Uuid, Path, description = "Venue UUID"),
    ),
    responses(
        (status = 200, description = "Eligible offers", body = Vec<OfferDto>),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn eligible_offers(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let offers = state
        .offer_service
        .eligible_offers(VenueId::from_uuid(id), Utc::now())
        .await?;
    let dtos: Vec<OfferDto> = offers.into_iter().map(OfferDto::from).collect();
    Ok(Json(dtos))
}

/// `PATCH /offers/:id/status` — Toggle an offer's active flag.
///
/// # Errors
///
/// Returns [`GatewayError::OfferNotFound`] if the offer does not exist.
#[utoipa::path(
    patch,
    path = "/api/v1/offers/{id}/status",
    tag = "Offers",
    summary = "Toggle offer status",
    params(
        ("id" = uuid::Uuid, Path, description = "Offer UUID"),
    ),
    request_body = UpdateOfferStatusRequest,
    responses(
        (status = 200, description = "Updated offer", body = OfferDto),
        (status = 404, description = "Offer not found", body = ErrorResponse),
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateOfferStatusRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let offer = state
        .offer_service
        .update_status(OfferId::from_uuid(id), req.is_active)
        .await?;
    Ok(Json(OfferDto::from(offer)))
}

/// `POST /offers/:id/view` — Record one view.
///
/// # Errors
///
/// Returns [`GatewayError::OfferNotFound`] if the offer does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/view",
    tag = "Offers",
    summary = "Record a view",
    description = "Increments the view counter. Engagement counts regardless of eligibility.",
    params(
        ("id" = uuid::Uuid, Path, description = "Offer UUID"),
    ),
    responses(
        (status = 200, description = "New view count", body = serde_json::Value),
        (status = 404, description = "Offer not found", body = ErrorResponse),
    )
)]
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let count = state
        .offer_service
        .record_view(OfferId::from_uuid(id))
        .await?;
    Ok(Json(serde_json::json!({ "view_count": count })))
}

/// `POST /offers/:id/click` — Record one click.
///
/// # Errors
///
/// Returns [`GatewayError::OfferNotFound`] if the offer does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/click",
    tag = "Offers",
    summary = "Record a click",
    params(
        ("id" = uuid::Uuid, Path, description = "Offer UUID"),
    ),
    responses(
        (status = 200, description = "New click count", body = serde_json::Value),
        (status = 404, description = "Offer not found", body = ErrorResponse),
    )
)]
pub async fn record_click(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let count = state
        .offer_service
        .record_click(OfferId::from_uuid(id))
        .await?;
    Ok(Json(serde_json::json!({ "click_count": count })))
}

/// `POST /offers/:id/redeem` — Redeem an offer.
///
/// Eligibility is re-checked at the instant of redemption, not the instant
/// the client last read the offer list.
///
/// # Errors
///
/// Returns [`GatewayError::Ineligible`] with the typed reason when the
/// redemption is rejected.
#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/redeem",
    tag = "Offers",
    summary = "Redeem an offer",
    description = "Re-runs the full eligibility check at redemption time; on success appends a ledger row and increments the redemption counter atomically.",
    params(
        ("id" = uuid::Uuid, Path, description = "Offer UUID"),
    ),
    request_body = RedeemOfferRequest,
    responses(
        (status = 200, description = "Redemption recorded", body = RedemptionResponse),
        (status = 404, description = "Offer not found", body = ErrorResponse),
        (status = 422, description = "Offer inactive, outside window, or busyness not met", body = ErrorResponse),
    )
)]
pub async fn redeem_offer(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RedeemOfferRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let redemption = state
        .offer_service
        .redeem(OfferId::from_uuid(id), req.user_id, req.source, Utc::now())
        .await?;
    Ok(Json(RedemptionResponse::from(redemption)))
}

/// `GET /offers/:id/stats` — Engagement statistics.
///
/// # Errors
///
/// Returns [`GatewayError::OfferNotFound`] if the offer does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/offers/{id}/stats",
    tag = "Offers",
    summary = "Offer statistics",
    params(
        ("id" = uuid::Uuid, Path, description = "Offer UUID"),
    ),
    responses(
        (status = 200, description = "Engagement summary", body = OfferStatsResponse),
        (status = 404, description = "Offer not found", body = ErrorResponse),
    )
)]
pub async fn offer_stats(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let stats = state
        .offer_service
        .offer_stats(OfferId::from_uuid(id))
        .await?;
    Ok(Json(OfferStatsResponse::from(stats)))
}

/// Offer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/venues/{id}/offers", post(create_offer).get(list_offers))
        .route("/venues/{id}/offers/eligible", get(eligible_offers))
        .route("/offers/{id}/status", patch(update_status))
        .route("/offers/{id}/view", post(record_view))
        .route("/offers/{id}/click", post(record_click))
        .route("/offers/{id}/redeem", post(redeem_offer))
        .route("/offers/{id}/stats", get(offer_stats))
}
