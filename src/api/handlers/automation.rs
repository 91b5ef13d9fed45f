//! Automation handlers: manual tick triggers, scenario presets, status.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{AutomationStatusResponse, ScenarioRequest, TickReportResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::ScenarioPreset;

/// `POST /automation/tick/vibe` — Run one vibe tick immediately.
///
/// The same function the background loop calls on its interval, evaluated
/// at the current instant.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    post,
    path = "/api/v1/automation/tick/vibe",
    tag = "Automation",
    summary = "Trigger a vibe tick",
    responses(
        (status = 200, description = "Tick report", body = TickReportResponse),
    )
)]
pub async fn trigger_vibe_tick(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let now = Utc::now();
    let report = state.automation_service.run_vibe_tick(now).await;
    Ok(Json(TickReportResponse::new(report, now)))
}

/// `POST /automation/tick/busyness` — Run one busyness tick immediately.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    post,
    path = "/api/v1/automation/tick/busyness",
    tag = "Automation",
    summary = "Trigger a busyness tick",
    responses(
        (status = 200, description = "Tick report", body = TickReportResponse),
    )
)]
pub async fn trigger_busyness_tick(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let now = Utc::now();
    let report = state.automation_service.run_busyness_tick(now).await;
    Ok(Json(TickReportResponse::new(report, now)))
}

/// `POST /automation/scenario` — Apply a bulk scenario preset.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for an unknown preset name.
#[utoipa::path(
    post,
    path = "/api/v1/automation/scenario",
    tag = "Automation",
    summary = "Apply a scenario preset",
    description = "One-shot bulk write bypassing the schedule: ALL_BUSY, ALL_QUIET, or VIBE_SHIFT across every venue, refreshing both live-state timestamps.",
    request_body = ScenarioRequest,
    responses(
        (status = 200, description = "Preset report", body = TickReportResponse),
        (status = 400, description = "Unknown preset", body = ErrorResponse),
    )
)]
pub async fn apply_scenario(
    State(state): State<AppState>,
    Json(req): Json<ScenarioRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let preset: ScenarioPreset = req.preset.parse()?;
    let now = Utc::now();
    let report = state
        .automation_service
        .apply_scenario_preset(preset, now)
        .await;
    Ok(Json(TickReportResponse::new(report, now)))
}

/// `GET /automation/status` — Automation observability snapshot.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/automation/status",
    tag = "Automation",
    summary = "Automation status",
    description = "Read-only aggregation: today's active rule count, venue count, and the most recent live-state write.",
    responses(
        (status = 200, description = "Status snapshot", body = AutomationStatusResponse),
    )
)]
pub async fn automation_status(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let status = state.automation_service.automation_status(Utc::now()).await;
    Ok(Json(AutomationStatusResponse::from(status)))
}

/// Automation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/automation/tick/vibe", post(trigger_vibe_tick))
        .route("/automation/tick/busyness", post(trigger_busyness_tick))
        .route("/automation/scenario", post(apply_scenario))
        .route("/automation/status", get(automation_status))
}
