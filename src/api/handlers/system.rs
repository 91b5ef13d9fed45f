//! System endpoints: health check and enum catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// One enum value with a short description.
#[derive(Debug, Serialize, ToSchema)]
struct CatalogValue {
    value: &'static str,
    description: &'static str,
}

/// The closed enum sets the API accepts.
#[derive(Debug, Serialize, ToSchema)]
struct CatalogResponse {
    busyness_levels: Vec<CatalogValue>,
    vibes: Vec<CatalogValue>,
    categories: Vec<CatalogValue>,
    scenario_presets: Vec<CatalogValue>,
}

/// `GET /config/catalog` — List the accepted enum values.
#[utoipa::path(
    get,
    path = "/config/catalog",
    tag = "System",
    summary = "Enum catalog",
    description = "Returns every accepted busyness level (in rank order), vibe, venue category, and scenario preset.",
    responses(
        (status = 200, description = "Enum catalog", body = CatalogResponse),
    )
)]
pub async fn catalog_handler() -> impl IntoResponse {
    let catalog = CatalogResponse {
        busyness_levels: vec![
            CatalogValue {
                value: "QUIET",
                description: "Few or no patrons (rank 1)",
            },
            CatalogValue {
                value: "MODERATE",
                description: "Steady crowd (rank 2)",
            },
            CatalogValue {
                value: "BUSY",
                description: "At or near capacity (rank 3)",
            },
        ],
        vibes: vec![
            CatalogValue {
                value: "CHILL",
                description: "Relaxed, low-key",
            },
            CatalogValue {
                value: "SOCIAL",
                description: "Conversational, mingling crowd",
            },
            CatalogValue {
                value: "PARTY",
                description: "High energy, dancing",
            },
            CatalogValue {
                value: "ROMANTIC",
                description: "Intimate, date-night",
            },
            CatalogValue {
                value: "LATE_NIGHT",
                description: "After-hours crowd",
            },
        ],
        categories: vec![
            CatalogValue {
                value: "BAR",
                description: "Happy-hour and evening curve",
            },
            CatalogValue {
                value: "CLUB",
                description: "Late-night curve",
            },
            CatalogValue {
                value: "RESTAURANT",
                description: "Lunch and dinner curve",
            },
            CatalogValue {
                value: "CASINO",
                description: "No dedicated curve; flat MODERATE",
            },
        ],
        scenario_presets: vec![
            CatalogValue {
                value: "ALL_BUSY",
                description: "Every venue BUSY / PARTY",
            },
            CatalogValue {
                value: "ALL_QUIET",
                description: "Every venue QUIET / CHILL",
            },
            CatalogValue {
                value: "VIBE_SHIFT",
                description: "Toggle each venue between CHILL and PARTY",
            },
        ],
    };
    (StatusCode::OK, Json(catalog))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/catalog", get(catalog_handler))
}
