//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Eligibility failures nest the typed [`EligibilityError`] so callers can
//! branch on the reason; transient persistence failures map to 503 and are
//! safe to retry, unlike the eligibility outcomes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::eligibility::EligibilityError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "venue not found: ...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                |
/// |-----------|-------------------|----------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request            |
/// | 2000–2999 | Not Found         | 404 Not Found              |
/// | 3000–3999 | Server/Transient  | 500 / 503                  |
/// | 4000–4999 | Eligibility       | 422 Unprocessable Entity   |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Venue with the given ID was not found.
    #[error("venue not found: {0}")]
    VenueNotFound(uuid::Uuid),

    /// Offer with the given ID was not found.
    #[error("offer not found: {0}")]
    OfferNotFound(uuid::Uuid),

    /// Schedule rule with the given ID was not found.
    #[error("schedule rule not found: {0}")]
    RuleNotFound(uuid::Uuid),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An offer failed the redemption-time eligibility check. Expected,
    /// recoverable outcome; never logged as a server error.
    #[error("offer not eligible: {0}")]
    Ineligible(#[from] EligibilityError),

    /// Persistence layer failure. Transient; the caller may retry.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::VenueNotFound(_) => 2001,
            Self::OfferNotFound(_) => 2002,
            Self::RuleNotFound(_) => 2003,
            Self::Ineligible(reason) => match reason {
                EligibilityError::OfferNotFound => 2002,
                EligibilityError::OfferInactive => 4001,
                EligibilityError::OutsideWindow => 4002,
                EligibilityError::BusynessNotMet => 4003,
            },
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::VenueNotFound(_) | Self::OfferNotFound(_) | Self::RuleNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Ineligible(reason) => match reason {
                EligibilityError::OfferNotFound => StatusCode::NOT_FOUND,
                EligibilityError::OfferInactive
                | EligibilityError::OutsideWindow
                | EligibilityError::BusynessNotMet => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::PersistenceError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
