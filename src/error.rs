use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::models::request::RequestStatus;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("carrier {0} not found")]
    CarrierNotFound(uuid::Uuid),

    #[error("carrier {0} has no applicable tariff")]
    NoApplicableTariff(uuid::Uuid),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid transition: {event} from {from:?}")]
    InvalidTransition {
        from: RequestStatus,
        event: &'static str,
    },

    #[error("delivery code mismatch")]
    CodeMismatch,

    #[error("vehicle not eligible: {0}")]
    InvalidVehicle(String),

    #[error("no active vehicle in fleet")]
    NoEligibleVehicle,

    #[error("order {0} already has an open delivery request")]
    DuplicateRequest(uuid::Uuid),

    #[error("mutation already in flight for request {0}")]
    MutationInFlight(uuid::Uuid),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION",
            AppError::InvalidCoordinates(_) => "INVALID_COORDINATES",
            AppError::CarrierNotFound(_) => "CARRIER_NOT_FOUND",
            AppError::NoApplicableTariff(_) => "NO_APPLICABLE_TARIFF",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::CodeMismatch => "CODE_MISMATCH",
            AppError::InvalidVehicle(_) => "INVALID_VEHICLE",
            AppError::NoEligibleVehicle => "NO_ELIGIBLE_VEHICLE",
            AppError::DuplicateRequest(_) => "DUPLICATE_REQUEST",
            AppError::MutationInFlight(_) => "MUTATION_IN_FLIGHT",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::CarrierNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::InvalidCoordinates(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_)
            | AppError::InvalidTransition { .. }
            | AppError::DuplicateRequest(_)
            | AppError::MutationInFlight(_) => StatusCode::CONFLICT,
            AppError::CodeMismatch
            | AppError::InvalidVehicle(_)
            | AppError::NoEligibleVehicle
            | AppError::NoApplicableTariff(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "code": self.code(),
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}
