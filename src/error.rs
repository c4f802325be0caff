use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Error response type
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Custom error type for API endpoints
///
/// Maps each failure of the bus-details endpoints to its HTTP status code
/// and renders it as a JSON `{"detail": ...}` body.
#[derive(Debug)]
pub enum ApiError {
    /// The path or body could not be extracted; keeps axum's status
    InvalidRequest { status: StatusCode, detail: String },
    /// `date_field` is not a `DD-MM-YYYY` date
    InvalidDate(String),
    /// A record with the same vehicle and date already exists
    Conflict { vehicle_id: i64, date_field: String },
    /// No record matches the vehicle (and date, when given)
    NotFound {
        vehicle_id: i64,
        date_field: Option<String>,
    },
    /// Store operation error
    DatabaseError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::InvalidRequest { status, detail } => (status, detail),
            ApiError::InvalidDate(date) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid Date: expected DD-MM-YYYY between 2000 and 2099, got '{}'", date),
            ),
            ApiError::Conflict {
                vehicle_id,
                date_field,
            } => (
                StatusCode::CONFLICT,
                format!(
                    "Bus with same vehicle_id and date field exist: vehicle_id={}, date_field={}",
                    vehicle_id, date_field
                ),
            ),
            ApiError::NotFound {
                vehicle_id,
                date_field,
            } => (
                StatusCode::NOT_FOUND,
                match date_field {
                    Some(date) => format!(
                        "Vehicle ID/Date Field not found: vehicle_id={}, date_field={}",
                        vehicle_id, date
                    ),
                    None => format!("Vehicle ID/Date Field not found: vehicle_id={}", vehicle_id),
                },
            ),
            ApiError::DatabaseError(err) => {
                tracing::error!("Store operation failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", err),
                )
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::info!("Rejected request body: {}", rejection.body_text());
        ApiError::InvalidRequest {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::info!("Rejected path parameters: {}", rejection.body_text());
        ApiError::InvalidRequest {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}
