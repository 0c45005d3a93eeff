//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use delivery::DeliveryError;
use directory::DirectoryError;
use orders::OrderError;

/// API-level error type that maps the domain taxonomy to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The operation conflicts with the record's current state.
    Conflict(String),
    /// A collaborating service is unreachable.
    Unavailable(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match &err {
            DirectoryError::CustomerNotFound(_) | DirectoryError::ProductNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            DirectoryError::ConnectionFailure { .. } => ApiError::Unavailable(err.to_string()),
            DirectoryError::Unknown(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(_) => ApiError::NotFound(err.to_string()),
            OrderError::AlreadySent(_) => ApiError::Conflict(err.to_string()),
            OrderError::InvalidQuantity(_) | OrderError::ProductUnavailable(_) => {
                ApiError::BadRequest(err.to_string())
            }
            OrderError::Directory(inner) => inner.into(),
            OrderError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<DeliveryError> for ApiError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::DeliveryNotFound(_) | DeliveryError::NoCanceledDeliveries => {
                ApiError::NotFound(err.to_string())
            }
            DeliveryError::AlreadyShipped(_) | DeliveryError::AlreadyCanceled(_) => {
                ApiError::Conflict(err.to_string())
            }
            DeliveryError::Directory(inner) => inner.into(),
            DeliveryError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}
