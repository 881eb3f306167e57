//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use service::ServiceError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Resource not found.
    NotFound(String),
    /// Use-case failure.
    Service(ServiceError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Service(err) => service_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, String) {
    match &err {
        ServiceError::MemberNotFound(_)
        | ServiceError::ItemNotFound(_)
        | ServiceError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::DuplicateMemberName(_) => (StatusCode::CONFLICT, err.to_string()),
        ServiceError::Domain(domain_err) => match domain_err {
            DomainError::InsufficientStock { .. } | DomainError::InvalidState { .. } => {
                (StatusCode::CONFLICT, err.to_string())
            }
        },
        ServiceError::Store(store_err) => match store_err {
            StoreError::InsufficientStock { .. } | StoreError::OrderNotCancellable { .. } => {
                (StatusCode::CONFLICT, err.to_string())
            }
            StoreError::Database(_) | StoreError::Decode(_) => {
                tracing::error!(error = %err, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        },
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Service(ServiceError::Store(err))
    }
}
