use actix_web::http::StatusCode;
use actix_web::{error, HttpRequest, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerError;

/// Error body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by the HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Customer ID must be a valid UUID")]
    InvalidId,

    #[error(transparent)]
    Customer(#[from] CustomerError),
}

impl ApiError {
    /// Outcome label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidId => "invalid_id",
            ApiError::Customer(err) => err.kind(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId => StatusCode::BAD_REQUEST,
            ApiError::Customer(CustomerError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Customer(CustomerError::EmailConflict(_)) => StatusCode::CONFLICT,
            ApiError::Customer(CustomerError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Customer(CustomerError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::InvalidId => ErrorResponse::new("Invalid customer ID", self.to_string()),
            ApiError::Customer(err @ CustomerError::Validation(_)) => {
                ErrorResponse::new("Validation failed", err.to_string())
            }
            ApiError::Customer(err @ CustomerError::EmailConflict(_)) => {
                ErrorResponse::new("Email already registered", err.to_string())
            }
            ApiError::Customer(err @ CustomerError::NotFound(_)) => {
                ErrorResponse::new("Customer not found", err.to_string())
            }
            ApiError::Customer(CustomerError::Internal(source)) => {
                tracing::error!(error = %format!("{source:#}"), "Request failed with internal error");
                ErrorResponse::new("Internal server error", "An unexpected error occurred")
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// 400 for request bodies that fail to deserialize
pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorResponse::new("Invalid request body", err.to_string());
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// 400 for query strings that fail to deserialize
pub fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorResponse::new("Invalid query parameters", err.to_string());
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}
