//! Mapping of market errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use moneypot_core::MarketError;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by API handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Market(#[from] MarketError),

    #[error("missing x-caller header")]
    MissingCaller,

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCaller => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Market(err) => match err {
                MarketError::NotFound { .. } => StatusCode::NOT_FOUND,
                MarketError::Unauthorized { .. } | MarketError::CreatorCannotAttempt { .. } => {
                    StatusCode::FORBIDDEN
                }
                MarketError::InvalidFee { .. } | MarketError::InvalidConfig(_) => {
                    StatusCode::BAD_REQUEST
                }
                MarketError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
                MarketError::PotNotActive { .. }
                | MarketError::PotExpired { .. }
                | MarketError::NotYetExpired { .. }
                | MarketError::AttemptExpired { .. }
                | MarketError::AttemptAlreadyCompleted { .. } => StatusCode::CONFLICT,
                MarketError::Overflow(_) | MarketError::Transfer(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Market(err) => err.code(),
            ApiError::MissingCaller => "missing_caller",
            ApiError::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;
