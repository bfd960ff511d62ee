//! Error types shared by services and handlers.
//!
//! Every service operation returns `Result<T, ApiError>`. The handler layer
//! hands the error straight back to actix, which renders it through
//! [`ResponseError`] as `{"success": false, "error": "..."}`.

use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::cache::CacheError;
use crate::credentials::CredentialError;
use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or expired credential, or insufficient role.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Business rule violation: duplicate account, out-of-stock product.
    #[error("{0}")]
    Conflict(String),

    #[error("operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("persistence failure: {0}")]
    Store(#[from] StoreError),

    #[error("cache failure: {0}")]
    Cache(#[from] CacheError),

    #[error("credential failure: {0}")]
    Credential(#[from] CredentialError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Cache(_) | Self::Credential(_))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Store(_) | Self::Cache(_) | Self::Credential(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal details stay in the log
        let message = if self.is_internal() {
            log::error!("request failed: {}", self);
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": message,
        }))
    }
}
