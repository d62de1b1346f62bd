//! Error types for request handling and startup configuration.

use axum::http::StatusCode;
use thiserror::Error;

/// A required key was absent (or otherwise unusable) in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing field `{field}`: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            reason: "required".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Not found")]
    RouteNotFound,
    #[error("Order not found")]
    OrderNotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("request body is required")]
    EmptyBody,
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("order id {0} already exists")]
    DuplicateOrderId(String),
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
}

impl OrderError {
    /// Validation failures are 500 unless `strict_validation` is set, in
    /// which case they are reported as a client error.
    pub fn status_code(&self, strict_validation: bool) -> StatusCode {
        match self {
            OrderError::RouteNotFound | OrderError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            OrderError::Validation(_) if strict_validation => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: '{value}' is not a valid socket address")]
    InvalidAddr { var: &'static str, value: String },
    #[error("{var}: '{value}' is not a boolean (expected true/false/1/0)")]
    InvalidBool { var: &'static str, value: String },
}
