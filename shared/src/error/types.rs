//! Application error type

use super::codes::ErrorCode;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// Every failure inside the pipeline is expressed as an `AppError`. Callers
/// at the origin of a failure (tree lookup, detail fetch, bounds update)
/// decide whether to convert it into an omission; nothing here panics.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (offending path, public id, ...)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Look up a detail entry
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.as_ref().and_then(|d| d.get(key))
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create an address-not-found error for a selection path
    pub fn address_not_found(path: &[&str]) -> Self {
        let joined = path.join(" > ");
        Self::with_message(
            ErrorCode::AddressNotFound,
            format!("Address path not found: {}", joined),
        )
        .with_detail("path", joined)
    }

    /// Create an invalid address tree error
    pub fn address_tree(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AddressTreeInvalid, msg)
    }

    /// Create an invalid coordinate error
    pub fn invalid_coordinate(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidCoordinate, msg)
    }

    /// Create an invalid bounds error
    pub fn invalid_bounds(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidBounds, msg)
    }

    /// Create a network failure error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::NetworkFailure, msg)
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidResponse, msg)
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConfigError, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_message(ErrorCode::InvalidFormat, err.to_string())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
