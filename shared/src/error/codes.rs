//! Unified error codes for the dashboard pipeline
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Address hierarchy errors
//! - 2xxx: Geo / viewport errors
//! - 3xxx: Defect data errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for compact serialization
/// and so the frontend can branch on them without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,

    // ==================== 1xxx: Address ====================
    /// Selection path does not exist in the address tree
    AddressNotFound = 1001,
    /// Address tree data is malformed
    AddressTreeInvalid = 1002,
    /// A lower level was selected before its parent
    AddressParentMissing = 1003,

    // ==================== 2xxx: Geo ====================
    /// Coordinate outside the valid latitude/longitude range
    InvalidCoordinate = 2001,
    /// Viewport bounds missing, inverted or non-finite
    InvalidBounds = 2002,

    // ==================== 3xxx: Defect ====================
    /// Damage item not present in any defect detail
    DamageNotFound = 3002,
    /// Unknown process status
    InvalidStatus = 3003,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Network request failed
    NetworkFailure = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Upstream returned an unexpected payload
    InvalidResponse = 9006,
    /// Upstream rejected the credentials
    NotAuthenticated = 9007,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",

            // Address
            ErrorCode::AddressNotFound => "Address not found",
            ErrorCode::AddressTreeInvalid => "Address tree is invalid",
            ErrorCode::AddressParentMissing => "Parent address level is not selected",

            // Geo
            ErrorCode::InvalidCoordinate => "Invalid coordinate",
            ErrorCode::InvalidBounds => "Invalid map bounds",

            // Defect
            ErrorCode::DamageNotFound => "Damage not found",
            ErrorCode::InvalidStatus => "Invalid process status",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::NetworkFailure => "Network request failed",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::InvalidResponse => "Invalid response from server",
            ErrorCode::NotAuthenticated => "Not authenticated",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),

            // Address
            1001 => Ok(ErrorCode::AddressNotFound),
            1002 => Ok(ErrorCode::AddressTreeInvalid),
            1003 => Ok(ErrorCode::AddressParentMissing),

            // Geo
            2001 => Ok(ErrorCode::InvalidCoordinate),
            2002 => Ok(ErrorCode::InvalidBounds),

            // Defect
            3002 => Ok(ErrorCode::DamageNotFound),
            3003 => Ok(ErrorCode::InvalidStatus),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9003 => Ok(ErrorCode::NetworkFailure),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::InvalidResponse),
            9007 => Ok(ErrorCode::NotAuthenticated),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
