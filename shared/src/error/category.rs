//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Address hierarchy errors
/// - 2xxx: Geo / viewport errors
/// - 3xxx: Defect data errors
/// - 9xxx (and anything unassigned): System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Address hierarchy errors (1xxx)
    Address,
    /// Geo / viewport errors (2xxx)
    Geo,
    /// Defect data errors (3xxx)
    Defect,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Address,
            2000..3000 => Self::Geo,
            3000..4000 => Self::Defect,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Address => "address",
            Self::Geo => "geo",
            Self::Defect => "defect",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Address);
        assert_eq!(ErrorCategory::from_code(2002), ErrorCategory::Geo);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Defect);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(5000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::ValidationFailed.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::AddressNotFound.category(), ErrorCategory::Address);
        assert_eq!(ErrorCode::InvalidBounds.category(), ErrorCategory::Geo);
        assert_eq!(ErrorCode::DamageNotFound.category(), ErrorCategory::Defect);
        assert_eq!(ErrorCode::NetworkFailure.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Geo).unwrap();
        assert_eq!(json, "\"geo\"");

        let category: ErrorCategory = serde_json::from_str("\"address\"").unwrap();
        assert_eq!(category, ErrorCategory::Address);
    }
}
