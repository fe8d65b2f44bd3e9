//! Unified error system for the dashboard pipeline
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Address hierarchy errors
//! - 2xxx: Geo / viewport errors
//! - 3xxx: Defect data errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::address_not_found(&["대전광역시", "없는구"]);
//! assert_eq!(err.code, ErrorCode::AddressNotFound);
//!
//! let err = AppError::validation("items_per_page must be positive")
//!     .with_detail("field", "items_per_page");
//! assert!(err.details.is_some());
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
