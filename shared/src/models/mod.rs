//! Data models
//!
//! Domain types shared by the client and the pipeline. Wire payloads live in
//! [`crate::dto`]; everything here is already validated and normalized.

pub mod address;
pub mod defect;
pub mod geo;
pub mod list;

// Re-exports
pub use address::*;
pub use defect::*;
pub use geo::*;
pub use list::*;
