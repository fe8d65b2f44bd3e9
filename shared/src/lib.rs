//! Shared types for the road defect dashboard
//!
//! Domain types, capture-point API wire types and the unified error
//! system used by `defect-client` and `dashboard-pipeline`.

pub mod dto;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};

pub use models::{
    AddressNode, AddressTree, CoordinateOrder, DamageItem, DefectDetail, DefectListItem,
    FeaturePoint, GeoPoint, Latitude, ListFilter, LocationRef, Longitude, MapBounds,
    ProcessStatus, ResolvedBounds, Severity, SortColumn, SortDirection,
};
