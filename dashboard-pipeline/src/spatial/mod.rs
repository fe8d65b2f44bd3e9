//! Geo set ownership and viewport filtering

mod filter;
mod geo_set;

pub use filter::{SpatialFeatureFilter, filter_visible, is_visible};
pub use geo_set::GeoSet;
