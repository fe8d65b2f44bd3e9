//! Per-feature detail aggregation
//!
//! [`DetailAggregator`] is the only writer of the `DefectDetail` collection.

mod detail;

pub use detail::{DetailAggregator, LoadHandle};
