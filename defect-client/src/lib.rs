//! Defect Client - HTTP client for the capture-point backend
//!
//! Provides the [`DefectApi`] seam used by the dashboard pipeline and its
//! reqwest-backed implementation [`HttpClient`].

pub mod api;
pub mod config;
pub mod error;
pub mod http;

pub use api::DefectApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export wire types for convenience
pub use shared::dto::{DefectDetailDto, FeatureCollectionDto, StatusUpdateRequest};
