//! Dashboard Pipeline - geospatial sync for the road defect dashboard
//!
//! # Overview
//!
//! Keeps four independently updated pieces of state consistent:
//!
//! - **address** (`address`): cascading province > city > district selection
//!   that yields the `LocationRef` the map centers on
//! - **viewport** (`viewport`): the visible map rectangle, immediate and
//!   debounced
//! - **spatial** (`spatial`): the geo set and the features inside the viewport
//! - **aggregator** (`aggregator`): one defect detail per feature, fetched
//!   per generation
//!
//! and derives the sorted, paginated defect list from them (`listing`).
//!
//! # Module structure
//!
//! ```text
//! dashboard-pipeline/src/
//! ├── core/          # config, state container, background tasks
//! ├── address/       # AddressHierarchyResolver
//! ├── viewport/      # ViewportBoundsTracker + debouncer
//! ├── spatial/       # GeoSet, SpatialFeatureFilter
//! ├── aggregator/    # DetailAggregator
//! ├── listing/       # ListPaginationStore, rows, pages
//! └── utils/         # logging
//! ```

pub mod address;
pub mod aggregator;
pub mod core;
pub mod listing;
pub mod spatial;
pub mod utils;
pub mod viewport;

// Re-export public types
pub use address::{AddressHierarchyResolver, AddressSelection};
pub use aggregator::{DetailAggregator, LoadHandle};
pub use core::{BackgroundTasks, Config, DashboardState, ListPage, TaskKind};
pub use listing::ListPaginationStore;
pub use spatial::{GeoSet, SpatialFeatureFilter};
pub use viewport::ViewportBoundsTracker;

// Re-export unified error types from shared
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
