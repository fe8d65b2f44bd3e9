//! Core module - configuration, runtime state and background tasks
//!
//! # Module structure
//!
//! - [`Config`] - pipeline configuration
//! - [`DashboardState`] - explicit state container for the pipeline components
//! - [`BackgroundTasks`] - long-running task registry

pub mod config;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use state::{DashboardState, ListPage};
pub use tasks::{BackgroundTasks, TaskKind};
