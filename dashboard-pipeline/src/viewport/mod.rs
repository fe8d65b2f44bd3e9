//! Map viewport tracking
//!
//! [`ViewportBoundsTracker`] is the only writer of the current
//! [`MapBounds`](shared::MapBounds). [`BoundsDebouncer`] is the background
//! worker behind its debounced update path.

mod tracker;

pub use tracker::{BoundsDebouncer, DEFAULT_DEBOUNCE_MS, ViewportBoundsTracker};
