//! Cascading address selection
//!
//! [`AddressHierarchyResolver`] owns the `(level1, level2, level3)` selection
//! and is the only writer of the resolved [`LocationRef`](shared::LocationRef).

mod resolver;

pub use resolver::{AddressHierarchyResolver, AddressSelection};
