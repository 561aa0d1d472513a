//! The dynamic query-construction layer: raw query-string parameters in,
//! validated filter/sort/projection descriptors out.
//!
//! Nothing in this module talks to the database; the descriptors are
//! lowered and executed by [`crate::store`].

pub mod filter;
pub mod projection;
pub mod sort;
pub mod translate;

pub use filter::{FilterCondition, FilterExpression, FilterNode, FilterValue};
pub use projection::ProjectionSpec;
pub use sort::{SortSpec, resolve_sort};
pub use translate::{translate, translate_only};
