//! Property inspection — a filtered, sorted view of an object's properties.
//!
//! Independent of the language model; symbols, members and generator
//! options implement [`Inspectable`] so a host can show them in a grid.

mod filtered;
mod model;

pub use filtered::{FilterError, FilteredView, Inspectable, PropertyDescriptor, compare_descriptors};
