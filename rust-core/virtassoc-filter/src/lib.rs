// SPDX-License-Identifier: PMPL-1.0-or-later
//! Virtassoc Filter
//!
//! The filter tree handed to the entity query engine.
//! Leaves are [`Predicate`]s over a dotted field path, internal nodes are
//! boolean [`FilterGroup`]s, and the root [`Specification`] additionally
//! carries named sub-specifications for associations.

pub mod entity;
pub mod error;
pub mod group;
pub mod predicate;
pub mod specification;
pub mod value;

pub use entity::Entity;
pub use error::FilterError;
pub use group::{FilterGroup, FilterNode, GroupOperator};
pub use predicate::{Predicate, PredicateKind};
pub use specification::{Predicates, Specification};
pub use value::Value;

/// Separator between the segments of a field path.
pub const PATH_SEPARATOR: char = '.';

/// Join a field prefix and a relative field name into a full path.
///
/// An empty prefix yields the name unchanged.
pub fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}{PATH_SEPARATOR}{name}")
    }
}
