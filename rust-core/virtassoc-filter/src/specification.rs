// SPDX-License-Identifier: PMPL-1.0-or-later
//! Root query specification.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::group::FilterNode;
use crate::predicate::Predicate;

fn default_fast_path() -> bool {
    true
}

/// A query specification: top-level filters plus named association
/// sub-specifications.
///
/// The top-level filter list is an implicit conjunction. Each association
/// carries a full specification of its own, so associations nest
/// arbitrarily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    #[serde(default)]
    filters: Vec<FilterNode>,
    #[serde(default)]
    associations: BTreeMap<String, Specification>,
    /// Whether the execution engine may take its fast (cacheable) path.
    #[serde(default = "default_fast_path")]
    fast_path: bool,
}

impl Default for Specification {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            associations: BTreeMap::new(),
            fast_path: true,
        }
    }
}

impl Specification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style filter append.
    pub fn with_filter(mut self, node: impl Into<FilterNode>) -> Self {
        self.filters.push(node.into());
        self
    }

    /// Builder-style association attach.
    pub fn with_association(mut self, name: impl Into<String>, spec: Specification) -> Self {
        self.associations.insert(name.into(), spec);
        self
    }

    pub fn add_filter(&mut self, node: impl Into<FilterNode>) {
        self.filters.push(node.into());
    }

    pub fn filters(&self) -> &[FilterNode] {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut Vec<FilterNode> {
        &mut self.filters
    }

    /// Replace the whole top-level filter list, returning the previous one.
    pub fn replace_filters(&mut self, filters: Vec<FilterNode>) -> Vec<FilterNode> {
        std::mem::replace(&mut self.filters, filters)
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Sub-specification for `name`, created empty if absent.
    pub fn association_mut(&mut self, name: &str) -> &mut Specification {
        self.associations.entry(name.to_string()).or_default()
    }

    pub fn association(&self, name: &str) -> Option<&Specification> {
        self.associations.get(name)
    }

    /// Walk a dotted association path (`order.customer`).
    pub fn association_path(&self, path: &str) -> Option<&Specification> {
        path.split(crate::PATH_SEPARATOR)
            .try_fold(self, |spec, name| spec.association(name))
    }

    pub fn associations(&self) -> &BTreeMap<String, Specification> {
        &self.associations
    }

    pub fn is_fast_path(&self) -> bool {
        self.fast_path
    }

    pub fn disable_fast_path(&mut self) {
        self.fast_path = false;
    }

    /// Depth-first iterator over every predicate of the top-level filters.
    pub fn predicates(&self) -> Predicates<'_> {
        Predicates {
            stack: self.filters.iter().rev().collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, FilterError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filters.is_empty() {
            write!(f, "(no filters)")?;
        }
        for (i, node) in self.filters.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{node}")?;
        }
        for (name, sub) in &self.associations {
            write!(f, " [{name}: {sub}]")?;
        }
        Ok(())
    }
}

/// Iterator returned by [`Specification::predicates`].
pub struct Predicates<'a> {
    stack: Vec<&'a FilterNode>,
}

impl<'a> Iterator for Predicates<'a> {
    type Item = &'a Predicate;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                FilterNode::Predicate(p) => return Some(p),
                FilterNode::Group(g) => self.stack.extend(g.children.iter().rev()),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::FilterGroup;

    fn sample() -> Specification {
        Specification::new()
            .with_filter(Predicate::equals("a", 1))
            .with_filter(FilterGroup::or([
                Predicate::equals("b", 2).into(),
                FilterGroup::and([Predicate::equals("c", 3).into()]).into(),
            ]))
            .with_filter(Predicate::equals("d", 4))
    }

    #[test]
    fn test_predicates_depth_first_order() {
        let spec = sample();
        let fields: Vec<&str> = spec.predicates().map(Predicate::field).collect();
        assert_eq!(fields, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_fast_path_default_and_disable() {
        let mut spec = Specification::new();
        assert!(spec.is_fast_path());
        spec.disable_fast_path();
        assert!(!spec.is_fast_path());
    }

    #[test]
    fn test_association_path() {
        let mut spec = Specification::new();
        spec.association_mut("order")
            .association_mut("customer")
            .add_filter(Predicate::equals("active", true));

        let customer = spec.association_path("order.customer").unwrap();
        assert!(customer.has_filters());
        assert!(spec.association_path("order.missing").is_none());
    }

    #[test]
    fn test_json_defaults() {
        let spec = Specification::from_json(r#"{"filters":[{"field":"a","type":"equals","value":1}]}"#)
            .unwrap();
        assert!(spec.is_fast_path());
        assert!(spec.associations().is_empty());
        assert_eq!(spec.filters().len(), 1);

        let back = Specification::from_json(&spec.to_json().unwrap()).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_json_rejects_ambiguous_filter() {
        let json = r#"{"filters":[{"field":"bar.isActive","type":"equals","value":true,"operator":"and"}]}"#;
        let err = Specification::from_json(json).unwrap_err();
        assert!(matches!(err, FilterError::Serialization(_)));
    }

    #[test]
    fn test_display() {
        let spec = Specification::new()
            .with_filter(Predicate::equals("a", 1))
            .with_association("bar", Specification::new());
        assert_eq!(spec.to_string(), "a = 1 [bar: (no filters)]");
    }
}
