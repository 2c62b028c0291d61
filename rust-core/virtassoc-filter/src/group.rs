// SPDX-License-Identifier: PMPL-1.0-or-later
//! Boolean filter groups.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FilterError;
use crate::predicate::Predicate;

/// Boolean operator joining the children of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOperator {
    And,
    Or,
    /// Negation of the conjunction of all children.
    NotAnd,
}

impl fmt::Display for GroupOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupOperator::And => write!(f, "AND"),
            GroupOperator::Or => write!(f, "OR"),
            GroupOperator::NotAnd => write!(f, "NOT AND"),
        }
    }
}

impl FromStr for GroupOperator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "and" => Ok(GroupOperator::And),
            "or" => Ok(GroupOperator::Or),
            "not_and" | "not" => Ok(GroupOperator::NotAnd),
            _ => Err(FilterError::UnknownOperator(s.to_string())),
        }
    }
}

/// A node of the filter tree.
///
/// Serialized untagged: predicates are recognised by their `field` key,
/// groups by `operator`. An object carrying both is rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterNode {
    Group(FilterGroup),
    Predicate(Predicate),
}

impl<'de> Deserialize<'de> for FilterNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let Some(object) = value.as_object() else {
            return Err(D::Error::custom("filter node must be a JSON object"));
        };

        let is_predicate = object.contains_key("field");
        let is_group = object.contains_key("operator") || object.contains_key("children");
        match (is_predicate, is_group) {
            (true, true) => Err(D::Error::custom(
                "filter node mixes predicate and group keys",
            )),
            (true, false) => Predicate::deserialize(value)
                .map(FilterNode::Predicate)
                .map_err(D::Error::custom),
            (false, _) => FilterGroup::deserialize(value)
                .map(FilterNode::Group)
                .map_err(D::Error::custom),
        }
    }
}

impl FilterNode {
    pub fn as_predicate(&self) -> Option<&Predicate> {
        match self {
            FilterNode::Predicate(p) => Some(p),
            FilterNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&FilterGroup> {
        match self {
            FilterNode::Group(g) => Some(g),
            FilterNode::Predicate(_) => None,
        }
    }
}

impl From<Predicate> for FilterNode {
    fn from(p: Predicate) -> Self {
        FilterNode::Predicate(p)
    }
}

impl From<FilterGroup> for FilterNode {
    fn from(g: FilterGroup) -> Self {
        FilterNode::Group(g)
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Predicate(p) => write!(f, "{p}"),
            FilterNode::Group(g) => write!(f, "{g}"),
        }
    }
}

/// An AND / OR / NOT-AND combination of predicates and nested groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterGroup {
    pub operator: GroupOperator,
    #[serde(default)]
    pub children: Vec<FilterNode>,
}

impl FilterGroup {
    pub fn new(operator: GroupOperator) -> Self {
        Self {
            operator,
            children: Vec::new(),
        }
    }

    pub fn and(children: impl IntoIterator<Item = FilterNode>) -> Self {
        Self::with_children(GroupOperator::And, children)
    }

    pub fn or(children: impl IntoIterator<Item = FilterNode>) -> Self {
        Self::with_children(GroupOperator::Or, children)
    }

    pub fn not_and(children: impl IntoIterator<Item = FilterNode>) -> Self {
        Self::with_children(GroupOperator::NotAnd, children)
    }

    pub fn with_children(
        operator: GroupOperator,
        children: impl IntoIterator<Item = FilterNode>,
    ) -> Self {
        Self {
            operator,
            children: children.into_iter().collect(),
        }
    }

    pub fn push(&mut self, node: impl Into<FilterNode>) {
        self.children.push(node.into());
    }

    /// Direct predicate children, skipping nested groups.
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.children.iter().filter_map(FilterNode::as_predicate)
    }
}

impl fmt::Display for FilterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (negate, joiner) = match self.operator {
            GroupOperator::And => (false, " AND "),
            GroupOperator::Or => (false, " OR "),
            GroupOperator::NotAnd => (true, " AND "),
        };
        if negate {
            write!(f, "NOT ")?;
        }
        write!(f, "(")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, "{joiner}")?;
            }
            write!(f, "{child}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse() {
        assert_eq!("AND".parse::<GroupOperator>().unwrap(), GroupOperator::And);
        assert_eq!("or".parse::<GroupOperator>().unwrap(), GroupOperator::Or);
        assert_eq!(
            "Not And".parse::<GroupOperator>().unwrap(),
            GroupOperator::NotAnd
        );
        assert!("xor".parse::<GroupOperator>().is_err());
    }

    #[test]
    fn test_mixed_node_keys_rejected() {
        let mixed = r#"{"field":"bar.isActive","type":"equals","value":true,"operator":"and"}"#;
        let err = serde_json::from_str::<FilterNode>(mixed).unwrap_err();
        assert!(err.to_string().contains("mixes predicate and group keys"));

        let typo = r#"{"operator":"and","childs":[{"field":"a","type":"equals","value":1}]}"#;
        assert!(serde_json::from_str::<FilterNode>(typo).is_err());
        assert!(serde_json::from_str::<FilterNode>("[1, 2]").is_err());
    }

    #[test]
    fn test_untagged_node_json() {
        let json = r#"{
            "operator": "or",
            "children": [
                {"field": "a", "type": "equals", "value": 1},
                {"operator": "not_and", "children": [{"field": "b", "type": "contains", "value": "x"}]}
            ]
        }"#;
        let node: FilterNode = serde_json::from_str(json).unwrap();
        let group = node.as_group().unwrap();
        assert_eq!(group.operator, GroupOperator::Or);
        assert!(group.children[0].as_predicate().is_some());
        assert_eq!(
            group.children[1].as_group().unwrap().operator,
            GroupOperator::NotAnd
        );
    }

    #[test]
    fn test_display() {
        let group = FilterGroup::or([
            Predicate::equals("a", 1).into(),
            FilterGroup::not_and([Predicate::equals("b", 2).into()]).into(),
        ]);
        assert_eq!(group.to_string(), "(a = 1 OR NOT (b = 2))");
    }

    #[test]
    fn test_predicates_skip_groups() {
        let group = FilterGroup::and([
            Predicate::equals("a", 1).into(),
            FilterGroup::new(GroupOperator::Or).into(),
            Predicate::equals("b", 2).into(),
        ]);
        let fields: Vec<&str> = group.predicates().map(Predicate::field).collect();
        assert_eq!(fields, vec!["a", "b"]);
    }
}
