// SPDX-License-Identifier: PMPL-1.0-or-later
//! Leaf filter conditions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Kind of condition a predicate applies to its field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredicateKind {
    /// field = value
    Equals { value: Value },
    /// field IN (values)
    EqualsAny { values: Vec<Value> },
    /// field != value
    NotEquals { value: Value },
    /// Substring match.
    Contains { value: String },
    /// Starts-with match.
    Prefix { value: String },
    /// Ends-with match.
    Suffix { value: String },
    /// Bounded range; any bound may be absent.
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gt: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gte: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lt: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lte: Option<Value>,
    },
}

impl PredicateKind {
    /// Short name of the kind, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            PredicateKind::Equals { .. } => "equals",
            PredicateKind::EqualsAny { .. } => "equals_any",
            PredicateKind::NotEquals { .. } => "not_equals",
            PredicateKind::Contains { .. } => "contains",
            PredicateKind::Prefix { .. } => "prefix",
            PredicateKind::Suffix { .. } => "suffix",
            PredicateKind::Range { .. } => "range",
        }
    }
}

/// An atomic filter condition over one field path.
///
/// Predicates are immutable; rewriting produces new predicates instead of
/// editing existing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    field: String,
    #[serde(flatten)]
    kind: PredicateKind,
}

impl Predicate {
    pub fn new(field: impl Into<String>, kind: PredicateKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(
            field,
            PredicateKind::Equals {
                value: value.into(),
            },
        )
    }

    pub fn equals_any<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::new(
            field,
            PredicateKind::EqualsAny {
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(
            field,
            PredicateKind::NotEquals {
                value: value.into(),
            },
        )
    }

    pub fn contains(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(field, PredicateKind::Contains { value: text.into() })
    }

    pub fn prefix(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(field, PredicateKind::Prefix { value: text.into() })
    }

    pub fn suffix(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(field, PredicateKind::Suffix { value: text.into() })
    }

    /// Range with inclusive bounds.
    pub fn between(
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::new(
            field,
            PredicateKind::Range {
                gt: None,
                gte: Some(low.into()),
                lt: None,
                lte: Some(high.into()),
            },
        )
    }

    /// Full dotted field path.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> &PredicateKind {
        &self.kind
    }

    /// Copy of this predicate targeting another field.
    pub fn with_field(&self, field: impl Into<String>) -> Self {
        Self::new(field, self.kind.clone())
    }

    /// Values of an equality or equality-any predicate.
    ///
    /// Returns `None` for every other kind.
    pub fn equality_values(&self) -> Option<Vec<&Value>> {
        match &self.kind {
            PredicateKind::Equals { value } => Some(vec![value]),
            PredicateKind::EqualsAny { values } => Some(values.iter().collect()),
            _ => None,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = &self.field;
        match &self.kind {
            PredicateKind::Equals { value } => write!(f, "{field} = {value}"),
            PredicateKind::EqualsAny { values } => {
                write!(f, "{field} IN {}", Value::List(values.clone()))
            }
            PredicateKind::NotEquals { value } => write!(f, "{field} != {value}"),
            PredicateKind::Contains { value } => write!(f, "{field} CONTAINS '{value}'"),
            PredicateKind::Prefix { value } => write!(f, "{field} STARTS WITH '{value}'"),
            PredicateKind::Suffix { value } => write!(f, "{field} ENDS WITH '{value}'"),
            PredicateKind::Range { gt, gte, lt, lte } => {
                let bounds: Vec<String> = [(">", gt), (">=", gte), ("<", lt), ("<=", lte)]
                    .into_iter()
                    .filter_map(|(op, bound)| bound.as_ref().map(|v| format!("{field} {op} {v}")))
                    .collect();
                if bounds.is_empty() {
                    write!(f, "{field} IN RANGE (unbounded)")
                } else {
                    write!(f, "{}", bounds.join(" AND "))
                }
            }
        }
    }
}
