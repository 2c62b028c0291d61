// SPDX-License-Identifier: PMPL-1.0-or-later
//! Loaded entities that computed associations are attached to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// An entity as loaded by the query engine.
///
/// `computed` holds virtual association data attached after loading, keyed
/// by association name, so it reads like an ordinary loaded relation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub computed: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_computed(&mut self, association: impl Into<String>, value: impl Into<Value>) {
        self.computed.insert(association.into(), value.into());
    }

    pub fn computed(&self, association: &str) -> Option<&Value> {
        self.computed.get(association)
    }
}
