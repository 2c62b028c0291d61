// SPDX-License-Identifier: PMPL-1.0-or-later
//! Read-only view handed to resolvers for one injection point.

use virtassoc_filter::{join_path, Predicate, Value};

use crate::container::ContainerPath;
use crate::error::RewriteError;
use crate::plan::InjectionPoint;

/// Everything a resolver may look at when rewriting one injection point.
///
/// `predicates` are the virtual predicates matched in one container for one
/// `(prefix, association)` pair. `parent_predicates` are the ordinary
/// predicates left in that same container after the rewrite, which lets a
/// resolver correlate with conditions on the parent entity.
#[derive(Debug)]
pub struct InjectionContext<'a> {
    point: &'a InjectionPoint,
    parent_predicates: Vec<Predicate>,
}

impl<'a> InjectionContext<'a> {
    pub(crate) fn new(point: &'a InjectionPoint, parent_predicates: Vec<Predicate>) -> Self {
        Self {
            point,
            parent_predicates,
        }
    }

    /// Path segments preceding the association name; empty at the root entity.
    pub fn field_prefix(&self) -> &str {
        &self.point.prefix
    }

    pub fn association_name(&self) -> &str {
        &self.point.association
    }

    pub fn container_path(&self) -> &ContainerPath {
        &self.point.container
    }

    /// All matched virtual predicates, in tree order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.point.predicates
    }

    /// Full path of a virtual field at this point (`<prefix.>assoc.name`).
    pub fn virtual_field_path(&self, name: &str) -> String {
        join_path(&join_path(&self.point.prefix, &self.point.association), name)
    }

    /// Full path of a real field on the parent entity (`<prefix.>name`).
    pub fn parent_field_path(&self, name: &str) -> String {
        join_path(&self.point.prefix, name)
    }

    /// Matched predicates on the virtual field `name`.
    pub fn predicates_on_virtual_field(&self, name: &str) -> Vec<&Predicate> {
        let path = self.virtual_field_path(name);
        self.point
            .predicates
            .iter()
            .filter(|p| p.field() == path)
            .collect()
    }

    /// Values of every equality predicate on the virtual field `name`.
    pub fn equality_values_on_virtual_field(&self, name: &str) -> Result<Vec<&Value>, RewriteError> {
        equality_values(self.predicates_on_virtual_field(name))
    }

    /// Ordinary predicates in the same container on the parent field `name`.
    pub fn predicates_on_parent_field(&self, name: &str) -> Vec<&Predicate> {
        let path = self.parent_field_path(name);
        self.parent_predicates
            .iter()
            .filter(|p| p.field() == path)
            .collect()
    }

    pub fn equality_values_on_parent_field(&self, name: &str) -> Result<Vec<&Value>, RewriteError> {
        equality_values(self.predicates_on_parent_field(name))
    }
}

fn equality_values<'p>(
    predicates: impl IntoIterator<Item = &'p Predicate>,
) -> Result<Vec<&'p Value>, RewriteError> {
    let mut values = Vec::new();
    for predicate in predicates {
        match predicate.equality_values() {
            Some(found) => values.extend(found),
            None => {
                return Err(RewriteError::UnsupportedPredicateType {
                    field: predicate.field().to_string(),
                    kind: predicate.kind().name(),
                })
            }
        }
    }
    Ok(values)
}
