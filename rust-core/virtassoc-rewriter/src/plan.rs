// SPDX-License-Identifier: PMPL-1.0-or-later
//! Injection plan: pending rewrites applied in one batched pass.

use std::sync::Arc;

use tracing::{debug, error};
use virtassoc_filter::{FilterNode, Predicate, PATH_SEPARATOR};

use crate::container::{self, ContainerPath};
use crate::context::InjectionContext;
use crate::error::RewriteError;
use crate::report::{BatchSummary, InjectionSummary, RewriteReport};
use crate::resolver::ErasedResolver;

/// One container's matched predicates for one `(prefix, association)` pair.
#[derive(Debug)]
pub struct InjectionPoint {
    pub(crate) container: ContainerPath,
    pub(crate) prefix: String,
    pub(crate) association: String,
    pub(crate) resolver: Arc<dyn ErasedResolver>,
    pub(crate) predicates: Vec<Predicate>,
}

impl InjectionPoint {
    pub fn container(&self) -> &ContainerPath {
        &self.container
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn association(&self) -> &str {
        &self.association
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Reject replacements that escape this point's prefix.
    fn check_prefix(&self, replacement: &Predicate) -> Result<(), RewriteError> {
        if self.prefix.is_empty() {
            return Ok(());
        }
        let field = replacement.field();
        let within = field.len() > self.prefix.len()
            && field.starts_with(self.prefix.as_str())
            && field[self.prefix.len()..].starts_with(PATH_SEPARATOR);
        if within {
            return Ok(());
        }
        error!(
            association = %self.association,
            prefix = %self.prefix,
            field = %field,
            "Resolver produced a replacement predicate outside its prefix"
        );
        Err(RewriteError::InternalInvariantViolation(format!(
            "resolver \"{}\" produced predicate on \"{}\" outside prefix \"{}\"",
            self.association, field, self.prefix
        )))
    }
}

/// All injection points registered by one rewrite pass.
#[derive(Debug, Default)]
pub struct InjectionPlan {
    points: Vec<InjectionPoint>,
}

impl InjectionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, point: InjectionPoint) {
        debug_assert!(!point.predicates.is_empty());
        self.points.push(point);
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[InjectionPoint] {
        &self.points
    }

    /// Point indices grouped by association, in first-seen order.
    fn batches(&self) -> Vec<(&str, Vec<usize>)> {
        let mut batches: Vec<(&str, Vec<usize>)> = Vec::new();
        for (index, point) in self.points.iter().enumerate() {
            match batches
                .iter_mut()
                .find(|(association, _)| *association == point.association)
            {
                Some((_, indices)) => indices.push(index),
                None => batches.push((point.association.as_str(), vec![index])),
            }
        }
        batches
    }

    /// Generate replacement predicates and append them to their containers.
    ///
    /// Each resolver is preprocessed once with the contexts of all its
    /// points, then asked for replacements point by point.
    pub(crate) fn apply(&self, filters: &mut Vec<FilterNode>) -> Result<RewriteReport, RewriteError> {
        let mut report = RewriteReport::default();
        if self.is_empty() {
            return Ok(report);
        }

        for (association, indices) in self.batches() {
            let contexts = indices
                .iter()
                .map(|&index| {
                    let point = &self.points[index];
                    let siblings = container::predicates_at(filters, &point.container)
                        .ok_or_else(|| missing_container(point))?
                        .into_iter()
                        .cloned()
                        .collect();
                    Ok(InjectionContext::new(point, siblings))
                })
                .collect::<Result<Vec<_>, RewriteError>>()?;

            debug!(
                association,
                injection_points = contexts.len(),
                "Applying virtual association batch"
            );

            let resolver = &self.points[indices[0]].resolver;
            resolver.run_batch(&contexts, &mut |position, replacements| {
                let point = &self.points[indices[position]];
                for replacement in &replacements {
                    point.check_prefix(replacement)?;
                }
                let mut target = container::locate(filters, &point.container)
                    .ok_or_else(|| missing_container(point))?;
                report.injections.push(InjectionSummary::new(point, &replacements));
                for replacement in replacements {
                    target.push(replacement);
                }
                Ok(())
            })?;

            report.batches.push(BatchSummary {
                association: association.to_string(),
                injection_points: indices.len(),
            });
        }

        report.rewritten = true;
        Ok(report)
    }
}

fn missing_container(point: &InjectionPoint) -> RewriteError {
    RewriteError::InternalInvariantViolation(format!(
        "container {} for \"{}\" no longer exists",
        point.container, point.association
    ))
}
