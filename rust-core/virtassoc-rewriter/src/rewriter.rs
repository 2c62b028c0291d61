// SPDX-License-Identifier: PMPL-1.0-or-later
//! Filter tree rewriter for virtual association predicates.

use std::sync::Arc;

use tracing::{debug, trace};
use virtassoc_filter::{FilterNode, Predicate, Specification};

use crate::config::RewriterConfig;
use crate::container::{Container, ContainerPath};
use crate::error::RewriteError;
use crate::path::{parse_virtual_field, VirtualField};
use crate::plan::{InjectionPlan, InjectionPoint};
use crate::registry::ResolverRegistry;
use crate::report::RewriteReport;

/// Virtual predicates of one container, keyed by `(prefix, association)`
/// in first-seen order.
#[derive(Default)]
struct Buckets(Vec<(String, String, Vec<Predicate>)>);

impl Buckets {
    fn add(&mut self, virtual_field: VirtualField, predicate: Predicate) {
        let VirtualField {
            prefix, association, ..
        } = virtual_field;
        match self
            .0
            .iter_mut()
            .find(|(p, a, _)| *p == prefix && *a == association)
        {
            Some((_, _, predicates)) => predicates.push(predicate),
            None => self.0.push((prefix, association, vec![predicate])),
        }
    }
}

/// Rewrites filters on virtual associations into real predicates.
///
/// `resolve` is all-or-nothing: the top-level filters are rewritten in a
/// private copy that replaces the specification's filters only when every
/// step succeeded.
pub struct Rewriter {
    registry: Arc<ResolverRegistry>,
    config: RewriterConfig,
}

impl Rewriter {
    pub fn new(registry: Arc<ResolverRegistry>) -> Self {
        Self::with_config(registry, RewriterConfig::default())
    }

    pub fn with_config(registry: Arc<ResolverRegistry>, config: RewriterConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    /// Validate and rewrite `spec` in place.
    ///
    /// On success every virtual predicate of the top-level filters has been
    /// replaced and, if anything was rewritten, the fast path is disabled.
    /// On failure `spec` is left exactly as it was.
    pub fn resolve(&self, spec: &mut Specification) -> Result<RewriteReport, RewriteError> {
        self.validate(spec)?;

        let mut working = spec.filters().to_vec();
        let mut plan = InjectionPlan::new();
        self.rewrite(Container::Root(&mut working), &ContainerPath::root(), &mut plan)?;

        if plan.is_empty() {
            trace!("No virtual association filters to rewrite");
            return Ok(RewriteReport::unchanged());
        }

        debug!(
            injection_points = plan.len(),
            "Rewriting virtual association filters"
        );
        let report = plan.apply(&mut working)?;

        spec.disable_fast_path();
        spec.replace_filters(working);
        debug!(
            matched = report.matched_count(),
            batches = report.batches.len(),
            "Virtual association filters rewritten"
        );
        Ok(report)
    }

    /// Reject filters attached directly to a virtual association's
    /// sub-specification, at any association depth.
    pub fn validate(&self, spec: &Specification) -> Result<(), RewriteError> {
        for (name, sub) in spec.associations() {
            if self.registry.contains(name) && sub.has_filters() {
                return Err(RewriteError::FiltersOnVirtualAssociationNotSupported(
                    name.clone(),
                ));
            }
            self.validate(sub)?;
        }
        Ok(())
    }

    /// Rewrite one container and, recursively, its nested groups.
    ///
    /// Ordinary predicates and groups go back into the container in their
    /// original order. Virtual predicates are held back and registered in
    /// `plan` as one injection point per `(prefix, association)`.
    fn rewrite(
        &self,
        mut container: Container<'_>,
        path: &ContainerPath,
        plan: &mut InjectionPlan,
    ) -> Result<(), RewriteError> {
        if path.depth() > self.config.max_group_depth {
            return Err(RewriteError::FilterTreeTooDeep {
                max: self.config.max_group_depth,
            });
        }

        let children = container.take_children();
        let mut buckets = Buckets::default();

        for child in children {
            match child {
                FilterNode::Group(mut group) => {
                    let child_path = path.child(container.len());
                    self.rewrite(Container::Group(&mut group), &child_path, plan)?;
                    container.push(group);
                }
                FilterNode::Predicate(predicate) => {
                    match parse_virtual_field(&self.registry, predicate.field())? {
                        None => container.push(predicate),
                        Some(virtual_field) => {
                            trace!(
                                field = predicate.field(),
                                association = %virtual_field.association,
                                "Matched virtual association predicate"
                            );
                            buckets.add(virtual_field, predicate);
                        }
                    }
                }
            }
        }

        for (prefix, association, predicates) in buckets.0 {
            let Some(entry) = self.registry.get(&association) else {
                return Err(RewriteError::InternalInvariantViolation(format!(
                    "association \"{association}\" vanished from the registry"
                )));
            };
            plan.register(InjectionPoint {
                container: path.clone(),
                prefix,
                association,
                resolver: Arc::clone(entry.resolver()),
                predicates,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::FlagResolver;
    use virtassoc_filter::{FilterGroup, GroupOperator};

    fn rewriter() -> Rewriter {
        let registry = ResolverRegistry::builder().register(FlagResolver).build().unwrap();
        Rewriter::new(Arc::new(registry))
    }

    #[test]
    fn test_resolve_without_virtual_filters_is_noop() {
        let mut spec = Specification::new()
            .with_filter(Predicate::equals("name", "x"))
            .with_filter(FilterGroup::or([Predicate::equals("a", 1).into()]));
        let before = spec.clone();

        let report = rewriter().resolve(&mut spec).unwrap();
        assert!(!report.rewritten);
        assert_eq!(spec, before);
        assert!(spec.is_fast_path());
    }

    #[test]
    fn test_resolve_basic_rewrite() {
        let mut spec = Specification::new().with_filter(Predicate::equals("bar.isActive", true));

        let report = rewriter().resolve(&mut spec).unwrap();
        assert!(report.rewritten);
        assert_eq!(
            spec.filters(),
            &[FilterNode::from(Predicate::equals("bar_computed_flag", true))]
        );
        assert!(!spec.is_fast_path());
    }

    #[test]
    fn test_same_container_predicates_share_one_point() {
        let mut spec = Specification::new()
            .with_filter(Predicate::equals("bar.isActive", true))
            .with_filter(Predicate::equals("name", "x"))
            .with_filter(Predicate::equals("bar.code", "c"));

        let report = rewriter().resolve(&mut spec).unwrap();
        assert_eq!(report.injections.len(), 1);
        assert_eq!(report.matched_count(), 2);
        let fields: Vec<&str> = spec.predicates().map(Predicate::field).collect();
        assert_eq!(fields, vec!["name", "bar_computed_flag", "bar_computed_flag"]);
    }

    #[test]
    fn test_nested_group_keeps_position() {
        let mut spec = Specification::new().with_filter(FilterGroup::or([
            Predicate::equals("x", 1).into(),
            FilterGroup::and([Predicate::equals("bar.isActive", true).into()]).into(),
            Predicate::equals("y", 2).into(),
        ]));

        rewriter().resolve(&mut spec).unwrap();

        let outer = spec.filters()[0].as_group().unwrap();
        assert_eq!(outer.operator, GroupOperator::Or);
        assert_eq!(outer.children.len(), 3);
        let inner = outer.children[1].as_group().unwrap();
        assert_eq!(
            inner.children,
            vec![FilterNode::from(Predicate::equals("bar_computed_flag", true))]
        );
    }

    #[test]
    fn test_validate_rejects_direct_filters() {
        let mut spec = Specification::new();
        spec.association_mut("order")
            .association_mut("bar")
            .add_filter(Predicate::equals("isActive", true));

        let err = rewriter().resolve(&mut spec).unwrap_err();
        assert!(matches!(
            err,
            RewriteError::FiltersOnVirtualAssociationNotSupported(name) if name == "bar"
        ));
    }

    #[test]
    fn test_validate_allows_unfiltered_virtual_association() {
        let spec = Specification::new().with_association("bar", Specification::new());
        assert!(rewriter().validate(&spec).is_ok());
    }

    #[test]
    fn test_max_depth() {
        let registry = Arc::new(ResolverRegistry::empty());
        let rewriter = Rewriter::with_config(
            registry,
            RewriterConfig {
                max_group_depth: 1,
                ..Default::default()
            },
        );
        let mut spec = Specification::new().with_filter(FilterGroup::and([FilterGroup::or([
            Predicate::equals("a", 1).into(),
        ])
        .into()]));
        let before = spec.clone();

        let err = rewriter.resolve(&mut spec).unwrap_err();
        assert!(matches!(err, RewriteError::FilterTreeTooDeep { max: 1 }));
        assert_eq!(spec, before);
    }

    #[test]
    fn test_failed_resolve_leaves_spec_untouched() {
        let mut spec = Specification::new()
            .with_filter(Predicate::equals("bar.isActive", true))
            .with_filter(FilterGroup::or([Predicate::equals("bar.bogus", 1).into()]));
        let before = spec.clone();

        assert!(rewriter().resolve(&mut spec).is_err());
        assert_eq!(spec, before);
        assert!(spec.is_fast_path());
    }
}
