// SPDX-License-Identifier: PMPL-1.0-or-later
//! Resolver contract for virtual associations.

use virtassoc_filter::{Entity, Predicate};

use crate::context::InjectionContext;
use crate::error::RewriteError;

/// The pluggable owner of one virtual association.
///
/// A resolver declares which virtual fields can be filtered on, turns
/// filters on those fields into predicates on real fields, and attaches
/// the computed association to entities once they are loaded.
///
/// Rewriting runs in two phases per `resolve()` call: [`preprocess`] once
/// with the contexts of every injection point this resolver owns, then
/// [`create_replacement_predicates`] once per point with the shared result.
/// Expensive lookups belong in `preprocess`.
///
/// [`preprocess`]: VirtualAssociationResolver::preprocess
/// [`create_replacement_predicates`]: VirtualAssociationResolver::create_replacement_predicates
pub trait VirtualAssociationResolver: Send + Sync {
    /// Result of [`preprocess`](Self::preprocess), shared by every point.
    type Prepared;

    /// Unique association name used in field paths.
    fn association_name(&self) -> &str;

    /// Field names that may follow the association name in a filter path.
    fn allowed_virtual_field_names(&self) -> &[&str];

    fn preprocess(&self, contexts: &[InjectionContext<'_>]) -> Result<Self::Prepared, RewriteError>;

    /// Real predicates replacing the context's virtual predicates.
    ///
    /// With a non-empty prefix every returned field must start with
    /// `<prefix>.`; anything else aborts the rewrite as an internal error.
    fn create_replacement_predicates(
        &self,
        context: &InjectionContext<'_>,
        prepared: &Self::Prepared,
    ) -> Result<Vec<Predicate>, RewriteError>;

    /// Attach the computed association to each loaded parent. Never called
    /// with an empty slice.
    fn inject_computed_association(&self, parents: &mut [Entity]) -> Result<(), RewriteError>;
}

/// Object-safe face of [`VirtualAssociationResolver`] with `Prepared` erased.
///
/// `run_batch` keeps the prepared value on its own stack frame and hands
/// each point's replacements to `emit` as soon as they are produced.
pub(crate) trait ErasedResolver: Send + Sync {
    fn association_name(&self) -> &str;

    fn allowed_virtual_field_names(&self) -> &[&str];

    fn run_batch(
        &self,
        contexts: &[InjectionContext<'_>],
        emit: &mut dyn FnMut(usize, Vec<Predicate>) -> Result<(), RewriteError>,
    ) -> Result<(), RewriteError>;

    fn inject(&self, parents: &mut [Entity]) -> Result<(), RewriteError>;
}

impl<R: VirtualAssociationResolver> ErasedResolver for R {
    fn association_name(&self) -> &str {
        VirtualAssociationResolver::association_name(self)
    }

    fn allowed_virtual_field_names(&self) -> &[&str] {
        VirtualAssociationResolver::allowed_virtual_field_names(self)
    }

    fn run_batch(
        &self,
        contexts: &[InjectionContext<'_>],
        emit: &mut dyn FnMut(usize, Vec<Predicate>) -> Result<(), RewriteError>,
    ) -> Result<(), RewriteError> {
        let prepared = self.preprocess(contexts)?;
        for (index, context) in contexts.iter().enumerate() {
            let replacements = self.create_replacement_predicates(context, &prepared)?;
            emit(index, replacements)?;
        }
        Ok(())
    }

    fn inject(&self, parents: &mut [Entity]) -> Result<(), RewriteError> {
        self.inject_computed_association(parents)
    }
}

impl std::fmt::Debug for dyn ErasedResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Resolver({})", self.association_name())
    }
}
