// SPDX-License-Identifier: PMPL-1.0-or-later
//! Startup-built registry of virtual association resolvers.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{info, warn};
use virtassoc_filter::PATH_SEPARATOR;

use crate::config::{DuplicatePolicy, RewriterConfig};
use crate::error::RegistryError;
use crate::resolver::{ErasedResolver, VirtualAssociationResolver};

/// One registered resolver with its allowed field set.
#[derive(Debug)]
pub struct ResolverEntry {
    name: String,
    allowed: BTreeSet<String>,
    resolver: Arc<dyn ErasedResolver>,
}

impl ResolverEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allows(&self, field: &str) -> bool {
        self.allowed.contains(field)
    }

    pub fn allowed_fields(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }

    pub(crate) fn resolver(&self) -> &Arc<dyn ErasedResolver> {
        &self.resolver
    }
}

/// Immutable `association name -> resolver` map.
///
/// Built once at startup and shared read-only (typically behind an `Arc`)
/// by every rewriter and loader.
#[derive(Debug, Default)]
pub struct ResolverRegistry {
    entries: HashMap<String, ResolverEntry>,
}

impl ResolverRegistry {
    pub fn builder() -> ResolverRegistryBuilder {
        ResolverRegistryBuilder::new(DuplicatePolicy::default())
    }

    /// A registry without resolvers; every predicate is ordinary.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ResolverEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered association names, sorted.
    pub fn association_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects resolvers and validates them into a [`ResolverRegistry`].
pub struct ResolverRegistryBuilder {
    policy: DuplicatePolicy,
    pending: Vec<Arc<dyn ErasedResolver>>,
}

impl ResolverRegistryBuilder {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            pending: Vec::new(),
        }
    }

    /// Builder honoring the duplicate policy of a loaded configuration.
    pub fn from_config(config: &RewriterConfig) -> Self {
        Self::new(config.duplicate_policy)
    }

    pub fn register<R: VirtualAssociationResolver + 'static>(self, resolver: R) -> Self {
        self.register_shared(Arc::new(resolver))
    }

    /// Register a resolver the caller keeps a handle to.
    pub fn register_shared<R: VirtualAssociationResolver + 'static>(mut self, resolver: Arc<R>) -> Self {
        self.pending.push(resolver);
        self
    }

    pub fn build(self) -> Result<ResolverRegistry, RegistryError> {
        let mut entries: HashMap<String, ResolverEntry> = HashMap::with_capacity(self.pending.len());

        for resolver in self.pending {
            let name = resolver.association_name().to_string();
            if name.is_empty() || name.contains(PATH_SEPARATOR) {
                return Err(RegistryError::InvalidAssociationName(name));
            }

            let mut allowed = BTreeSet::new();
            for field in resolver.allowed_virtual_field_names() {
                if field.is_empty() || field.contains(PATH_SEPARATOR) {
                    return Err(RegistryError::InvalidFieldName {
                        association: name,
                        field: field.to_string(),
                    });
                }
                allowed.insert(field.to_string());
            }

            if entries.contains_key(&name) {
                match self.policy {
                    DuplicatePolicy::Reject => {
                        return Err(RegistryError::DuplicateAssociation(name));
                    }
                    DuplicatePolicy::FirstWins => {
                        warn!(association = %name, "Ignoring duplicate virtual association resolver");
                        continue;
                    }
                }
            }

            entries.insert(
                name.clone(),
                ResolverEntry {
                    name,
                    allowed,
                    resolver,
                },
            );
        }

        let registry = ResolverRegistry { entries };
        info!(
            associations = ?registry.association_names(),
            "Virtual association registry built"
        );
        Ok(registry)
    }
}
