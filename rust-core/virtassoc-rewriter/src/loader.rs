// SPDX-License-Identifier: PMPL-1.0-or-later
//! Post-load attachment of computed associations.

use std::sync::Arc;

use tracing::debug;
use virtassoc_filter::{Entity, Specification};

use crate::error::RewriteError;
use crate::registry::ResolverRegistry;

/// Calls resolvers after query execution so the computed association reads
/// like any loaded relation.
///
/// A virtual association is requested when the specification names it as a
/// sub-specification; filtering on it is not required.
pub struct AssociationLoader {
    registry: Arc<ResolverRegistry>,
}

impl AssociationLoader {
    pub fn new(registry: Arc<ResolverRegistry>) -> Self {
        Self { registry }
    }

    /// Inject every requested virtual association into `entities`.
    ///
    /// Each resolver sees the whole batch once. Returns the names of the
    /// associations that were injected; an empty batch injects nothing.
    pub fn load(
        &self,
        spec: &Specification,
        entities: &mut [Entity],
    ) -> Result<Vec<String>, RewriteError> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let mut injected = Vec::new();
        for name in spec.associations().keys() {
            let Some(entry) = self.registry.get(name) else {
                continue;
            };
            debug!(association = %name, parents = entities.len(), "Injecting computed association");
            entry.resolver().inject(entities)?;
            injected.push(name.clone());
        }
        Ok(injected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::FlagResolver;
    use virtassoc_filter::Value;

    fn loader() -> AssociationLoader {
        let registry = ResolverRegistry::builder().register(FlagResolver).build().unwrap();
        AssociationLoader::new(Arc::new(registry))
    }

    #[test]
    fn test_load_requested_association() {
        let spec = Specification::new()
            .with_association("bar", Specification::new())
            .with_association("customer", Specification::new());
        let mut entities = vec![Entity::new("a"), Entity::new("b")];

        let injected = loader().load(&spec, &mut entities).unwrap();
        assert_eq!(injected, vec!["bar".to_string()]);
        assert!(entities
            .iter()
            .all(|e| e.computed("bar") == Some(&Value::Bool(true))));
        assert!(entities.iter().all(|e| e.computed("customer").is_none()));
    }

    #[test]
    fn test_load_skips_unrequested() {
        let mut entities = vec![Entity::new("a")];
        let injected = loader().load(&Specification::new(), &mut entities).unwrap();
        assert!(injected.is_empty());
        assert!(entities[0].computed.is_empty());
    }

    #[test]
    fn test_load_empty_batch() {
        let spec = Specification::new().with_association("bar", Specification::new());
        let injected = loader().load(&spec, &mut []).unwrap();
        assert!(injected.is_empty());
    }
}
