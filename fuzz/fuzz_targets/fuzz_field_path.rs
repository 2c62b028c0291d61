// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Fuzz target for virtual field path parsing.
// Run with: cargo +nightly fuzz run fuzz_field_path

#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use virtassoc_filter::{Entity, Predicate};
use virtassoc_rewriter::{
    parse_virtual_field, InjectionContext, ResolverRegistry, RewriteError,
    VirtualAssociationResolver,
};

struct Stub(&'static str);

impl VirtualAssociationResolver for Stub {
    type Prepared = ();

    fn association_name(&self) -> &str {
        self.0
    }

    fn allowed_virtual_field_names(&self) -> &[&str] {
        &["id", "active"]
    }

    fn preprocess(&self, _contexts: &[InjectionContext<'_>]) -> Result<(), RewriteError> {
        Ok(())
    }

    fn create_replacement_predicates(
        &self,
        _context: &InjectionContext<'_>,
        _prepared: &(),
    ) -> Result<Vec<Predicate>, RewriteError> {
        Ok(Vec::new())
    }

    fn inject_computed_association(&self, _parents: &mut [Entity]) -> Result<(), RewriteError> {
        Ok(())
    }
}

fn registry() -> &'static ResolverRegistry {
    static REGISTRY: OnceLock<ResolverRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        ResolverRegistry::builder()
            .register(Stub("bar"))
            .register(Stub("stock"))
            .build()
            .unwrap()
    })
}

fuzz_target!(|data: &[u8]| {
    if let Ok(path) = std::str::from_utf8(data) {
        if path.len() <= 1024 {
            // A match must come back as pieces of the original path.
            if let Ok(Some(field)) = parse_virtual_field(registry(), path) {
                assert!(path.starts_with(&field.prefix));
                assert!(path.ends_with(&format!("{}.{}", field.association, field.field)));
            }
        }
    }
});
