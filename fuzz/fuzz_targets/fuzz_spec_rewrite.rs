// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Fuzz target for rewriting JSON specifications.
// Run with: cargo +nightly fuzz run fuzz_spec_rewrite
//
// Feeds arbitrary JSON through deserialization and `Rewriter::resolve`.
// A failed rewrite must leave the specification untouched; a successful
// one must leave no predicate on the virtual association behind.

#![no_main]

use std::sync::{Arc, OnceLock};

use libfuzzer_sys::fuzz_target;
use virtassoc_filter::{Entity, Predicate, Specification};
use virtassoc_rewriter::{
    InjectionContext, ResolverRegistry, RewriteError, Rewriter, VirtualAssociationResolver,
};

/// Maps `flag.on` predicates to `<prefix.>flag_on`.
struct FlagResolver;

impl VirtualAssociationResolver for FlagResolver {
    type Prepared = ();

    fn association_name(&self) -> &str {
        "flag"
    }

    fn allowed_virtual_field_names(&self) -> &[&str] {
        &["on"]
    }

    fn preprocess(&self, _contexts: &[InjectionContext<'_>]) -> Result<(), RewriteError> {
        Ok(())
    }

    fn create_replacement_predicates(
        &self,
        context: &InjectionContext<'_>,
        _prepared: &(),
    ) -> Result<Vec<Predicate>, RewriteError> {
        Ok(context
            .predicates()
            .iter()
            .map(|p| p.with_field(context.parent_field_path("flag_on")))
            .collect())
    }

    fn inject_computed_association(&self, _parents: &mut [Entity]) -> Result<(), RewriteError> {
        Ok(())
    }
}

fn rewriter() -> &'static Rewriter {
    static REWRITER: OnceLock<Rewriter> = OnceLock::new();
    REWRITER.get_or_init(|| {
        let registry = ResolverRegistry::builder()
            .register(FlagResolver)
            .build()
            .unwrap();
        Rewriter::new(Arc::new(registry))
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    if json.len() > 8192 {
        return;
    }
    let Ok(original) = Specification::from_json(json) else {
        return;
    };

    let mut spec = original.clone();
    match rewriter().resolve(&mut spec) {
        Ok(_) => {
            assert!(spec
                .predicates()
                .all(|p| p.field() != "flag.on" && !p.field().ends_with(".flag.on")));
        }
        Err(_) => assert_eq!(spec, original),
    }
});
