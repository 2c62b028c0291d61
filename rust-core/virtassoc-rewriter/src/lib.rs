// SPDX-License-Identifier: PMPL-1.0-or-later
//! Virtassoc Rewriter
//!
//! Filter rewriting for virtual associations: named, computed relations
//! with no backing table or column. Callers filter on them with the same
//! dotted paths used for real associations (`order.stock.available`); the
//! [`Rewriter`] replaces those predicates with real ones before the query
//! reaches the execution engine, and the [`AssociationLoader`] attaches the
//! computed data to entities after loading.
//!
//! Resolvers are registered once at startup in a [`ResolverRegistry`]:
//!
//! ```text
//! registry = ResolverRegistry::builder().register(StockResolver).build()?
//! rewriter = Rewriter::new(Arc::new(registry))
//! rewriter.resolve(&mut spec)?
//! ```

pub mod config;
pub mod container;
pub mod context;
pub mod error;
pub mod loader;
pub mod path;
pub mod plan;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod rewriter;

pub use config::{DuplicatePolicy, RewriterConfig};
pub use container::{Container, ContainerPath};
pub use context::InjectionContext;
pub use error::{ErrorPayload, RegistryError, RewriteError};
pub use loader::AssociationLoader;
pub use path::{parse_virtual_field, VirtualField};
pub use plan::{InjectionPlan, InjectionPoint};
pub use registry::{ResolverEntry, ResolverRegistry, ResolverRegistryBuilder};
pub use report::{BatchSummary, InjectionSummary, RewriteReport};
pub use resolver::VirtualAssociationResolver;
pub use rewriter::Rewriter;
