// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rewriter error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a `resolve()` call or a post-load injection.
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("filters directly on virtual association \"{0}\" are not supported; filter through its field path instead")]
    FiltersOnVirtualAssociationNotSupported(String),

    #[error("nested filters on virtual associations are not supported: {0}")]
    NestedFiltersNotSupported(String),

    #[error("\"{field}\" is not a filterable field of virtual association \"{association}\"")]
    InvalidFilterField { field: String, association: String },

    #[error("unsupported predicate type \"{kind}\" on \"{field}\"; only equals and equals_any are accepted here")]
    UnsupportedPredicateType { field: String, kind: &'static str },

    #[error("filter tree exceeds the maximum group depth of {max}")]
    FilterTreeTooDeep { max: usize },

    #[error("resolver for \"{association}\" failed: {source}")]
    Resolver {
        association: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("internal invariant violation: {0}")]
    InternalInvariantViolation(String),
}

impl RewriteError {
    /// Wrap a resolver-internal failure.
    pub fn resolver(
        association: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        RewriteError::Resolver {
            association: association.into(),
            source: source.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            RewriteError::FiltersOnVirtualAssociationNotSupported(_) => {
                "FILTERS_ON_VIRTUAL_ASSOCIATION_NOT_SUPPORTED"
            }
            RewriteError::NestedFiltersNotSupported(_) => "NESTED_FILTERS_NOT_SUPPORTED",
            RewriteError::InvalidFilterField { .. } => "INVALID_FILTER_FIELD",
            RewriteError::UnsupportedPredicateType { .. } => "UNSUPPORTED_PREDICATE_TYPE",
            RewriteError::FilterTreeTooDeep { .. } => "FILTER_TREE_TOO_DEEP",
            RewriteError::Resolver { .. } => "RESOLVER_FAILURE",
            RewriteError::InternalInvariantViolation(_) => "INTERNAL_INVARIANT_VIOLATION",
        }
    }

    /// Whether the error describes a problem with the caller's request.
    ///
    /// Everything else is a server-side failure and must surface as such.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            RewriteError::Resolver { .. } | RewriteError::InternalInvariantViolation(_)
        )
    }

    /// Structured form handed back to API callers.
    ///
    /// Server-side failures are reported with a generic message.
    pub fn payload(&self) -> ErrorPayload {
        let message = if self.is_user_facing() {
            self.to_string()
        } else {
            "internal error while rewriting filters".to_string()
        };
        ErrorPayload {
            code: self.code().to_string(),
            message,
        }
    }
}

/// Error body for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

/// Errors raised while building the resolver registry at startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("virtual association \"{0}\" is registered more than once")]
    DuplicateAssociation(String),

    #[error("invalid virtual association name: \"{0}\"")]
    InvalidAssociationName(String),

    #[error("invalid virtual field name \"{field}\" on association \"{association}\"")]
    InvalidFieldName { association: String, field: String },
}
