// SPDX-License-Identifier: PMPL-1.0-or-later
//! Field-path parsing for virtual association filters.

use virtassoc_filter::PATH_SEPARATOR;

use crate::error::RewriteError;
use crate::registry::ResolverRegistry;

/// A filter path that targets a virtual association field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualField {
    /// Segments before the association, without the trailing separator.
    pub prefix: String,
    pub association: String,
    pub field: String,
}

/// Decide whether `path` targets a virtual association.
///
/// The first segment naming a registered association is the match point.
/// Exactly one segment, an allowed field name, must follow it. Paths that
/// mention no registered association yield `Ok(None)`.
pub fn parse_virtual_field(
    registry: &ResolverRegistry,
    path: &str,
) -> Result<Option<VirtualField>, RewriteError> {
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    let mut consumed = 0;

    for (index, segment) in segments.iter().enumerate() {
        if let Some(entry) = registry.get(segment) {
            if index + 2 != segments.len() {
                return Err(RewriteError::NestedFiltersNotSupported(path.to_string()));
            }
            let field = segments[index + 1];
            if !entry.allows(field) {
                return Err(RewriteError::InvalidFilterField {
                    field: field.to_string(),
                    association: entry.name().to_string(),
                });
            }
            let prefix = if consumed == 0 {
                ""
            } else {
                &path[..consumed - PATH_SEPARATOR.len_utf8()]
            };
            return Ok(Some(VirtualField {
                prefix: prefix.to_string(),
                association: entry.name().to_string(),
                field: field.to_string(),
            }));
        }
        consumed += segment.len() + PATH_SEPARATOR.len_utf8();
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::FlagResolver;

    fn registry() -> ResolverRegistry {
        ResolverRegistry::builder().register(FlagResolver).build().unwrap()
    }

    #[test]
    fn test_unprefixed_match() {
        let parsed = parse_virtual_field(&registry(), "bar.isActive").unwrap().unwrap();
        assert_eq!(parsed.prefix, "");
        assert_eq!(parsed.association, "bar");
        assert_eq!(parsed.field, "isActive");
    }

    #[test]
    fn test_prefixed_match() {
        let parsed = parse_virtual_field(&registry(), "order.parent.bar.isActive")
            .unwrap()
            .unwrap();
        assert_eq!(parsed.prefix, "order.parent");
    }

    #[test]
    fn test_ordinary_paths() {
        let registry = registry();
        assert!(parse_virtual_field(&registry, "name").unwrap().is_none());
        assert!(parse_virtual_field(&registry, "order.customer.name").unwrap().is_none());
        assert!(parse_virtual_field(&registry, "barn.isActive").unwrap().is_none());
        assert!(parse_virtual_field(&registry, "").unwrap().is_none());
    }

    #[test]
    fn test_nested_rejected() {
        let err = parse_virtual_field(&registry(), "a.bar.isActive.extra").unwrap_err();
        assert!(matches!(err, RewriteError::NestedFiltersNotSupported(p) if p == "a.bar.isActive.extra"));
    }

    #[test]
    fn test_association_as_last_segment_rejected() {
        let err = parse_virtual_field(&registry(), "parent.bar").unwrap_err();
        assert!(matches!(err, RewriteError::NestedFiltersNotSupported(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = parse_virtual_field(&registry(), "bar.unknownField").unwrap_err();
        match err {
            RewriteError::InvalidFilterField { field, association } => {
                assert_eq!(field, "unknownField");
                assert_eq!(association, "bar");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_association_wins() {
        // "bar" appears twice; the first occurrence is not second-to-last.
        let err = parse_virtual_field(&registry(), "bar.x.bar.isActive").unwrap_err();
        assert!(matches!(err, RewriteError::NestedFiltersNotSupported(_)));
    }
}
