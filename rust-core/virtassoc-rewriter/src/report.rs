// SPDX-License-Identifier: PMPL-1.0-or-later
//! Summary of what a `resolve()` call rewrote.
//!
//! The report renders like an EXPLAIN: one line per injection point with
//! the virtual predicates removed and the real predicates put in their place.

use std::fmt;

use serde::{Deserialize, Serialize};
use virtassoc_filter::Predicate;

use crate::plan::InjectionPoint;

/// One applied injection point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionSummary {
    /// Container path, e.g. `root/1/0`.
    pub container: String,
    pub prefix: String,
    pub association: String,
    /// Virtual predicates removed from the container.
    pub matched: Vec<String>,
    /// Real predicates appended in their place.
    pub replacements: Vec<String>,
}

impl InjectionSummary {
    pub(crate) fn new(point: &InjectionPoint, replacements: &[Predicate]) -> Self {
        Self {
            container: point.container().to_string(),
            prefix: point.prefix().to_string(),
            association: point.association().to_string(),
            matched: point.predicates().iter().map(ToString::to_string).collect(),
            replacements: replacements.iter().map(ToString::to_string).collect(),
        }
    }
}

/// One resolver's batch: a single preprocessing step over its points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub association: String,
    pub injection_points: usize,
}

/// Result of a `resolve()` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteReport {
    /// Whether any virtual predicate was rewritten.
    pub rewritten: bool,
    pub injections: Vec<InjectionSummary>,
    pub batches: Vec<BatchSummary>,
}

impl RewriteReport {
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// Total number of virtual predicates removed.
    pub fn matched_count(&self) -> usize {
        self.injections.iter().map(|i| i.matched.len()).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RewriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.rewritten {
            return writeln!(f, "No virtual association filters");
        }
        writeln!(f, "Virtual Association Rewrite")?;
        writeln!(f, "===========================")?;
        for batch in &self.batches {
            writeln!(
                f,
                "Resolver {}: {} injection point(s), preprocessed once",
                batch.association, batch.injection_points
            )?;
        }
        for (i, injection) in self.injections.iter().enumerate() {
            let prefix = if injection.prefix.is_empty() {
                "(root)"
            } else {
                injection.prefix.as_str()
            };
            writeln!(
                f,
                "  Step {}: {} at {} prefix {}",
                i + 1,
                injection.association,
                injection.container,
                prefix
            )?;
            writeln!(f, "    removed:  {}", injection.matched.join(", "))?;
            writeln!(f, "    injected: {}", injection.replacements.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RewriteReport {
        RewriteReport {
            rewritten: true,
            injections: vec![InjectionSummary {
                container: "root/0".to_string(),
                prefix: String::new(),
                association: "bar".to_string(),
                matched: vec!["bar.isActive = true".to_string()],
                replacements: vec!["bar_computed_flag = true".to_string()],
            }],
            batches: vec![BatchSummary {
                association: "bar".to_string(),
                injection_points: 1,
            }],
        }
    }

    #[test]
    fn test_display() {
        let text = sample().to_string();
        assert!(text.contains("Resolver bar: 1 injection point(s)"));
        assert!(text.contains("Step 1: bar at root/0 prefix (root)"));
        assert!(text.contains("injected: bar_computed_flag = true"));
    }

    #[test]
    fn test_unchanged() {
        let report = RewriteReport::unchanged();
        assert_eq!(report.matched_count(), 0);
        assert_eq!(report.to_string(), "No virtual association filters\n");
    }

    #[test]
    fn test_json_roundtrip() {
        let report = sample();
        let parsed: RewriteReport = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed, report);
        assert_eq!(parsed.matched_count(), 1);
    }
}
