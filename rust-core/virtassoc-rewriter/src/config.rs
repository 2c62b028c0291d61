// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rewriter configuration.

use serde::{Deserialize, Serialize};

/// What to do when two resolvers claim the same association name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail the registry build.
    #[default]
    Reject,
    /// Keep the first registration, drop later ones with a warning.
    FirstWins,
}

/// Configuration for the filter rewriter and its registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    /// Deepest boolean group nesting accepted; the root filter list is depth 0.
    pub max_group_depth: usize,
    /// Duplicate association handling at registry build time.
    pub duplicate_policy: DuplicatePolicy,
}

impl RewriterConfig {
    /// Load a configuration from JSON; absent keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            max_group_depth: 64,
            duplicate_policy: DuplicatePolicy::Reject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RewriterConfig::default();
        assert_eq!(config.max_group_depth, 64);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RewriterConfig::from_json(r#"{"duplicate_policy":"first_wins"}"#).unwrap();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::FirstWins);
        assert_eq!(config.max_group_depth, 64);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = RewriterConfig {
            max_group_depth: 8,
            duplicate_policy: DuplicatePolicy::FirstWins,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(RewriterConfig::from_json(&json).unwrap(), config);
    }
}
