// SPDX-License-Identifier: PMPL-1.0-or-later
//! Filter model error types.

use thiserror::Error;

/// Errors raised while building or loading a filter tree.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("unknown group operator: {0}")]
    UnknownOperator(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_operator_display() {
        let err = FilterError::UnknownOperator("xor".to_string());
        assert_eq!(err.to_string(), "unknown group operator: xor");
    }

    #[test]
    fn test_serialization_from() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: FilterError = json_err.into();
        assert!(err.to_string().starts_with("serialization error"));
    }
}
