//! Error types for rule compilation and column generalization.

use thiserror::Error;

/// Errors raised while parsing or compiling a rule set.
///
/// All of these are configuration errors: they are reported once, before any
/// row is processed.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A command-line pattern rule without the `::` separator.
    #[error("rule '{raw}' is missing the '::' separator (expected PATTERN::REPLACEMENT)")]
    MissingSeparator { raw: String },

    /// A pattern rule whose pattern half is empty.
    #[error("rule '{raw}' has an empty pattern")]
    EmptyPattern { raw: String },

    /// The regular expression failed to compile.
    #[error("invalid regular expression in rule #{index} ('{pattern}'): {source}")]
    InvalidPattern {
        /// 1-based position of the rule in declaration order.
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No rules were supplied.
    #[error("rule set is empty")]
    Empty,
}

/// Errors raised while applying a rule set to a dataset.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The target column is not part of the dataset.
    #[error("column '{column}' not found (available columns: {available})")]
    ColumnNotFound { column: String, available: String },

    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuleError::MissingSeparator {
            raw: "\\d".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "rule '\\d' is missing the '::' separator (expected PATTERN::REPLACEMENT)"
        );

        let err = CoreError::ColumnNotFound {
            column: "age".to_string(),
            available: "id, name".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "column 'age' not found (available columns: id, name)"
        );
    }

    #[test]
    fn test_rule_error_converts() {
        let err: CoreError = RuleError::Empty.into();
        assert!(matches!(err, CoreError::Rule(RuleError::Empty)));
        assert_eq!(err.to_string(), "rule set is empty");
    }
}
