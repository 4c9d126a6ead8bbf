//! Core of the column generalizer: rule sets, the generalizer, and the
//! in-memory dataset model.

pub mod dataset;
pub mod error;
pub mod generalize;
pub mod rules;

pub use dataset::{Dataset, Row};
pub use error::{CoreError, Result, RuleError};
pub use generalize::{
    GeneralizeStats, Outcome, generalize, generalize_column, generalize_column_with,
    generalize_value, value_text,
};
pub use rules::{
    LookupTable, PATTERN_SEPARATOR, PatternRule, PatternSpec, RuleMode, RuleOptions, RuleSet,
    RuleSource,
};
