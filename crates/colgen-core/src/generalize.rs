//! The generalizer: apply a [`RuleSet`] to a value or a dataset column.

use std::borrow::Cow;

use serde_json::Value;
use tracing::trace;

use crate::dataset::Dataset;
use crate::error::{CoreError, Result};
use crate::rules::RuleSet;

/// What happened to a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A rule fired and changed the value.
    Generalized,
    /// No rule fired, or the rule reproduced the input text.
    Unchanged,
    /// The cell is absent, null, or a nested structure.
    Skipped,
}

/// Per-column counters collected during a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneralizeStats {
    pub rows: usize,
    pub generalized: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl GeneralizeStats {
    pub fn record(&mut self, outcome: Outcome) {
        self.rows += 1;
        match outcome {
            Outcome::Generalized => self.generalized += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

/// Coerce a scalar to the text rules are matched against.
///
/// Returns `None` for null, arrays and objects, which are never matched.
pub fn value_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Generalize one value in place and report what happened.
pub fn generalize_value(value: &mut Value, rules: &RuleSet) -> Outcome {
    let replacement = match value_text(value) {
        None => return Outcome::Skipped,
        Some(text) => match rules.generalize_text(&text) {
            Some(replacement) if replacement != text => replacement.into_owned(),
            _ => return Outcome::Unchanged,
        },
    };
    *value = Value::String(replacement);
    Outcome::Generalized
}

/// Pure form of [`generalize_value`]: `generalize(value, ruleset) -> value'`.
///
/// On a miss the input is returned unchanged, including its JSON type.
pub fn generalize(value: &Value, rules: &RuleSet) -> Value {
    let mut out = value.clone();
    generalize_value(&mut out, rules);
    out
}

/// Apply `rules` to `column` in every row of `dataset`.
///
/// # Errors
///
/// Returns [`CoreError::ColumnNotFound`] when the column is not part of the
/// dataset.
pub fn generalize_column(
    dataset: &mut Dataset,
    column: &str,
    rules: &RuleSet,
) -> Result<GeneralizeStats> {
    generalize_column_with(dataset, column, rules, |_, _, _| {})
}

/// Like [`generalize_column`], calling `inspect(row_index, before, after)` for
/// every generalized cell.
///
/// # Errors
///
/// Returns [`CoreError::ColumnNotFound`] when the column is not part of the
/// dataset.
pub fn generalize_column_with<F>(
    dataset: &mut Dataset,
    column: &str,
    rules: &RuleSet,
    mut inspect: F,
) -> Result<GeneralizeStats>
where
    F: FnMut(usize, &Value, &Value),
{
    if !dataset.has_column(column) {
        return Err(CoreError::ColumnNotFound {
            column: column.to_string(),
            available: dataset.columns().join(", "),
        });
    }
    let mut stats = GeneralizeStats::default();
    for (idx, row) in dataset.rows_mut().iter_mut().enumerate() {
        let Some(cell) = row.get_mut(column) else {
            trace!(row = idx, "target cell absent");
            stats.record(Outcome::Skipped);
            continue;
        };
        let before = cell.clone();
        let outcome = generalize_value(cell, rules);
        if outcome == Outcome::Generalized {
            inspect(idx, &before, cell);
        }
        stats.record(outcome);
    }
    Ok(stats)
}
