//! Loading lookup tables and rule-set files.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use colgen_core::{PatternSpec, RuleSource, value_text};

use crate::error::{IngestError, Result};
use crate::format::DataFormat;
use crate::guard::{check_input_file, open_file, read_to_string};

/// Load a lookup table from a two-column CSV or a JSON object.
///
/// CSV tables have a header row (`value,generalized_value`, names are free
/// form) followed by exactly two fields per row. Both cells are trimmed.
pub fn load_lookup_table(path: &Path) -> Result<BTreeMap<String, String>> {
    check_input_file(path)?;
    let entries = match DataFormat::from_path(path)? {
        DataFormat::Csv => read_lookup_csv(open_file(path)?, path)?,
        DataFormat::Json => {
            let text = read_to_string(path)?;
            let object: JsonEntries =
                serde_json::from_str(&text).map_err(|err| IngestError::InvalidLookup {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                })?;
            let entries = coerce_entries(object).map_err(|reason| IngestError::InvalidLookup {
                path: path.to_path_buf(),
                reason,
            })?;
            collect_last_wins(entries, path)
        }
        DataFormat::JsonLines => {
            return Err(IngestError::InvalidLookup {
                path: path.to_path_buf(),
                reason: "lookup tables must be CSV or a JSON object".to_string(),
            });
        }
    };
    if entries.is_empty() {
        return Err(IngestError::InvalidLookup {
            path: path.to_path_buf(),
            reason: "table has no entries".to_string(),
        });
    }
    debug!(path = %path.display(), entries = entries.len(), "lookup table loaded");
    Ok(entries)
}

/// Read a two-column lookup CSV; the first row is a header.
pub fn read_lookup_csv<R: Read>(reader: R, path: &Path) -> Result<BTreeMap<String, String>> {
    let invalid = |reason: String| IngestError::InvalidLookup {
        path: path.to_path_buf(),
        reason,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    if headers.len() != 2 {
        return Err(invalid(format!(
            "must have exactly two columns (value, generalized_value), it has {}",
            headers.len()
        )));
    }
    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, csv::Position::line);
        if record.len() != 2 {
            return Err(invalid(format!(
                "line {line} has {} fields, expected 2",
                record.len()
            )));
        }
        entries.push((record[0].trim().to_string(), record[1].trim().to_string()));
    }
    Ok(collect_last_wins(entries, path))
}

fn collect_last_wins(entries: Vec<(String, String)>, path: &Path) -> BTreeMap<String, String> {
    let total = entries.len();
    let table: BTreeMap<String, String> = entries.into_iter().collect();
    if table.len() < total {
        warn!(
            path = %path.display(),
            duplicates = total - table.len(),
            "duplicate lookup keys, last entry wins"
        );
    }
    table
}

/// Entries of a JSON object in document order, repeated keys included.
///
/// `serde_json::Map` keeps only the last value of a repeated key, which would
/// hide duplicates from [`collect_last_wins`].
#[derive(Debug)]
struct JsonEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for JsonEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = JsonEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object mapping values to generalized values")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(JsonEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Convert JSON entries into text entries, coercing scalar values.
fn coerce_entries(object: JsonEntries) -> std::result::Result<Vec<(String, String)>, String> {
    object
        .0
        .into_iter()
        .map(|(key, value)| match value_text(&value) {
            Some(text) => Ok((key, text.into_owned())),
            None => Err(format!("value for key '{key}' must be a string, number or boolean")),
        })
        .collect()
}

/// A parsed rule-set file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFile {
    pub ignore_case: bool,
    pub source: RuleSource,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRuleFile {
    #[serde(default)]
    ignore_case: bool,
    lookup: Option<JsonEntries>,
    patterns: Option<Vec<PatternSpec>>,
}

/// Load a JSON rule-set file.
///
/// Accepted shapes:
///
/// ```json
/// {"lookup": {"34": "30-40"}, "ignore_case": false}
/// {"patterns": [{"pattern": "\\d", "replacement": "X"}]}
/// ```
pub fn load_rule_file(path: &Path) -> Result<RuleFile> {
    check_input_file(path)?;
    let text = read_to_string(path)?;
    parse_rule_file(&text, path)
}

/// Parse the contents of a rule-set file.
pub fn parse_rule_file(text: &str, path: &Path) -> Result<RuleFile> {
    let invalid = |reason: String| IngestError::InvalidRuleFile {
        path: path.to_path_buf(),
        reason,
    };
    let raw: RawRuleFile = serde_json::from_str(text).map_err(|err| invalid(err.to_string()))?;
    let source = match (raw.lookup, raw.patterns) {
        (Some(lookup), None) => {
            RuleSource::Lookup(collect_last_wins(coerce_entries(lookup).map_err(invalid)?, path))
        }
        (None, Some(patterns)) => RuleSource::Patterns(patterns),
        (Some(_), Some(_)) => {
            return Err(invalid(
                "only one of 'lookup' or 'patterns' can be specified".to_string(),
            ));
        }
        (None, None) => {
            return Err(invalid(
                "either 'lookup' or 'patterns' must be specified".to_string(),
            ));
        }
    };
    Ok(RuleFile {
        ignore_case: raw.ignore_case,
        source,
    })
}
