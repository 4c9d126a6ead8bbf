//! JSON array and JSON Lines datasets.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::{Map, Value};

use colgen_core::{Dataset, Row};

use crate::error::{IngestError, Result};

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Append an object to the dataset, registering its keys in document order.
fn push_object(dataset: &mut Dataset, object: Map<String, Value>) {
    for key in object.keys() {
        dataset.observe_column(key);
    }
    let row: Row = object.into_iter().collect();
    dataset.push_row(row);
}

fn row_to_object(row: &Row, columns: &[String]) -> Map<String, Value> {
    columns
        .iter()
        .filter_map(|column| row.get(column).map(|value| (column.clone(), value.clone())))
        .collect()
}

/// Parse a JSON document holding an array of objects.
pub fn read_json(text: &str, path: &Path) -> Result<Dataset> {
    let document: Value = serde_json::from_str(text).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let records = match document {
        Value::Array(records) => records,
        other => {
            return Err(IngestError::InvalidDocument {
                path: path.to_path_buf(),
                reason: format!("expected an array of objects, found {}", value_kind(&other)),
            });
        }
    };
    let mut dataset = Dataset::default();
    for (idx, record) in records.into_iter().enumerate() {
        match record {
            Value::Object(object) => push_object(&mut dataset, object),
            other => {
                return Err(IngestError::InvalidRecord {
                    path: path.to_path_buf(),
                    index: idx + 1,
                    reason: format!("expected an object, found {}", value_kind(&other)),
                });
            }
        }
    }
    Ok(dataset)
}

/// Parse JSON Lines: one object per non-blank line.
///
/// Errors carry the 1-based line number.
pub fn read_json_lines<R: BufRead>(reader: R, path: &Path) -> Result<Dataset> {
    let mut dataset = Dataset::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let line = if idx == 0 {
            line.trim_start_matches('\u{feff}')
        } else {
            line.as_str()
        };
        if line.trim().is_empty() {
            continue;
        }
        let record: Value =
            serde_json::from_str(line).map_err(|err| IngestError::InvalidRecord {
                path: path.to_path_buf(),
                index: idx + 1,
                reason: err.to_string(),
            })?;
        match record {
            Value::Object(object) => push_object(&mut dataset, object),
            other => {
                return Err(IngestError::InvalidRecord {
                    path: path.to_path_buf(),
                    index: idx + 1,
                    reason: format!("expected an object, found {}", value_kind(&other)),
                });
            }
        }
    }
    Ok(dataset)
}

/// Write a pretty-printed array of objects with keys in column order.
pub fn write_json<W: Write>(mut writer: W, dataset: &Dataset) -> io::Result<()> {
    let records: Vec<Value> = dataset
        .rows()
        .iter()
        .map(|row| Value::Object(row_to_object(row, dataset.columns())))
        .collect();
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Write one compact object per line.
pub fn write_json_lines<W: Write>(mut writer: W, dataset: &Dataset) -> io::Result<()> {
    for row in dataset.rows() {
        serde_json::to_writer(&mut writer, &row_to_object(row, dataset.columns()))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}
