use std::borrow::Cow;
use std::collections::BTreeSet;
use std::io::{self, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde_json::Value;
use tracing::debug;

use colgen_core::{Dataset, Row};

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn read_headers(record: &StringRecord, path: &Path) -> Result<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut headers = Vec::with_capacity(record.len());
    for (idx, raw) in record.iter().enumerate() {
        let header = normalize_header(raw);
        if header.is_empty() {
            return Err(IngestError::EmptyColumnName {
                path: path.to_path_buf(),
                position: idx + 1,
            });
        }
        if !seen.insert(header.clone()) {
            return Err(IngestError::DuplicateColumn {
                path: path.to_path_buf(),
                column: header,
            });
        }
        headers.push(header);
    }
    Ok(headers)
}

/// Read a CSV dataset; the first record is the header.
///
/// Short rows are kept with their trailing cells absent. Rows with more
/// fields than the header are rejected, and fully blank rows are dropped.
/// Cell values are kept verbatim (no trimming).
pub fn read_csv<R: Read>(reader: R, path: &Path) -> Result<Dataset> {
    let csv_error = |source: csv::Error| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let header_record = reader.headers().map_err(csv_error)?.clone();
    if header_record.is_empty() {
        return Err(IngestError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    let headers = read_headers(&header_record, path)?;
    let mut dataset = Dataset::new(headers.clone());
    let mut short_rows = 0usize;
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map_or(0, csv::Position::line);
        if record.len() > headers.len() {
            return Err(IngestError::MalformedRow {
                path: path.to_path_buf(),
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        if record.len() < headers.len() {
            short_rows += 1;
        }
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), Value::String(value.to_string())))
            .collect();
        dataset.push_row(row);
    }
    if short_rows > 0 {
        debug!(
            path = %path.display(),
            short_rows,
            "rows with fewer fields than the header"
        );
    }
    Ok(dataset)
}

/// Render a cell for CSV output.
///
/// Null becomes an empty field; arrays and objects are written as compact JSON.
pub fn cell_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Write a dataset as CSV with a header row; absent cells are empty fields.
pub fn write_csv<W: Write>(writer: W, dataset: &Dataset) -> io::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        let record: Vec<Cow<'_, str>> = dataset
            .columns()
            .iter()
            .map(|column| row.get(column).map_or(Cow::Borrowed(""), cell_text))
            .collect();
        writer.write_record(record.iter().map(|cell| cell.as_bytes()))?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Result<Dataset> {
        read_csv(text.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn test_read_basic() {
        let dataset = parse("id,age\n1,34\n2,50\n").unwrap();
        assert_eq!(dataset.columns(), ["id", "age"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[0]["age"], json!("34"));
    }

    #[test]
    fn test_read_keeps_cells_verbatim() {
        let dataset = parse(" id , city\n1, Paris \n").unwrap();
        assert_eq!(dataset.columns(), ["id", "city"]);
        assert_eq!(dataset.rows()[0]["city"], json!(" Paris "));
    }

    #[test]
    fn test_read_short_row_leaves_cells_absent() {
        let dataset = parse("id,age,zip\n1,34\n").unwrap();
        assert_eq!(dataset.rows()[0].get("zip"), None);
        assert_eq!(dataset.rows()[0]["age"], json!("34"));
    }

    #[test]
    fn test_read_long_row_rejected() {
        let err = parse("id,age\n1,34\n2,50,extra\n").unwrap_err();
        assert!(matches!(
            err,
            IngestError::MalformedRow {
                line: 3,
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_read_skips_blank_rows() {
        let dataset = parse("id,age\n1,34\n,\n2,50\n").unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_read_header_errors() {
        assert!(matches!(parse(""), Err(IngestError::EmptyInput { .. })));
        assert!(matches!(
            parse("id,,age\n1,2,3\n"),
            Err(IngestError::EmptyColumnName { position: 2, .. })
        ));
        assert!(matches!(
            parse("id,age,id\n1,2,3\n"),
            Err(IngestError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_read_strips_bom() {
        let dataset = parse("\u{feff}id,age\n1,34\n").unwrap();
        assert_eq!(dataset.columns(), ["id", "age"]);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("a")), "a");
        assert_eq!(cell_text(&json!(3)), "3");
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_write_quotes_and_absent_cells() {
        let mut dataset = Dataset::new(vec!["id".to_string(), "note".to_string()]);
        let mut row = Row::new();
        row.insert("id".to_string(), json!(1));
        row.insert("note".to_string(), json!("a, b"));
        dataset.push_row(row);
        let mut sparse = Row::new();
        sparse.insert("id".to_string(), json!(2));
        dataset.push_row(sparse);

        let mut out = Vec::new();
        write_csv(&mut out, &dataset).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id,note\n1,\"a, b\"\n2,\n");
    }
}
