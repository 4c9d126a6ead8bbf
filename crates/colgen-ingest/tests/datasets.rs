//! File-level tests for dataset reading and writing.

use std::fs;
use std::path::PathBuf;

use colgen_ingest::{DataFormat, IngestError, read_dataset, write_dataset};
use serde_json::json;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn csv_to_csv_keeps_rows_and_columns() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "people.csv", "id,name,age\n1,Ann,34\n2,\"Bo, Jr.\",50\n");
    let dataset = read_dataset(&input, DataFormat::Csv).unwrap();

    let output = dir.path().join("out.csv");
    write_dataset(&output, DataFormat::Csv, &dataset).unwrap();

    insta::assert_snapshot!(fs::read_to_string(&output).unwrap(), @r#"
    id,name,age
    1,Ann,34
    2,"Bo, Jr.",50
    "#);
}

#[test]
fn csv_to_json_writes_string_cells() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "people.csv", "id,age\n1,34\n2\n");
    let dataset = read_dataset(&input, DataFormat::Csv).unwrap();

    let output = dir.path().join("out.json");
    write_dataset(&output, DataFormat::Json, &dataset).unwrap();

    insta::assert_snapshot!(fs::read_to_string(&output).unwrap(), @r#"
    [
      {
        "id": "1",
        "age": "34"
      },
      {
        "id": "2"
      }
    ]
    "#);
}

#[test]
fn json_to_csv_renders_scalars_and_nested_values() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(
        &dir,
        "people.json",
        r#"[{"id": 1, "age": 34, "tags": ["a"]}, {"id": 2, "age": null, "active": true}]"#,
    );
    let dataset = read_dataset(&input, DataFormat::Json).unwrap();
    assert_eq!(dataset.columns(), ["id", "age", "tags", "active"]);
    assert_eq!(dataset.rows()[0]["age"], json!(34));

    let output = dir.path().join("out.csv");
    write_dataset(&output, DataFormat::Csv, &dataset).unwrap();

    insta::assert_snapshot!(fs::read_to_string(&output).unwrap(), @r#"
    id,age,tags,active
    1,34,"[""a""]",
    2,,,true
    "#);
}

#[test]
fn json_lines_round_trip_through_files() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(
        &dir,
        "events.jsonl",
        "{\"user\": \"ann@example.org\", \"n\": 1}\n{\"user\": \"bo@example.org\", \"n\": 2}\n",
    );
    let dataset = read_dataset(&input, DataFormat::JsonLines).unwrap();
    assert_eq!(dataset.len(), 2);

    let output = dir.path().join("events.out.jsonl");
    write_dataset(&output, DataFormat::JsonLines, &dataset).unwrap();
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "{\"user\":\"ann@example.org\",\"n\":1}\n{\"user\":\"bo@example.org\",\"n\":2}\n"
    );
}

#[test]
fn missing_input_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = read_dataset(&dir.path().join("absent.csv"), DataFormat::Csv).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn failed_write_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "people.csv", "id\n1\n");
    let dataset = read_dataset(&input, DataFormat::Csv).unwrap();

    let output = dir.path().join("missing-dir").join("out.csv");
    let err = write_dataset(&output, DataFormat::Csv, &dataset).unwrap_err();
    assert!(matches!(err, IngestError::FileWrite { .. }));
    assert!(!output.exists());
}

#[test]
fn overwriting_the_input_in_place() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "people.csv", "id,age\n1,34\n");
    let dataset = read_dataset(&path, DataFormat::Csv).unwrap();
    write_dataset(&path, DataFormat::Csv, &dataset).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "id,age\n1,34\n");
}

#[cfg(unix)]
#[test]
fn new_output_gets_the_default_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "people.csv", "id,age\n1,34\n");
    let dataset = read_dataset(&input, DataFormat::Csv).unwrap();

    let output = dir.path().join("out.csv");
    write_dataset(&output, DataFormat::Csv, &dataset).unwrap();

    // `fs::write` creates with 0o666 minus the umask, like any plain file.
    let reference = write_fixture(&dir, "reference.csv", "");
    let mode = |path: &PathBuf| fs::metadata(path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(&output), mode(&reference));
}

#[cfg(unix)]
#[test]
fn overwriting_keeps_existing_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "people.csv", "id,age\n1,34\n");
    let dataset = read_dataset(&input, DataFormat::Csv).unwrap();

    let output = write_fixture(&dir, "out.csv", "stale\n");
    fs::set_permissions(&output, fs::Permissions::from_mode(0o640)).unwrap();
    write_dataset(&output, DataFormat::Csv, &dataset).unwrap();

    let mode = fs::metadata(&output).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
    assert_eq!(fs::read_to_string(&output).unwrap(), "id,age\n1,34\n");
}
