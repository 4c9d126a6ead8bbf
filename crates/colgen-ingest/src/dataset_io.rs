//! Format-dispatching dataset reader and writer.

use std::fs;
#[cfg(unix)]
use std::fs::Permissions;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use colgen_core::Dataset;

use crate::csv_table::{read_csv, write_csv};
use crate::error::{IngestError, Result};
use crate::format::DataFormat;
use crate::guard::{check_input_file, open_file, read_to_string};
use crate::json_records::{read_json, read_json_lines, write_json, write_json_lines};

/// Read a dataset after running the pre-read guards.
pub fn read_dataset(path: &Path, format: DataFormat) -> Result<Dataset> {
    check_input_file(path)?;
    let dataset = match format {
        DataFormat::Csv => read_csv(BufReader::new(open_file(path)?), path)?,
        DataFormat::Json => read_json(&read_to_string(path)?, path)?,
        DataFormat::JsonLines => read_json_lines(BufReader::new(open_file(path)?), path)?,
    };
    debug!(
        path = %path.display(),
        format = %format,
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "dataset read"
    );
    Ok(dataset)
}

/// Serialize a dataset into any writer.
pub fn write_dataset_to<W: Write>(writer: W, format: DataFormat, dataset: &Dataset) -> io::Result<()> {
    match format {
        DataFormat::Csv => write_csv(writer, dataset),
        DataFormat::Json => write_json(writer, dataset),
        DataFormat::JsonLines => write_json_lines(writer, dataset),
    }
}

/// Write a dataset to `path`.
///
/// The data goes to a temporary file in the same directory which is renamed
/// over `path` only after a successful write. An existing output keeps its
/// permissions; a new one gets the mode a plain `File::create` would give it.
pub fn write_dataset(path: &Path, format: DataFormat, dataset: &Dataset) -> Result<()> {
    let write_error = |source: io::Error| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let existing = fs::metadata(path).ok().map(|metadata| metadata.permissions());
    let mut temp = create_temp_output(dir).map_err(write_error)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write_dataset_to(&mut writer, format, dataset).map_err(write_error)?;
        writer.flush().map_err(write_error)?;
    }
    if let Some(permissions) = existing {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(write_error)?;
    }
    temp.persist(path).map_err(|err| write_error(err.error))?;
    debug!(
        path = %path.display(),
        format = %format,
        rows = dataset.len(),
        "dataset written"
    );
    Ok(())
}

/// Temp files default to owner-only; on unix ask for 0o666 so the umask decides.
fn create_temp_output(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".colgen-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
