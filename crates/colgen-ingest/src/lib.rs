//! Dataset and rule-set loading for the column generalizer.

pub mod csv_table;
pub mod dataset_io;
pub mod error;
pub mod format;
pub mod guard;
pub mod json_records;
pub mod lookup;

pub use csv_table::{cell_text, read_csv, write_csv};
pub use dataset_io::{read_dataset, write_dataset, write_dataset_to};
pub use error::{IngestError, Result};
pub use format::DataFormat;
pub use guard::{MAX_INPUT_FILE_SIZE, check_input_file};
pub use json_records::{read_json, read_json_lines, write_json, write_json_lines};
pub use lookup::{RuleFile, load_lookup_table, load_rule_file, parse_rule_file, read_lookup_csv};
