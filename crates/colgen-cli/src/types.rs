use std::path::PathBuf;

use colgen_core::{GeneralizeStats, RuleMode};
use colgen_ingest::DataFormat;

#[derive(Debug)]
pub struct RunResult {
    pub input: PathBuf,
    pub input_format: DataFormat,
    /// `None` for dry runs.
    pub output: Option<PathBuf>,
    pub output_format: DataFormat,
    pub column: String,
    pub mode: RuleMode,
    pub rule_count: usize,
    pub stats: GeneralizeStats,
}
