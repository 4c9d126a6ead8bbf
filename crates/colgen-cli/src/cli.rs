//! CLI argument definitions for the column generalizer.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use colgen_core::PatternSpec;
use colgen_ingest::DataFormat;

#[derive(Parser)]
#[command(
    name = "colgen",
    version,
    about = "Generalize one column of a CSV/JSON dataset for anonymization",
    long_about = "Replace each value of one column with a more general category.\n\n\
                  Rules come from a lookup table (exact match), an ordered list of\n\
                  PATTERN::REPLACEMENT regex rules (first match wins), or a JSON rule file.\n\
                  Values that match no rule are passed through unchanged."
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Allow raw cell values in trace logs.
    ///
    /// Values are redacted by default because the input usually holds
    /// personal data.
    #[arg(long = "log-data")]
    pub log_data: bool,
}

#[derive(Args)]
pub struct RunArgs {
    /// Input dataset (.csv, .json, .jsonl).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output dataset; the format follows the extension unless --output-format is set.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Name of the column to generalize (case-sensitive).
    #[arg(short = 'c', long = "column", value_name = "NAME")]
    pub column: String,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Match lookup keys and patterns case-insensitively.
    #[arg(long = "ignore-case")]
    pub ignore_case: bool,

    /// Input format (default: detected from the INPUT extension).
    #[arg(long = "input-format", value_enum)]
    pub input_format: Option<FormatArg>,

    /// Output format (default: detected from the OUTPUT extension).
    #[arg(long = "output-format", value_enum)]
    pub output_format: Option<FormatArg>,

    /// Load, validate and generalize without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Do not print the summary table.
    #[arg(long = "quiet-summary")]
    pub quiet_summary: bool,
}

// Exactly one rule source is required.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct RuleArgs {
    /// Lookup table: CSV with two columns (value, generalized_value) or a JSON object.
    #[arg(
        long = "lookup_file",
        visible_alias = "lookup-file",
        value_name = "PATH"
    )]
    pub lookup_file: Option<PathBuf>,

    /// Regex rule PATTERN::REPLACEMENT; repeat for more rules, tried in order.
    ///
    /// The replacement may reference groups as $1, ${name} or \1.
    #[arg(short = 'r', long = "regex", value_name = "PATTERN::REPLACEMENT")]
    pub regex: Vec<PatternSpec>,

    /// JSON rule file with either a "lookup" object or a "patterns" list.
    #[arg(long = "rules", value_name = "PATH")]
    pub rules_file: Option<PathBuf>,
}

/// Dataset format choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
    Jsonl,
}

impl From<FormatArg> for DataFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => DataFormat::Csv,
            FormatArg::Json => DataFormat::Json,
            FormatArg::Jsonl => DataFormat::JsonLines,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
