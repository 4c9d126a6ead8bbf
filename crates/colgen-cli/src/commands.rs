//! The generalize command: load rules, read, generalize one column, write.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{Level, debug, info, info_span, trace, warn};

use colgen_core::{
    GeneralizeStats, RuleOptions, RuleSet, RuleSource, generalize_column_with, value_text,
};
use colgen_ingest::{DataFormat, load_lookup_table, load_rule_file, read_dataset, write_dataset};

use crate::cli::{FormatArg, RuleArgs, RunArgs};
use crate::logging::redact_value;
use crate::types::RunResult;

pub fn run_generalize(args: &RunArgs) -> Result<RunResult> {
    let run_span = info_span!("run", column = %args.column);
    let _run_guard = run_span.enter();

    let input_format = resolve_format(args.input_format, &args.input).context("input format")?;
    let output_format =
        resolve_format(args.output_format, &args.output).context("output format")?;

    // =========================================================================
    // Stage 1: Rules - load and compile before touching the dataset
    // =========================================================================
    let rules_start = Instant::now();
    let rules = info_span!("load_rules").in_scope(|| load_rules(&args.rules, args.ignore_case))?;
    info!(
        mode = %rules.mode(),
        rule_count = rules.len(),
        duration_ms = rules_start.elapsed().as_millis(),
        "rules loaded"
    );

    // =========================================================================
    // Stage 2: Read
    // =========================================================================
    let read_start = Instant::now();
    let mut dataset = info_span!("read", path = %args.input.display(), format = %input_format)
        .in_scope(|| read_dataset(&args.input, input_format))
        .with_context(|| format!("read dataset {}", args.input.display()))?;
    info!(
        rows = dataset.len(),
        columns = dataset.columns().len(),
        duration_ms = read_start.elapsed().as_millis(),
        "dataset loaded"
    );

    // =========================================================================
    // Stage 3: Generalize
    // =========================================================================
    let generalize_start = Instant::now();
    let trace_cells = tracing::enabled!(Level::TRACE);
    let stats = info_span!("generalize").in_scope(|| {
        generalize_column_with(&mut dataset, &args.column, &rules, |row, before, after| {
            if trace_cells {
                trace!(
                    row,
                    before = redact_value(&cell_label(before)),
                    after = redact_value(&cell_label(after)),
                    "cell generalized"
                );
            }
        })
    })?;
    info!(
        rows = stats.rows,
        generalized = stats.generalized,
        unchanged = stats.unchanged,
        skipped = stats.skipped,
        duration_ms = generalize_start.elapsed().as_millis(),
        "column generalized"
    );
    warn_on_skipped(&args.column, &stats);

    // =========================================================================
    // Stage 4: Write
    // =========================================================================
    let output = if args.dry_run {
        info!("dry run, output not written");
        None
    } else {
        let write_start = Instant::now();
        info_span!("write", path = %args.output.display(), format = %output_format)
            .in_scope(|| write_dataset(&args.output, output_format, &dataset))
            .with_context(|| format!("write dataset {}", args.output.display()))?;
        info!(
            path = %args.output.display(),
            duration_ms = write_start.elapsed().as_millis(),
            "output written"
        );
        Some(args.output.clone())
    };

    Ok(RunResult {
        input: args.input.clone(),
        input_format,
        output,
        output_format,
        column: args.column.clone(),
        mode: rules.mode(),
        rule_count: rules.len(),
        stats,
    })
}

/// Load whichever rule source was given and compile it.
///
/// `--ignore-case` turns case-insensitive matching on; a rule file can also
/// request it with `"ignore_case": true`.
pub fn load_rules(args: &RuleArgs, ignore_case: bool) -> Result<RuleSet> {
    let (source, file_ignore_case) = if let Some(path) = &args.lookup_file {
        let table = load_lookup_table(path)
            .with_context(|| format!("load lookup table {}", path.display()))?;
        (RuleSource::Lookup(table), false)
    } else if let Some(path) = &args.rules_file {
        let file =
            load_rule_file(path).with_context(|| format!("load rule file {}", path.display()))?;
        (file.source, file.ignore_case)
    } else {
        (RuleSource::Patterns(args.regex.clone()), false)
    };
    let options = RuleOptions::default().case_insensitive(ignore_case || file_ignore_case);
    let rules = source.compile(options).context("compile rules")?;
    log_compiled_rules(&rules, options);
    Ok(rules)
}

fn log_compiled_rules(rules: &RuleSet, options: RuleOptions) {
    match rules {
        RuleSet::Lookup(table) => debug!(
            entries = table.len(),
            case_insensitive = options.case_insensitive,
            "lookup table compiled"
        ),
        RuleSet::Patterns(patterns) => {
            for (idx, rule) in patterns.iter().enumerate() {
                debug!(
                    rule = idx + 1,
                    pattern = rule.pattern(),
                    replacement = rule.replacement(),
                    case_insensitive = options.case_insensitive,
                    "pattern rule compiled"
                );
            }
        }
    }
}

fn resolve_format(explicit: Option<FormatArg>, path: &Path) -> Result<DataFormat> {
    match explicit {
        Some(format) => Ok(format.into()),
        None => Ok(DataFormat::from_path(path)?),
    }
}

fn cell_label(value: &Value) -> String {
    value_text(value).map_or_else(|| value.to_string(), |text| text.into_owned())
}

fn warn_on_skipped(column: &str, stats: &GeneralizeStats) {
    if stats.skipped > 0 {
        warn!(
            column,
            skipped = stats.skipped,
            rows = stats.rows,
            "rows without a usable value in the target column were left unchanged"
        );
    }
}
