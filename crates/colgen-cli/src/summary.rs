//! Run summary rendered as a comfy-table for stdout.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Input: {} ({})", result.input.display(), result.input_format);
    match &result.output {
        Some(path) => println!("Output: {} ({})", path.display(), result.output_format),
        None => println!("Output: not written (dry run)"),
    }
    println!("{}", summary_table(result));
}

pub fn summary_table(result: &RunResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Rules"),
        header_cell("Rows"),
        header_cell("Generalized"),
        header_cell("Unchanged"),
        header_cell("Skipped"),
    ]);
    apply_table_style(&mut table);
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let stats = &result.stats;
    table.add_row(vec![
        Cell::new(&result.column)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} x{}", result.mode, result.rule_count)),
        Cell::new(stats.rows),
        count_cell(stats.generalized, Color::Green),
        Cell::new(stats.unchanged),
        count_cell(stats.skipped, Color::Yellow),
    ]);
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
