use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use perf_ingest::{FailureKind, IngestReport, TableCounts};

/// Failures listed individually before the rest are elided.
const MAX_LISTED_FAILURES: usize = 20;

pub fn print_summary(report: &IngestReport) {
    println!("{report}");
    println!("{}", table_counts(report));
    print_failures(report);
}

/// Per-table dispatch counters with a total row.
pub fn table_counts(report: &IngestReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Dispatched"),
        header_cell("Failed"),
        header_cell("Null fields"),
    ]);
    apply_table_style(&mut table);
    for idx in 1..=3 {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    let mut total = TableCounts::default();
    for (name, counts) in report.table_counts() {
        total += counts;
        table.add_row(vec![
            Cell::new(name),
            Cell::new(counts.dispatched),
            count_cell(counts.failed, Color::Red),
            count_cell(counts.null_fields, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total.dispatched).add_attribute(Attribute::Bold),
        count_cell(total.failed, Color::Red).add_attribute(Attribute::Bold),
        count_cell(total.null_fields, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

fn print_failures(report: &IngestReport) {
    let failures: Vec<_> = report.all_failures().collect();
    if failures.is_empty() {
        return;
    }
    eprintln!("Failures:");
    for failure in failures.iter().take(MAX_LISTED_FAILURES) {
        eprintln!("- {failure}");
    }
    if failures.len() > MAX_LISTED_FAILURES {
        let sink = failures
            .iter()
            .skip(MAX_LISTED_FAILURES)
            .filter(|f| f.kind == FailureKind::Sink)
            .count();
        eprintln!(
            "- ... and {} more ({sink} sink failures)",
            failures.len() - MAX_LISTED_FAILURES
        );
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).add_attribute(Attribute::Dim)
    }
}
