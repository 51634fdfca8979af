use bbdir_cli::types::{CleanResult, ImportResult, NormalizedValue, SyncResult};
use bbdir_model::EntityKind;
use bbdir_normalize::CodeKind;
use bbdir_reconcile::ReferenceKind;
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

const IMPORTED_ENTITIES: [EntityKind; 4] = [
    EntityKind::Person,
    EntityKind::AlsoKnownIn,
    EntityKind::Biobank,
    EntityKind::Collection,
];

pub fn print_import_summary(result: &ImportResult) {
    let summary = &result.summary;
    match &result.output {
        Some(path) => println!("Workbook: {}", path.display()),
        None => println!("Workbook: not written (dry run)"),
    }
    if let Some(path) = &result.delta {
        println!("Delta: {}", path.display());
    }
    println!("Records: {}", summary.records);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Created"),
        header_cell("Updated"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    let mut total_created = 0usize;
    let mut total_updated = 0usize;
    for kind in IMPORTED_ENTITIES {
        let created = summary.created(kind);
        let updated = summary.updated(kind);
        total_created += created;
        total_updated += updated;
        table.add_row(vec![
            Cell::new(kind.sheet_name()),
            count_cell(created, Color::Green),
            count_cell(updated, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        count_cell(total_created, Color::Green).add_attribute(Attribute::Bold),
        count_cell(total_updated, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_gap_table(result);

    if summary.catalogue_degraded > 0 {
        eprintln!(
            "warning: sample catalogue unavailable for {} record(s); local codes only",
            summary.catalogue_degraded
        );
    }
    if result.has_missing() {
        eprintln!("Missing references need curation:");
        for (kind, path) in &result.missing_reports {
            eprintln!("- {kind}: {}", path.display());
        }
    }
}

fn print_gap_table(result: &ImportResult) {
    let gaps = &result.summary.gaps;
    if gaps.backfilled.is_empty() && gaps.missing.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Reference"),
        header_cell("Backfilled"),
        header_cell("Missing"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for kind in ReferenceKind::ALL {
        let backfilled = gaps.backfilled.get(&kind).map_or(0, Vec::len);
        let missing = gaps.missing.get(&kind).map_or(0, Vec::len);
        table.add_row(vec![
            Cell::new(kind.as_str()),
            count_cell(backfilled, Color::Green),
            count_cell(missing, Color::Red),
        ]);
    }
    println!("{table}");
}

pub fn print_sync_summary(result: &SyncResult) {
    println!("Destination: {}", result.destination.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Deleted"),
        header_cell("Added"),
        header_cell("Failed batches"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for entity in &result.report.entities {
        table.add_row(vec![
            Cell::new(&entity.entity),
            Cell::new(entity.deleted),
            Cell::new(entity.added),
            count_cell(entity.failed_batches, Color::Red),
        ]);
    }
    println!("{table}");
    if result.has_failures() {
        eprintln!(
            "error: {} batch(es) were rejected by the destination",
            result.report.failed_batches()
        );
    }
}

pub fn print_clean_summary(result: &CleanResult) {
    println!(
        "Cleaned {} record(s) into {}",
        result.records,
        result.output.display()
    );
}

pub fn print_normalized(kind: CodeKind, values: &[NormalizedValue]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell(kind.as_str()), header_cell("Tokens")]);
    apply_table_style(&mut table);
    for value in values {
        let tokens = if value.tokens.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(value.tokens.join("\n"))
        };
        table.add_row(vec![Cell::new(&value.raw), tokens]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
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
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
