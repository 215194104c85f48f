use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::models::Obligation;

/// Render the obligation listing used by `--dry-run`.
pub fn render_listing(obligations: &[Obligation]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("File").add_attribute(Attribute::Bold),
            Cell::new("Line").add_attribute(Attribute::Bold),
            Cell::new("Declaration").add_attribute(Attribute::Bold),
        ]);

    for obligation in obligations {
        let name = if obligation.declaration_name.is_empty() {
            "(unnamed)"
        } else {
            obligation.declaration_name.as_str()
        };
        table.add_row(vec![
            Cell::new(&obligation.file_path),
            Cell::new(obligation.line_number.to_string()).set_alignment(CellAlignment::Right),
            Cell::new(name),
        ]);
    }

    println!("{table}");
    println!(" {} {} obligation(s) found", "→".cyan(), obligations.len());
}
