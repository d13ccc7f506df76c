//! Format inventory rows as console tables.

use crate::inventory::FunctionRow;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{ColumnConstraint, Table, Width};

/// Render one console page of inventory rows.
///
/// Column lower bounds keep successive pages aligned even when their row
/// contents differ in width.
pub fn render_inventory_page(rows: &[FunctionRow], with_header: bool) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(48)),
        ColumnConstraint::LowerBoundary(Width::Fixed(14)),
        ColumnConstraint::LowerBoundary(Width::Fixed(11)),
    ]);
    if with_header {
        table.set_header(vec!["Function Name", "Runtime", "Installed"]);
    }
    for row in rows {
        table.add_row(vec![
            row.function_name.clone(),
            row.runtime.clone(),
            if row.installed { "yes" } else { "no" }.to_string(),
        ]);
    }
    format!("{}\n", table)
}
