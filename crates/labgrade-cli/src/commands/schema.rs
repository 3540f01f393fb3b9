//! The `labgrade schema` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use labgrade_core::exercises::all_schemas;
use labgrade_core::schema::{FieldKind, Locator};

pub fn execute() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["#", "Range", "Sheet", "Cells", "Fields"]);

    let schemas = all_schemas();
    for (id, schema) in &schemas {
        let fields: Vec<String> = schema
            .fields()
            .iter()
            .map(|f| {
                let kind = match f.kind {
                    FieldKind::Number => "",
                    FieldKind::Entered => "*",
                    FieldKind::Text => " (text)",
                };
                match f.locator {
                    Locator::Next => format!("{}{kind}", f.name),
                    Locator::Label(label) => format!("{}{kind} = \"{label}\"", f.name),
                    Locator::Cell(cell) => format!("{}{kind} @ {cell}", f.name),
                }
            })
            .collect();
        table.add_row(vec![
            Cell::new(id.number()),
            Cell::new(schema.key()),
            Cell::new(schema.sheet()),
            Cell::new(schema.range()),
            Cell::new(fields.join(", ")),
        ]);
    }

    println!("{table}");
    println!("{} ranges. Fields marked * are student entries.", schemas.len());
    Ok(())
}
