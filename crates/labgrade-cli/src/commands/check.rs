//! The `labgrade check` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use labgrade_core::config::load_config_from;
use labgrade_core::engine::Grader;
use labgrade_sheets::ExcelWorkbook;

pub fn execute(input: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    anyhow::ensure!(input.exists(), "input file not found: {}", input.display());
    let mut workbook = ExcelWorkbook::open(&input)?;

    let checks = Grader::new(config)
        .dry_run(&mut workbook)
        .with_context(|| format!("failed to check {}", input.display()))?;

    println!("Workbook: {}", input.display());

    let mut table = Table::new();
    table.set_header(vec!["#", "Range", "Sheet", "Cells", "Result"]);
    let mut problems = 0;
    for check in &checks {
        let result = match &check.outcome {
            Ok(records) => format!("OK ({records} record(s))"),
            Err(e) => {
                problems += 1;
                format!("ERROR: {e}")
            }
        };
        table.add_row(vec![
            Cell::new(check.exercise.number()),
            Cell::new(check.key),
            Cell::new(check.sheet),
            Cell::new(&check.range),
            Cell::new(result),
        ]);
    }
    println!("{table}");

    if problems == 0 {
        println!("All {} ranges readable.", checks.len());
    } else {
        println!("\n{problems} of {} range(s) could not be read.", checks.len());
    }
    Ok(())
}
