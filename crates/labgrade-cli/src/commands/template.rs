//! The `labgrade template` command: write the sample workbook as `.xlsx`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use labgrade_core::fixtures::sample_workbook;
use labgrade_sheets::write_xlsx;

pub fn execute(output: PathBuf, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !output.exists(),
        "{} already exists (use --force to overwrite)",
        output.display()
    );
    write_xlsx(&sample_workbook(), &output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Created {}", output.display());
    println!("\nGrade it with: labgrade grade --input {}", output.display());
    Ok(())
}
