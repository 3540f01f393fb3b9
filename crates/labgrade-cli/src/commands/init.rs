//! The `labgrade init` command.

use anyhow::{Context, Result};

use labgrade_core::config::GradingConfig;

pub fn execute() -> Result<()> {
    let path = std::path::Path::new("labgrade.toml");
    if path.exists() {
        println!("labgrade.toml already exists, skipping.");
    } else {
        let body = toml::to_string_pretty(&GradingConfig::default())
            .context("failed to serialize the default config")?;
        std::fs::write(path, format!("{HEADER}{body}"))?;
        println!("Created labgrade.toml");
    }

    println!("\nNext steps:");
    println!("  1. Adjust tolerance and thresholds in labgrade.toml");
    println!("  2. Run: labgrade check --input pareja.xlsx");
    println!("  3. Run: labgrade grade --input pareja.xlsx");

    Ok(())
}

const HEADER: &str = r#"# labgrade configuration
#
# tolerance: a student value is correct when student / expected lies in
# [1 - tolerance, 1 + tolerance].
# LABGRADE_TOLERANCE and LABGRADE_OUTPUT_DIR override the values below.

"#;
