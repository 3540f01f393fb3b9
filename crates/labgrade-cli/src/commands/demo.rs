//! The `labgrade demo` command: grade the built-in sample workbook.

use std::path::PathBuf;

use anyhow::Result;

use labgrade_core::config::load_config_from;
use labgrade_core::engine::Grader;
use labgrade_core::fixtures::sample_workbook;

use super::grade::{parse_formats, print_summary, write_outputs, ConsoleReporter};

pub fn execute(output: Option<PathBuf>, format: String, config_path: Option<PathBuf>) -> Result<()> {
    let formats = parse_formats(&format)?;
    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    eprintln!("labgrade v{} :: grading the sample workbook", env!("CARGO_PKG_VERSION"));
    eprintln!();

    let mut workbook = sample_workbook();
    let report = Grader::new(config).grade(&mut workbook, "sample.xlsx", &ConsoleReporter)?;

    print_summary(&report);
    write_outputs(&report, &output, "sample", &formats)
}
