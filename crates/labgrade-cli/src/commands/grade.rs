//! The `labgrade grade` command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use labgrade_core::config::load_config_from;
use labgrade_core::engine::{Grader, ProgressReporter};
use labgrade_core::exercises::ExerciseId;
use labgrade_core::report::{ExerciseReport, GradeReport, SectionOutcome, SectionReport};
use labgrade_report::{write_document, write_html_report};
use labgrade_sheets::ExcelWorkbook;

/// Console progress reporter.
pub struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_exercise_start(&self, id: ExerciseId, title: &str) {
        eprintln!("  Grading: practical {} :: {title}", id.number());
    }

    fn on_section(&self, _id: ExerciseId, section: &SectionReport) {
        match &section.outcome {
            SectionOutcome::Graded(graded) => {
                for issue in &graded.issues {
                    eprintln!("    WARNING: {}: {issue}", section.title);
                }
            }
            SectionOutcome::Unreadable { reason } => {
                eprintln!("    SKIPPED: {}: {reason}", section.title);
            }
        }
    }

    fn on_exercise_complete(&self, report: &ExerciseReport) {
        let summary = report.summary();
        eprintln!(
            "  Done: {} [{} correct, {} incorrect, {} unreadable section(s)]",
            report.title, summary.correct, summary.incorrect, summary.unreadable_sections
        );
    }

    fn on_complete(&self, report: &GradeReport, elapsed: Duration) {
        let summary = report.summary();
        eprintln!(
            "\nComplete: {} exercises, {} checks passed, {} failed ({:.1}s)",
            report.exercises.len(),
            summary.correct,
            summary.incorrect,
            elapsed.as_secs_f64()
        );
    }
}

/// Report outputs selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Html,
    Document,
}

pub fn parse_formats(format: &str) -> Result<Vec<OutputFormat>> {
    if format.trim() == "all" {
        return Ok(vec![OutputFormat::Json, OutputFormat::Html, OutputFormat::Document]);
    }
    let mut formats = Vec::new();
    for name in format.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let parsed = match name {
            "json" => OutputFormat::Json,
            "html" => OutputFormat::Html,
            "document" | "pdf" => OutputFormat::Document,
            other => anyhow::bail!("unknown format '{other}' (expected json, html, document or all)"),
        };
        if !formats.contains(&parsed) {
            formats.push(parsed);
        }
    }
    anyhow::ensure!(!formats.is_empty(), "--format must name at least one output");
    Ok(formats)
}

pub fn execute(
    input: PathBuf,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats = parse_formats(&format)?;
    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    anyhow::ensure!(input.exists(), "input file not found: {}", input.display());
    let mut workbook = ExcelWorkbook::open(&input)?;
    let source = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    eprintln!("labgrade v{} :: grading {source}", env!("CARGO_PKG_VERSION"));
    eprintln!();

    let grader = Grader::new(config);
    let report = grader
        .grade(&mut workbook, &source, &ConsoleReporter)
        .with_context(|| format!("failed to grade {}", input.display()))?;

    print_summary(&report);

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".into());
    write_outputs(&report, &output, &stem, &formats)
}

/// Save every requested output into `output`.
pub fn write_outputs(
    report: &GradeReport,
    output: &Path,
    stem: &str,
    formats: &[OutputFormat],
) -> Result<()> {
    tracing::debug!("writing {} output(s) to {}", formats.len(), output.display());
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");

    for fmt in formats {
        match fmt {
            OutputFormat::Json => {
                let path = output.join(format!("{stem}-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            OutputFormat::Html => {
                let path = output.join(format!("{stem}-{timestamp}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            OutputFormat::Document => {
                let path = output.join(format!("{stem}-{timestamp}.print.html"));
                write_document(report, &path)?;
                eprintln!("Print document: {}", path.display());
            }
        }
    }
    Ok(())
}

pub fn print_summary(report: &GradeReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "Exercise",
        "Correct",
        "Incorrect",
        "Score",
        "Unreadable",
        "Issues",
    ]);

    let summary = report.summary();
    for e in &summary.exercises {
        table.add_row(vec![
            Cell::new(e.id.number()),
            Cell::new(&e.title),
            Cell::new(e.correct),
            Cell::new(e.incorrect),
            Cell::new(format_score(e.score())),
            Cell::new(e.unreadable_sections),
            Cell::new(e.issues),
        ]);
    }
    table.add_row(vec![
        Cell::new(""),
        Cell::new("Total"),
        Cell::new(summary.correct),
        Cell::new(summary.incorrect),
        Cell::new(format_score(summary.score())),
        Cell::new(summary.unreadable_sections),
        Cell::new(summary.exercises.iter().map(|e| e.issues).sum::<usize>()),
    ]);

    println!("\n{table}");
}

fn format_score(score: Option<f64>) -> String {
    score.map(|s| format!("{s:.1}%")).unwrap_or_else(|| "-".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse() {
        assert_eq!(parse_formats("all").unwrap().len(), 3);
        assert_eq!(
            parse_formats("json, document,json").unwrap(),
            vec![OutputFormat::Json, OutputFormat::Document]
        );
        assert!(parse_formats("sarif").is_err());
        assert!(parse_formats(",").is_err());
    }
}
