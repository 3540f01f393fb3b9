//! Paginated print document.
//!
//! A4 pages laid out with CSS `@page`: a cover with the summary, then one
//! page (or more, when content overflows) per exercise. Any browser prints
//! it straight to PDF.

use anyhow::{Context, Result};
use std::path::Path;

use labgrade_core::report::GradeReport;

use crate::html::{format_score, html_escape, push_exercise, TABLE_CSS};

/// Generate the print document for a graded workbook.
pub fn generate_document(report: &GradeReport) -> String {
    let summary = report.summary();
    let mut doc = String::new();

    doc.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    doc.push_str("<meta charset=\"utf-8\">\n");
    doc.push_str(&format!(
        "<title>Lab report: {}</title>\n",
        html_escape(&report.source)
    ));
    doc.push_str("<style>\n");
    doc.push_str(PRINT_CSS);
    doc.push_str(TABLE_CSS);
    doc.push_str("</style>\n");
    doc.push_str("</head>\n<body>\n");

    // Cover
    doc.push_str("<section class=\"page cover\">\n");
    doc.push_str("<h1>Plant physiology lab report</h1>\n");
    doc.push_str(&format!(
        "<p class=\"meta\">Workbook: <strong>{}</strong></p>\n",
        html_escape(&report.source)
    ));
    doc.push_str(&format!(
        "<p class=\"meta\">Graded on {} | report {}</p>\n",
        report.created_at.format("%Y-%m-%d %H:%M UTC"),
        report.id
    ));
    doc.push_str("<table class=\"summary\">\n<caption>Summary</caption>\n");
    doc.push_str("<thead><tr><th>#</th><th>Exercise</th><th>Correct</th><th>Incorrect</th><th>Score</th><th>Unreadable sections</th></tr></thead>\n<tbody>\n");
    for e in &summary.exercises {
        doc.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            e.id.number(),
            html_escape(&e.title),
            e.correct,
            e.incorrect,
            format_score(e.score()),
            e.unreadable_sections,
        ));
    }
    doc.push_str(&format!(
        "<tr class=\"total\"><td></td><td>Total</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        summary.correct,
        summary.incorrect,
        format_score(summary.score()),
        summary.unreadable_sections,
    ));
    doc.push_str("</tbody></table>\n");
    doc.push_str("</section>\n");

    for exercise in &report.exercises {
        doc.push_str("<section class=\"page\">\n");
        push_exercise(&mut doc, exercise);
        doc.push_str("</section>\n");
    }

    doc.push_str("</body>\n</html>");
    doc
}

/// Write the print document to a file.
pub fn write_document(report: &GradeReport, path: &Path) -> Result<()> {
    let doc = generate_document(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc)
        .with_context(|| format!("failed to write document to {}", path.display()))?;
    Ok(())
}

const PRINT_CSS: &str = r#"
@page { size: A4; margin: 18mm 16mm; @bottom-center { content: counter(page) " / " counter(pages); } }
:root { --border: #d1d5db; --pass: #dcfce7; --fail: #fde2e2; --partial: #fef9c3; --warn: #fffbeb; }
body { font-family: 'Georgia', serif; font-size: 10.5pt; color: #111; margin: 0; }
.page { break-after: page; page-break-after: always; }
.page:last-of-type { break-after: auto; page-break-after: auto; }
.cover h1 { margin-top: 40mm; font-size: 24pt; }
.meta { color: #4b5563; }
h2 { font-size: 15pt; border-bottom: 1px solid var(--border); padding-bottom: 2mm; }
h3 { font-size: 12pt; margin-bottom: 1mm; }
.section, table, figure { break-inside: avoid; page-break-inside: avoid; }
td, th { font-size: 9pt; }
@media screen { body { max-width: 210mm; margin: 0 auto; padding: 1rem; } .page { border-bottom: 1px dashed var(--border); padding-bottom: 1rem; } }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::tests::{graded_sample, placeholder_report};

    #[test]
    fn document_has_cover_and_one_page_per_exercise() {
        let report = graded_sample();
        let doc = generate_document(&report);

        assert!(doc.contains("@page { size: A4"));
        assert_eq!(doc.matches("<section class=\"page").count(), 1 + report.exercises.len());
        for exercise in &report.exercises {
            assert!(doc.contains(&html_escape(&exercise.title)));
        }
        assert!(doc.contains("<svg"));
        assert!(!doc.contains("<script"));
    }

    #[test]
    fn document_shows_placeholder_text() {
        let doc = generate_document(&placeholder_report());
        assert!(doc.contains("This section could not be graded."));
        assert!(doc.contains("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn document_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.print.html");
        write_document(&placeholder_report(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Summary"));
    }
}
