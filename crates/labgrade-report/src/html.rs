//! HTML dashboard generator.
//!
//! Produces a self-contained HTML file with all CSS/JS and chart SVGs
//! inlined: a summary table, then one tab per exercise.

use anyhow::Result;
use std::path::Path;

use labgrade_core::model::{Cell, Table, Verdict};
use labgrade_core::report::{ExerciseReport, GradeReport, SectionOutcome, SectionReport};

use crate::chart::render_svg;

/// Escape a string for safe HTML insertion.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the dashboard for a graded workbook.
pub fn generate_html(report: &GradeReport) -> String {
    let summary = report.summary();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>labgrade report: {}</title>\n",
        html_escape(&report.source)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str(TABLE_CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Plant physiology lab report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Workbook: <strong>{}</strong> | {} exercises | {}</p>\n",
        html_escape(&report.source),
        report.exercises.len(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Exercise</th><th>Correct</th><th>Incorrect</th><th>Score</th><th>Unreadable sections</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for e in &summary.exercises {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
            html_escape(&e.title),
            e.correct,
            e.incorrect,
            score_class(e.score()),
            format_score(e.score()),
            e.unreadable_sections,
        ));
    }
    html.push_str(&format!(
        "<tr class=\"total\"><td>Total</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
        summary.correct,
        summary.incorrect,
        score_class(summary.score()),
        format_score(summary.score()),
        summary.unreadable_sections,
    ));
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // One tab per exercise
    html.push_str("<nav class=\"tabs\">\n");
    for (i, exercise) in report.exercises.iter().enumerate() {
        html.push_str(&format!(
            "<button class=\"tab{}\" onclick=\"showTab({i})\">{}. {}</button>\n",
            if i == 0 { " active" } else { "" },
            exercise.id.number(),
            html_escape(&exercise.title),
        ));
    }
    html.push_str("</nav>\n");

    for (i, exercise) in report.exercises.iter().enumerate() {
        html.push_str(&format!(
            "<section class=\"exercise\" id=\"tab-{i}\"{}>\n",
            if i == 0 { "" } else { " hidden" }
        ));
        push_exercise(&mut html, exercise);
        html.push_str("</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the dashboard to a file.
pub fn write_html_report(report: &GradeReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

/// Heading plus every section of one exercise.
pub(crate) fn push_exercise(html: &mut String, exercise: &ExerciseReport) {
    html.push_str(&format!(
        "<h2>Practical {}: {}</h2>\n",
        exercise.id.number(),
        html_escape(&exercise.title)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">Sheet: {}</p>\n",
        html_escape(&exercise.sheet)
    ));
    for section in &exercise.sections {
        push_section(html, section);
    }
}

fn push_section(html: &mut String, section: &SectionReport) {
    html.push_str("<div class=\"section\">\n");
    html.push_str(&format!("<h3>{}</h3>\n", html_escape(&section.title)));

    let graded = match &section.outcome {
        SectionOutcome::Graded(graded) => graded,
        SectionOutcome::Unreadable { reason } => {
            html.push_str(&format!(
                "<p class=\"warning\">This section could not be graded. {}</p>\n",
                html_escape(reason)
            ));
            html.push_str("</div>\n");
            return;
        }
    };

    for issue in &graded.issues {
        html.push_str(&format!("<p class=\"warning\">{}</p>\n", html_escape(issue)));
    }
    for table in &graded.tables {
        push_table(html, table);
    }
    if !graded.metrics.is_empty() {
        html.push_str("<ul class=\"metrics\">\n");
        for metric in &graded.metrics {
            html.push_str(&format!("<li>{}</li>\n", html_escape(&metric.to_string())));
        }
        html.push_str("</ul>\n");
    }
    for chart in &graded.charts {
        match render_svg(chart) {
            Ok(svg) => {
                html.push_str("<figure class=\"chart\">\n");
                html.push_str(&svg);
                html.push_str("\n</figure>\n");
            }
            Err(e) => {
                tracing::warn!("could not render chart '{}': {e:#}", chart.title);
                html.push_str(&format!(
                    "<p class=\"warning\">Chart '{}' could not be drawn.</p>\n",
                    html_escape(&chart.title)
                ));
            }
        }
    }
    for note in &graded.notes {
        html.push_str(&format!("<p class=\"note\">{}</p>\n", html_escape(note)));
    }
    html.push_str("</div>\n");
}

fn push_table(html: &mut String, table: &Table) {
    html.push_str("<table class=\"results-table\">\n");
    html.push_str(&format!("<caption>{}</caption>\n", html_escape(&table.title)));
    html.push_str("<thead><tr>");
    for column in &table.columns {
        html.push_str(&format!("<th>{}</th>", html_escape(column)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            match cell {
                Cell::Verdict(Verdict::Correct) => html.push_str("<td class=\"pass\">Correct</td>"),
                Cell::Verdict(Verdict::Incorrect) => {
                    html.push_str("<td class=\"fail\">Incorrect</td>")
                }
                Cell::Empty => html.push_str("<td class=\"empty\">-</td>"),
                other => html.push_str(&format!("<td>{}</td>", html_escape(&other.to_string()))),
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody></table>\n");
}

pub(crate) fn format_score(score: Option<f64>) -> String {
    score.map(|s| format!("{s:.1}%")).unwrap_or_else(|| "-".into())
}

fn score_class(score: Option<f64>) -> &'static str {
    match score {
        Some(s) if s >= 80.0 => "pass",
        Some(s) if s >= 50.0 => "partial",
        Some(_) => "fail",
        None => "",
    }
}

pub(crate) const TABLE_CSS: &str = r#"
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
caption { text-align: left; font-weight: bold; padding: 0.25rem 0; }
th, td { border: 1px solid var(--border); padding: 0.4rem 0.8rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.partial { background: var(--partial); }
.empty { color: #9ca3af; }
.total td { font-weight: bold; }
.warning { border-left: 4px solid #f59e0b; background: var(--warn); padding: 0.5rem 1rem; }
.note { color: #6b7280; font-size: 0.9rem; }
.metrics li { margin: 0.2rem 0; }
figure.chart { margin: 1rem 0; }
figure.chart svg { max-width: 100%; height: auto; }
"#;

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --partial: #fef9c3; --warn: #fffbeb; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --partial: #713f12; --warn: #451a03; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.tabs { display: flex; flex-wrap: wrap; gap: 0.5rem; margin-top: 2rem; border-bottom: 2px solid var(--border); }
.tab { border: none; background: none; color: inherit; padding: 0.6rem 1rem; cursor: pointer; font-size: 1rem; }
.tab.active { border-bottom: 3px solid #2563eb; font-weight: bold; }
.section { margin: 2rem 0; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
figure.chart svg { background: #fff; border-radius: 8px; }
"#;

const JS: &str = r#"
function showTab(index) {
  document.querySelectorAll('section.exercise').forEach((s, i) => { s.hidden = i !== index; });
  document.querySelectorAll('.tab').forEach((t, i) => { t.classList.toggle('active', i === index); });
}
"#;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use labgrade_core::config::GradingConfig;
    use labgrade_core::engine::{Grader, NoopReporter};
    use labgrade_core::exercises::ExerciseId;
    use labgrade_core::fixtures::sample_workbook;

    pub(crate) fn graded_sample() -> GradeReport {
        let mut wb = sample_workbook();
        Grader::new(GradingConfig::default())
            .grade(&mut wb, "pareja<1>.xlsx", &NoopReporter)
            .unwrap()
    }

    pub(crate) fn placeholder_report() -> GradeReport {
        GradeReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            source: "empty.xlsx".into(),
            exercises: vec![ExerciseReport {
                id: ExerciseId::HillReaction,
                title: ExerciseId::HillReaction.title().into(),
                sheet: ExerciseId::HillReaction.sheet().into(),
                sections: vec![SectionReport::unreadable(
                    "kinetics",
                    "Reduction kinetics",
                    "could not read data: requires the chlorophyll mass, which could not be computed",
                )],
            }],
            duration_ms: 3,
        }
    }

    #[test]
    fn dashboard_has_a_tab_per_exercise() {
        let report = graded_sample();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        for exercise in &report.exercises {
            assert!(html.contains(&html_escape(&exercise.title)), "{}", exercise.title);
        }
        assert_eq!(html.matches("class=\"exercise\"").count(), 5);
        assert!(html.contains("<svg"));
        assert!(html.contains("class=\"pass\">Correct"));
        assert!(!html.contains("class=\"fail\">Incorrect"));
    }

    #[test]
    fn source_name_is_escaped() {
        let html = generate_html(&graded_sample());
        assert!(html.contains("pareja&lt;1&gt;.xlsx"));
        assert!(!html.contains("pareja<1>.xlsx"));
    }

    #[test]
    fn placeholders_are_shown_as_warnings() {
        let html = generate_html(&placeholder_report());
        assert!(html.contains("This section could not be graded."));
        assert!(html.contains("requires the chlorophyll mass"));
        assert!(html.contains("Reduction kinetics"));
    }

    #[test]
    fn html_report_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");

        write_html_report(&placeholder_report(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }

    #[test]
    fn score_formatting() {
        assert_eq!(format_score(Some(87.54)), "87.5%");
        assert_eq!(format_score(None), "-");
        assert_eq!(score_class(Some(40.0)), "fail");
    }
}
