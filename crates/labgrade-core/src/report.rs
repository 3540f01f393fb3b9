//! The graded report bundle with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chart::Chart;
use crate::exercises::ExerciseId;
use crate::model::{Metric, Table, Verdict};

/// Everything produced by one grading pass over one workbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// File name of the graded workbook.
    pub source: String,
    /// One entry per exercise, in exercise order.
    pub exercises: Vec<ExerciseReport>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseReport {
    pub id: ExerciseId,
    pub title: String,
    pub sheet: String,
    pub sections: Vec<SectionReport>,
}

/// One block of an exercise, e.g. the onion plasmolysis table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionReport {
    pub key: String,
    pub title: String,
    pub outcome: SectionOutcome,
}

/// Either the graded content or the reason it could not be read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome {
    Graded(GradedSection),
    Unreadable { reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradedSection {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub charts: Vec<Chart>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    /// Fit failures and similar problems that left the tables intact.
    #[serde(default)]
    pub issues: Vec<String>,
    /// Explanatory text shown with the section.
    #[serde(default)]
    pub notes: Vec<String>,
}

impl GradedSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn chart(mut self, chart: Chart) -> Self {
        self.charts.push(chart);
        self
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn issue(mut self, issue: impl Into<String>) -> Self {
        self.issues.push(issue.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn verdicts(&self) -> impl Iterator<Item = Verdict> + '_ {
        self.tables.iter().flat_map(|t| t.verdicts())
    }
}

impl SectionReport {
    pub fn graded(key: impl Into<String>, title: impl Into<String>, section: GradedSection) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            outcome: SectionOutcome::Graded(section),
        }
    }

    pub fn unreadable(key: impl Into<String>, title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            outcome: SectionOutcome::Unreadable {
                reason: reason.into(),
            },
        }
    }

    pub fn is_graded(&self) -> bool {
        matches!(self.outcome, SectionOutcome::Graded(_))
    }

    pub fn graded_section(&self) -> Option<&GradedSection> {
        match &self.outcome {
            SectionOutcome::Graded(g) => Some(g),
            SectionOutcome::Unreadable { .. } => None,
        }
    }
}

impl ExerciseReport {
    /// Sections that could not be read.
    pub fn unreadable(&self) -> impl Iterator<Item = &SectionReport> {
        self.sections.iter().filter(|s| !s.is_graded())
    }

    pub fn section(&self, key: &str) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn summary(&self) -> ExerciseSummary {
        let mut summary = ExerciseSummary {
            id: self.id,
            title: self.title.clone(),
            ..Default::default()
        };
        for section in &self.sections {
            match &section.outcome {
                SectionOutcome::Graded(g) => {
                    summary.graded_sections += 1;
                    summary.issues += g.issues.len();
                    for v in g.verdicts() {
                        match v {
                            Verdict::Correct => summary.correct += 1,
                            Verdict::Incorrect => summary.incorrect += 1,
                        }
                    }
                }
                SectionOutcome::Unreadable { .. } => summary.unreadable_sections += 1,
            }
        }
        summary
    }
}

/// Verdict and section counts for one exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub id: ExerciseId,
    pub title: String,
    pub correct: usize,
    pub incorrect: usize,
    pub graded_sections: usize,
    pub unreadable_sections: usize,
    pub issues: usize,
}

impl ExerciseSummary {
    /// Share of checked entries that were correct, in percent.
    pub fn score(&self) -> Option<f64> {
        let total = self.correct + self.incorrect;
        (total > 0).then(|| self.correct as f64 / total as f64 * 100.0)
    }
}

/// Totals over the whole report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub exercises: Vec<ExerciseSummary>,
    pub correct: usize,
    pub incorrect: usize,
    pub graded_sections: usize,
    pub unreadable_sections: usize,
}

impl ReportSummary {
    pub fn score(&self) -> Option<f64> {
        let total = self.correct + self.incorrect;
        (total > 0).then(|| self.correct as f64 / total as f64 * 100.0)
    }
}

impl GradeReport {
    pub fn summary(&self) -> ReportSummary {
        let exercises: Vec<ExerciseSummary> = self.exercises.iter().map(|e| e.summary()).collect();
        ReportSummary {
            correct: exercises.iter().map(|e| e.correct).sum(),
            incorrect: exercises.iter().map(|e| e.incorrect).sum(),
            graded_sections: exercises.iter().map(|e| e.graded_sections).sum(),
            unreadable_sections: exercises.iter().map(|e| e.unreadable_sections).sum(),
            exercises,
        }
    }

    pub fn exercise(&self, id: ExerciseId) -> Option<&ExerciseReport> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradeReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
