//! Central grading orchestrator.
//!
//! One pass over one workbook: check the marker sheet, then grade every
//! practical in course order. Only the marker check can fail the pass;
//! everything else degrades to per-section placeholders.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::config::GradingConfig;
use crate::error::{ExtractError, GradeError};
use crate::exercises::{self, Exercise, ExerciseId};
use crate::report::{ExerciseReport, GradeReport, SectionReport};
use crate::workbook::{SheetGrid, Workbook};

/// Progress reporting trait.
pub trait ProgressReporter {
    fn on_exercise_start(&self, id: ExerciseId, title: &str);
    fn on_section(&self, id: ExerciseId, section: &SectionReport);
    fn on_exercise_complete(&self, report: &ExerciseReport);
    fn on_complete(&self, report: &GradeReport, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_exercise_start(&self, _: ExerciseId, _: &str) {}
    fn on_section(&self, _: ExerciseId, _: &SectionReport) {}
    fn on_exercise_complete(&self, _: &ExerciseReport) {}
    fn on_complete(&self, _: &GradeReport, _: Duration) {}
}

/// Result of reading one declared range without grading it.
#[derive(Debug)]
pub struct RangeCheck {
    pub exercise: ExerciseId,
    pub key: &'static str,
    pub sheet: &'static str,
    pub range: String,
    /// Number of records read, or why the range could not be read.
    pub outcome: Result<usize, ExtractError>,
}

/// The grading engine.
pub struct Grader {
    config: GradingConfig,
    exercises: Vec<Box<dyn Exercise>>,
}

impl Grader {
    pub fn new(config: GradingConfig) -> Self {
        Self {
            config,
            exercises: exercises::all(),
        }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Fail unless the workbook carries the marker sheet.
    pub fn check_format(&self, workbook: &dyn Workbook) -> Result<(), GradeError> {
        let marker = &self.config.marker_sheet;
        if workbook.has_sheet(marker) {
            Ok(())
        } else {
            Err(GradeError::MissingMarkerSheet {
                marker: marker.clone(),
                found: workbook.sheet_names(),
            })
        }
    }

    /// Grade every practical in the workbook.
    pub fn grade(
        &self,
        workbook: &mut dyn Workbook,
        source: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<GradeReport, GradeError> {
        let start = Instant::now();
        self.check_format(workbook)?;
        tracing::info!("grading '{source}'");

        let mut reports = Vec::with_capacity(self.exercises.len());
        for exercise in &self.exercises {
            let id = exercise.id();
            progress.on_exercise_start(id, id.title());

            let sections = match workbook.sheet(id.sheet()) {
                Ok(grid) => exercise.grade(&grid, &self.config),
                Err(e) => {
                    tracing::warn!("{}: {e}", id.title());
                    exercise.unreadable(&e.to_string())
                }
            };
            for section in &sections {
                progress.on_section(id, section);
            }

            let report = ExerciseReport {
                id,
                title: id.title().to_string(),
                sheet: id.sheet().to_string(),
                sections,
            };
            let placeholders = report.unreadable().count();
            if placeholders > 0 {
                tracing::warn!("{}: {placeholders} section(s) could not be read", id.title());
            } else {
                tracing::debug!("{}: all sections graded", id.title());
            }
            progress.on_exercise_complete(&report);
            reports.push(report);
        }

        let elapsed = start.elapsed();
        let report = GradeReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            source: source.to_string(),
            exercises: reports,
            duration_ms: elapsed.as_millis() as u64,
        };
        progress.on_complete(&report, elapsed);
        Ok(report)
    }

    /// Read every declared range and report what was found, without grading.
    pub fn dry_run(&self, workbook: &mut dyn Workbook) -> Result<Vec<RangeCheck>, GradeError> {
        self.check_format(workbook)?;

        let mut sheets: HashMap<&'static str, Result<SheetGrid, ExtractError>> = HashMap::new();
        let mut checks = Vec::new();
        for exercise in &self.exercises {
            let id = exercise.id();
            let grid = sheets
                .entry(id.sheet())
                .or_insert_with(|| workbook.sheet(id.sheet()));
            for schema in exercise.schemas() {
                let outcome = match grid.as_ref() {
                    Ok(grid) => schema.dry_run(grid),
                    Err(e) => Err(e.clone()),
                };
                checks.push(RangeCheck {
                    exercise: id,
                    key: schema.key(),
                    sheet: schema.sheet(),
                    range: schema.range(),
                    outcome,
                });
            }
        }
        Ok(checks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::MemoryWorkbook;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl ProgressReporter for Recorder {
        fn on_exercise_start(&self, id: ExerciseId, _: &str) {
            self.events.borrow_mut().push(format!("start {id}"));
        }
        fn on_section(&self, _: ExerciseId, section: &SectionReport) {
            self.events.borrow_mut().push(format!("section {}", section.key));
        }
        fn on_exercise_complete(&self, report: &ExerciseReport) {
            self.events.borrow_mut().push(format!("done {}", report.id));
        }
        fn on_complete(&self, _: &GradeReport, _: Duration) {
            self.events.borrow_mut().push("complete".into());
        }
    }

    #[test]
    fn missing_marker_aborts_before_any_exercise() {
        let mut wb = MemoryWorkbook::new().with_sheet(SheetGrid::new("Practica 1"));
        let recorder = Recorder::default();
        let err = Grader::new(GradingConfig::default())
            .grade(&mut wb, "x.xlsx", &recorder)
            .unwrap_err();
        assert!(matches!(err, GradeError::MissingMarkerSheet { .. }));
        assert!(err.to_string().contains("INFO PAREJA"));
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn empty_template_yields_placeholders_everywhere() {
        let mut wb = MemoryWorkbook::new().with_sheet(SheetGrid::new("INFO PAREJA"));
        let recorder = Recorder::default();
        let report = Grader::new(GradingConfig::default())
            .grade(&mut wb, "empty.xlsx", &recorder)
            .unwrap();
        assert_eq!(report.exercises.len(), 5);
        for exercise in &report.exercises {
            assert_eq!(exercise.unreadable().count(), exercise.sections.len());
        }
        let events = recorder.events.borrow();
        assert_eq!(events.first().map(String::as_str), Some("start water_potential"));
        assert_eq!(events.last().map(String::as_str), Some("complete"));
    }

    #[test]
    fn custom_marker_sheet() {
        let config = GradingConfig {
            marker_sheet: "GRUPO".into(),
            ..GradingConfig::default()
        };
        let wb = MemoryWorkbook::new().with_sheet(SheetGrid::new("GRUPO"));
        assert!(Grader::new(config).check_format(&wb).is_ok());
    }

    #[test]
    fn dry_run_reports_every_range() {
        let mut wb = MemoryWorkbook::new()
            .with_sheet(SheetGrid::new("INFO PAREJA"))
            .with_sheet(SheetGrid::new("Practica 5").with("E4", 90.0));
        let checks = Grader::new(GradingConfig::default()).dry_run(&mut wb).unwrap();
        assert_eq!(checks.len(), exercises::all_schemas().len());
        let germination = checks.iter().find(|c| c.key == "germination").unwrap();
        assert!(matches!(germination.outcome, Ok(1)));
        let sucrose = checks.iter().find(|c| c.key == "sucrose").unwrap();
        assert!(matches!(sucrose.outcome, Err(ExtractError::MissingSheet(_))));
    }
}
