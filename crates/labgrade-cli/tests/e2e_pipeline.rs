//! End-to-end grading tests on the built-in sample workbook.
//!
//! These run the full pipeline (marker check, extraction, validation, fits,
//! report assembly and rendering) on correct data and on deliberately
//! damaged copies of it.

use labgrade_core::config::GradingConfig;
use labgrade_core::engine::{Grader, NoopReporter};
use labgrade_core::error::GradeError;
use labgrade_core::exercises::ExerciseId;
use labgrade_core::fixtures::sample_workbook;
use labgrade_core::model::CellValue;
use labgrade_core::report::{GradeReport, SectionOutcome};
use labgrade_core::workbook::{MemoryWorkbook, Workbook};

fn grade(wb: &mut MemoryWorkbook) -> GradeReport {
    Grader::new(GradingConfig::default())
        .grade(wb, "pareja.xlsx", &NoopReporter)
        .unwrap()
}

fn metric(report: &GradeReport, id: ExerciseId, section: &str, prefix: &str) -> f64 {
    let section = report.exercise(id).unwrap().section(section).unwrap();
    let graded = section.graded_section().expect("section should be graded");
    graded
        .metrics
        .iter()
        .find(|m| m.label.starts_with(prefix))
        .unwrap_or_else(|| panic!("no metric '{prefix}' in {:?}", graded.metrics))
        .value
}

/// Replace one sheet of the workbook after editing it.
fn edit_sheet(wb: &mut MemoryWorkbook, name: &str, edit: impl FnOnce(&mut labgrade_core::SheetGrid)) {
    let mut grid = wb.sheet(name).unwrap();
    edit(&mut grid);
    wb.insert(grid);
}

#[test]
fn e2e_sample_grades_every_exercise() {
    let report = grade(&mut sample_workbook());

    assert_eq!(report.exercises.len(), 5);
    let ids: Vec<ExerciseId> = report.exercises.iter().map(|e| e.id).collect();
    assert_eq!(ids, ExerciseId::ALL);

    let summary = report.summary();
    assert_eq!(summary.unreadable_sections, 0);
    assert_eq!(summary.incorrect, 0);
    assert_eq!(summary.score(), Some(100.0));
}

#[test]
fn e2e_missing_marker_sheet_aborts() {
    let mut wb = sample_workbook();
    wb.remove("INFO PAREJA");

    let err = Grader::new(GradingConfig::default())
        .grade(&mut wb, "pareja.xlsx", &NoopReporter)
        .unwrap_err();
    match err {
        GradeError::MissingMarkerSheet { marker, found } => {
            assert_eq!(marker, "INFO PAREJA");
            assert_eq!(found.len(), 5);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn e2e_missing_sheet_only_affects_its_exercise() {
    let mut wb = sample_workbook();
    wb.remove("Practica 3");
    let report = grade(&mut wb);

    for exercise in &report.exercises {
        let unreadable = exercise.unreadable().count();
        if exercise.id == ExerciseId::Pigments {
            assert_eq!(unreadable, exercise.sections.len());
            for section in &exercise.sections {
                match &section.outcome {
                    SectionOutcome::Unreadable { reason } => {
                        assert!(reason.starts_with("could not read data"), "{reason}");
                        assert!(reason.contains("Practica 3"), "{reason}");
                    }
                    SectionOutcome::Graded(_) => panic!("{} should be a placeholder", section.key),
                }
            }
        } else {
            assert_eq!(unreadable, 0, "{}", exercise.title);
        }
    }
}

#[test]
fn e2e_broken_ferricyanide_table_blocks_kinetics() {
    let mut wb = sample_workbook();
    edit_sheet(&mut wb, "Practica 4", |grid| {
        // C13: ABS 420 of the first tube
        grid.set(12, 2, CellValue::from("n/a"));
    });
    let report = grade(&mut wb);
    let hill = report.exercise(ExerciseId::HillReaction).unwrap();

    assert!(hill.section("chlorophyll").unwrap().is_graded());
    assert!(!hill.section("ferricyanide").unwrap().is_graded());
    match &hill.section("kinetics").unwrap().outcome {
        SectionOutcome::Unreadable { reason } => {
            assert!(reason.contains("ferricyanide concentrations"), "{reason}")
        }
        SectionOutcome::Graded(_) => panic!("kinetics should depend on the ferricyanide table"),
    }
}

#[test]
fn e2e_wrong_student_value_is_incorrect() {
    let mut wb = sample_workbook();
    edit_sheet(&mut wb, "Practica 1", |grid| {
        // C7: Ψπ of 0.05 M sucrose, expected -0.12
        grid.set(6, 2, -0.5);
    });
    let report = grade(&mut wb);

    let summary = report.summary();
    assert_eq!(summary.incorrect, 1);
    assert_eq!(summary.exercises[0].incorrect, 1);
    assert_eq!(summary.unreadable_sections, 0);
}

#[test]
fn e2e_decimal_comma_text_is_accepted() {
    let mut wb = sample_workbook();
    edit_sheet(&mut wb, "Practica 1", |grid| {
        grid.set(6, 2, CellValue::from("-0,12"));
    });
    let report = grade(&mut wb);
    assert_eq!(report.summary().incorrect, 0);
}

#[test]
fn e2e_tissue_potentials() {
    let report = grade(&mut sample_workbook());

    let onion = metric(&report, ExerciseId::WaterPotential, "onion", "Tissue osmotic potential");
    assert!(onion > -1.23 && onion < -0.74, "onion potential {onion}");

    let potato = metric(&report, ExerciseId::WaterPotential, "potato", "Tissue water potential");
    assert!(potato > -1.0 && potato < -0.7, "potato potential {potato}");
}

#[test]
fn e2e_hill_rates() {
    let report = grade(&mut sample_workbook());

    let rate = metric(&report, ExerciseId::HillReaction, "kinetics", "Reduction rate");
    assert!((rate - 0.39).abs() < 0.02, "rate {rate}");
    let oxygen = metric(&report, ExerciseId::HillReaction, "kinetics", "O₂ release");
    assert!((oxygen - 5.85).abs() < 0.3, "oxygen {oxygen}");
}

#[test]
fn e2e_report_renders_and_persists() {
    let report = grade(&mut sample_workbook());
    let dir = tempfile::tempdir().unwrap();

    let json = dir.path().join("report.json");
    report.save_json(&json).unwrap();
    let loaded = GradeReport::load_json(&json).unwrap();
    assert_eq!(loaded.id, report.id);
    assert_eq!(loaded.summary(), report.summary());

    let html = labgrade_report::generate_html(&loaded);
    let doc = labgrade_report::generate_document(&loaded);
    for exercise in &report.exercises {
        let title = exercise.title.replace('&', "&amp;");
        assert!(html.contains(&title));
        assert!(doc.contains(&title));
    }
}
