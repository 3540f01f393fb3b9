//! Practical 5: seed germination and gibberellin-induced α-amylase.

use crate::chart::Chart;
use crate::config::GradingConfig;
use crate::error::ExtractError;
use crate::formulas::{amylase_activity, starch_degraded};
use crate::model::{format_number, Cell, Metric, Table};
use crate::report::{GradedSection, SectionReport};
use crate::schema::{
    extract_scalars, extract_table, FieldSpec, Layout, RangeSchema, RowPolicy, ScalarSchema,
    TableSchema,
};
use crate::workbook::SheetGrid;

use super::{check, finish, label_or, Exercise, ExerciseId, SectionInfo};

const SHEET: &str = "Practica 5";

pub const GERMINATION: ScalarSchema = ScalarSchema {
    key: "germination",
    sheet: SHEET,
    fields: &[FieldSpec::number("germination").at("E4")],
};

pub const AMYLASE: TableSchema = TableSchema {
    key: "amylase",
    sheet: SHEET,
    origin: "B11",
    rows: 5,
    records: 0,
    header_row: Some(10),
    layout: Layout::Rows,
    policy: RowPolicy::SkipBlank,
    fields: &[
        FieldSpec::text("sample"),
        FieldSpec::text("seed"),
        FieldSpec::text("treatment"),
        FieldSpec::number("dry_mg"),
        FieldSpec::number("abs_initial"),
        FieldSpec::number("abs_final"),
        FieldSpec::entered("starch"),
        FieldSpec::entered("activity"),
    ],
};

const SECTIONS: &[SectionInfo] = &[
    SectionInfo {
        key: "germination",
        title: "Germination test",
    },
    SectionInfo {
        key: "amylase",
        title: "α-amylase activity",
    },
];

pub struct Germination;

impl Exercise for Germination {
    fn id(&self) -> ExerciseId {
        ExerciseId::Germination
    }

    fn sections(&self) -> &'static [SectionInfo] {
        SECTIONS
    }

    fn schemas(&self) -> Vec<RangeSchema> {
        vec![RangeSchema::Scalars(&GERMINATION), RangeSchema::Table(&AMYLASE)]
    }

    fn grade(&self, grid: &SheetGrid, config: &GradingConfig) -> Vec<SectionReport> {
        vec![
            finish(&SECTIONS[0], germination(grid, config)),
            finish(&SECTIONS[1], amylase(grid, config)),
        ]
    }
}

fn germination(grid: &SheetGrid, config: &GradingConfig) -> Result<GradedSection, ExtractError> {
    let record = extract_scalars(grid, &GERMINATION)?;
    let percent = record.number("germination")?;
    let suitable = percent > config.germination_threshold;

    let mut table = Table::new("Germination", ["Germination (%)", "Threshold (%)", "Suitable lot"]);
    table.push_row(vec![
        Cell::number(percent),
        Cell::number(config.germination_threshold),
        Cell::text(if suitable { "Yes" } else { "No" }),
    ]);
    Ok(GradedSection::new()
        .table(table)
        .metric(Metric::new("Germination", percent, "%"))
        .note(format!(
            "A seed lot is suitable for the assay when more than {} % of the seeds germinate.",
            format_number(config.germination_threshold)
        )))
}

fn amylase(grid: &SheetGrid, config: &GradingConfig) -> Result<GradedSection, ExtractError> {
    let records = extract_table(grid, &AMYLASE)?;
    let mut table = Table::new(
        "α-amylase",
        [
            "Sample",
            "Seed",
            "Treatment",
            "Dry mass (mg)",
            "ABS t0",
            "ABS t10",
            "Student starch (mg/h)",
            "Correct starch (mg/h)",
            "Starch check",
            "Student activity (mg/h·mg)",
            "Correct activity (mg/h·mg)",
            "Activity check",
        ],
    );
    let mut categories = Vec::new();
    let mut student_activity = Vec::new();
    let mut correct_activity = Vec::new();
    for (i, r) in records.iter().enumerate() {
        let dry = r.number("dry_mg")?;
        let a0 = r.number("abs_initial")?;
        let a10 = r.number("abs_final")?;
        if dry == 0.0 {
            return Err(ExtractError::Dependency {
                what: format!("a non-zero dry mass for sample {}", i + 1),
            });
        }
        let starch = starch_degraded(a0, a10);
        let activity = amylase_activity(starch, dry);
        let student_starch = r.entered("starch");
        let student_act = r.entered("activity");

        let seed = r.text("seed").unwrap_or_default();
        let treatment = r.text("treatment").unwrap_or_default();
        table.push_row(vec![
            Cell::text(r.text("sample").unwrap_or_else(|| (i + 1).to_string())),
            Cell::text(&seed),
            Cell::text(&treatment),
            Cell::number(dry),
            Cell::number(a0),
            Cell::number(a10),
            Cell::entered(student_starch),
            Cell::number(starch),
            check(student_starch, starch, config),
            Cell::entered(student_act),
            Cell::number(activity),
            check(student_act, activity, config),
        ]);

        let category = match (seed.is_empty(), treatment.is_empty()) {
            (false, false) => format!("{seed} / {treatment}"),
            (false, true) => seed,
            (true, false) => treatment,
            (true, true) => label_or(None, i),
        };
        categories.push(category);
        student_activity.push(student_act.unwrap_or(f64::NAN));
        correct_activity.push(activity);
    }

    let chart = Chart::bars("α-amylase activity", "Seed / treatment", "mg starch / (h·mg seed)", categories)
        .with_series("Student", student_activity)
        .with_series("Expected", correct_activity);
    Ok(GradedSection::new()
        .table(table)
        .chart(chart)
        .note("Starch (mg/h) = (ABS t0 − ABS t10) / 11.4 × 7 × 6.")
        .note("Activity = starch / (dry mass / 10 × 0.25)."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;
    use crate::model::{CellValue, Verdict};

    #[test]
    fn germination_threshold_is_strict() {
        let config = GradingConfig::default();
        let at = germination(&SheetGrid::new(SHEET).with("E4", 80.0), &config).unwrap();
        assert_eq!(at.tables[0].rows[0][2], Cell::text("No"));
        let above = germination(&SheetGrid::new(SHEET).with("E4", 92.0), &config).unwrap();
        assert_eq!(above.tables[0].rows[0][2], Cell::text("Yes"));
    }

    #[test]
    fn amylase_checks_starch_and_activity() {
        let grid = SheetGrid::new(SHEET)
            .with_row(
                "B11",
                [
                    CellValue::from(1.0),
                    "Entera".into(),
                    "Agua".into(),
                    250.0.into(),
                    1.2.into(),
                    0.7.into(),
                    1.84.into(),
                    0.29.into(),
                ],
            )
            .with_row(
                "B12",
                [
                    CellValue::from(2.0),
                    "Sin embrión".into(),
                    "GA3".into(),
                    245.0.into(),
                    1.2.into(),
                    0.6.into(),
                    2.21.into(),
                    1.0.into(),
                ],
            );
        let section = amylase(&grid, &GradingConfig::default()).unwrap();
        let verdicts: Vec<Verdict> = section.verdicts().collect();
        assert_eq!(
            verdicts,
            vec![Verdict::Correct, Verdict::Correct, Verdict::Correct, Verdict::Incorrect]
        );
        assert_eq!(section.charts.len(), 1);

        let section = amylase(&grid.with("I12", CellValue::Empty), &GradingConfig::default()).unwrap();
        let ChartKind::Bars(bars) = &section.charts[0].kind else {
            panic!("expected bars");
        };
        assert!(bars.series[0].values[1].is_nan());
        assert!(bars.series[1].values[1].is_finite());
    }

    #[test]
    fn amylase_needs_rows() {
        let err = amylase(&SheetGrid::new(SHEET), &GradingConfig::default()).unwrap_err();
        assert!(matches!(err, ExtractError::NoRows { .. }));
    }
}
