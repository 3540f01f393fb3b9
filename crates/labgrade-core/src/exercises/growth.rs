//! Practical 2: auxin-induced coleoptile growth and pea seeds under salt
//! stress. Both tables are transposed: one column per treatment.

use crate::chart::Chart;
use crate::config::GradingConfig;
use crate::error::ExtractError;
use crate::formulas::{percent_change, COLEOPTILE_INITIAL_MM};
use crate::model::{Cell, Table};
use crate::report::{GradedSection, SectionReport};
use crate::schema::{extract_table, FieldSpec, Layout, RangeSchema, RowPolicy, TableSchema};
use crate::workbook::SheetGrid;

use super::{check, finish, label_or, Exercise, ExerciseId, SectionInfo};

const SHEET: &str = "Practica 2";

pub const CORN: TableSchema = TableSchema {
    key: "corn",
    sheet: SHEET,
    origin: "B9",
    rows: 2,
    records: 4,
    header_row: Some(8),
    layout: Layout::Columns,
    policy: RowPolicy::SkipBlank,
    fields: &[FieldSpec::number("mean_length"), FieldSpec::entered("variation")],
};

pub const PEA: TableSchema = TableSchema {
    key: "pea",
    sheet: SHEET,
    origin: "H9",
    rows: 7,
    records: 3,
    header_row: Some(8),
    layout: Layout::Columns,
    policy: RowPolicy::SkipBlank,
    fields: &[
        FieldSpec::number("dry").labelled("Peso seco (g)"),
        FieldSpec::number("wet").labelled("Peso húmedo (g)"),
    ],
};

/// Optional staining results in the same block as [`PEA`].
pub const PEA_STAINING: TableSchema = TableSchema {
    key: "pea_staining",
    sheet: SHEET,
    origin: "H9",
    rows: 7,
    records: 3,
    header_row: Some(8),
    layout: Layout::Columns,
    policy: RowPolicy::SkipBlank,
    fields: &[
        FieldSpec::entered("tft").labelled("% embriones TFT"),
        FieldSpec::entered("nbt").labelled("% cotiledones NBT+"),
        FieldSpec::entered("nbt_strong").labelled("% cotiledones NBT++"),
    ],
};

const SECTIONS: &[SectionInfo] = &[
    SectionInfo {
        key: "corn",
        title: "Maize coleoptile elongation with auxin",
    },
    SectionInfo {
        key: "pea",
        title: "Pea seeds under salt stress",
    },
];

const STAINS: [(&str, &str); 3] = [
    ("tft", "TFT+ embryos (%)"),
    ("nbt", "NBT+ cotyledons (%)"),
    ("nbt_strong", "NBT++ cotyledons (%)"),
];

pub struct GrowthRegulators;

impl Exercise for GrowthRegulators {
    fn id(&self) -> ExerciseId {
        ExerciseId::GrowthRegulators
    }

    fn sections(&self) -> &'static [SectionInfo] {
        SECTIONS
    }

    fn schemas(&self) -> Vec<RangeSchema> {
        vec![
            RangeSchema::Table(&CORN),
            RangeSchema::Table(&PEA),
            RangeSchema::Table(&PEA_STAINING),
        ]
    }

    fn grade(&self, grid: &SheetGrid, config: &GradingConfig) -> Vec<SectionReport> {
        vec![
            finish(&SECTIONS[0], corn(grid, config)),
            finish(&SECTIONS[1], pea(grid)),
        ]
    }
}

fn corn(grid: &SheetGrid, config: &GradingConfig) -> Result<GradedSection, ExtractError> {
    let records = extract_table(grid, &CORN)?;
    let mut table = Table::new(
        "Coleoptile growth",
        [
            "Treatment",
            "Mean length (mm)",
            "Student variation (%)",
            "Correct variation (%)",
            "Check",
        ],
    );
    let mut categories = Vec::new();
    let mut student_values = Vec::new();
    let mut correct_values = Vec::new();
    for (i, r) in records.iter().enumerate() {
        let treatment = label_or(r.label.as_deref(), i);
        let length = r.number("mean_length")?;
        let correct = percent_change(COLEOPTILE_INITIAL_MM, length);
        let student = r.entered("variation");
        table.push_row(vec![
            Cell::text(&treatment),
            Cell::number(length),
            Cell::entered(student),
            Cell::number(correct),
            check(student, correct, config),
        ]);
        categories.push(treatment);
        student_values.push(student.unwrap_or(f64::NAN));
        correct_values.push(correct);
    }

    let chart = Chart::bars("Coleoptile elongation", "Treatment", "Variation (%)", categories)
        .with_series("Student", student_values)
        .with_series("Expected", correct_values);
    Ok(GradedSection::new().table(table).chart(chart).note(format!(
        "Variation (%) = (mean length − {COLEOPTILE_INITIAL_MM}) / {COLEOPTILE_INITIAL_MM} × 100."
    )))
}

fn pea(grid: &SheetGrid) -> Result<GradedSection, ExtractError> {
    let records = extract_table(grid, &PEA)?;
    let mut table = Table::new(
        "Seed hydration",
        ["NaCl", "Dry weight (g)", "Wet weight (g)", "Weight change (%)"],
    );
    let mut categories = Vec::new();
    let mut changes = Vec::new();
    for (i, r) in records.iter().enumerate() {
        let label = label_or(r.label.as_deref(), i);
        let dry = r.number("dry")?;
        let wet = r.number("wet")?;
        let change = percent_change(dry, wet);
        table.push_row(vec![
            Cell::text(&label),
            Cell::number(dry),
            Cell::number(wet),
            Cell::number(change),
        ]);
        categories.push(label);
        changes.push(change);
    }

    let mut section = GradedSection::new()
        .table(table)
        .chart(
            Chart::bars("Water uptake", "NaCl", "Weight change (%)", categories)
                .with_series("Weight change", changes),
        )
        .note("Weight change (%) = (wet − dry) / dry × 100.");

    match staining(grid) {
        Ok(Some((table, chart))) => section = section.table(table).chart(chart),
        Ok(None) => {}
        Err(e) => tracing::debug!("pea staining not graded: {e}"),
    }
    Ok(section)
}

/// The TFT/NBT block, when the student filled it in.
fn staining(grid: &SheetGrid) -> Result<Option<(Table, Chart)>, ExtractError> {
    let records = extract_table(grid, &PEA_STAINING)?;
    let mut columns = vec!["NaCl"];
    columns.extend(STAINS.iter().map(|(_, title)| *title));
    let mut table = Table::new("Viability staining", columns);
    let categories: Vec<String> = records
        .iter()
        .enumerate()
        .map(|(i, r)| label_or(r.label.as_deref(), i))
        .collect();
    for (r, label) in records.iter().zip(&categories) {
        let mut row = vec![Cell::text(label)];
        row.extend(STAINS.iter().map(|(key, _)| Cell::entered(r.entered(key))));
        table.push_row(row);
    }

    let mut chart = Chart::bars("Viability staining", "NaCl", "Positive (%)", categories);
    let mut any = false;
    for (key, title) in STAINS {
        let values: Vec<Option<f64>> = records.iter().map(|r| r.entered(key)).collect();
        if values.iter().any(Option::is_some) {
            any = true;
            chart = chart.with_series(title, values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect());
        }
    }
    Ok(any.then_some((table, chart)))
}
