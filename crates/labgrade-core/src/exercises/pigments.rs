//! Practical 3: chlorophyll extraction, thin-layer chromatography and the
//! phycobiliproteins of Anabaena.

use crate::config::GradingConfig;
use crate::error::ExtractError;
use crate::formulas::{chlorophyll_concentration, chlorophyll_per_gram, round2, EXTRACT_DILUTION};
use crate::model::{Cell, Table, Verdict};
use crate::report::{GradedSection, SectionReport};
use crate::schema::{
    extract_scalars, extract_table, FieldSpec, Layout, RangeSchema, RowPolicy, ScalarSchema,
    TableSchema,
};
use crate::validate::{check_label, check_labels, check_rf_sequence};
use crate::workbook::SheetGrid;

use super::{check, finish, verdict, Exercise, ExerciseId, SectionInfo};

const SHEET: &str = "Practica 3";

/// Bands from the most to the least apolar pigment.
pub const EXPECTED_PIGMENTS: [&str; 6] = [
    "β-caroteno",
    "Clorofila a",
    "Clorofila b",
    "Luteina",
    "Violaxantina",
    "Neoxantina",
];

pub const ANABAENA_PIGMENT: &str = "Ficocianina";

pub const CHLOROPHYLL: ScalarSchema = ScalarSchema {
    key: "spinach_chlorophyll",
    sheet: SHEET,
    fields: &[
        FieldSpec::number("absorbance").at("G6"),
        FieldSpec::entered("concentration").at("G8"),
        FieldSpec::entered("per_gram").at("G10"),
    ],
};

pub const CHROMATOGRAPHY: TableSchema = TableSchema {
    key: "chromatography",
    sheet: SHEET,
    origin: "B17",
    rows: 6,
    records: 0,
    header_row: Some(16),
    layout: Layout::Rows,
    policy: RowPolicy::SkipBlank,
    fields: &[
        FieldSpec::text("band"),
        FieldSpec::number("pigment_distance"),
        FieldSpec::number("solvent_distance"),
        FieldSpec::entered("rf"),
        FieldSpec::text("pigment"),
    ],
};

pub const ANABAENA: ScalarSchema = ScalarSchema {
    key: "anabaena",
    sheet: SHEET,
    fields: &[
        FieldSpec::text("maxima").at("D27"),
        FieldSpec::text("pigment").at("D28"),
    ],
};

const SECTIONS: &[SectionInfo] = &[
    SectionInfo {
        key: "chlorophyll",
        title: "Chlorophyll a in spinach extract",
    },
    SectionInfo {
        key: "chromatography",
        title: "Pigment chromatography",
    },
    SectionInfo {
        key: "anabaena",
        title: "Anabaena pigments",
    },
];

pub struct Pigments;

impl Exercise for Pigments {
    fn id(&self) -> ExerciseId {
        ExerciseId::Pigments
    }

    fn sections(&self) -> &'static [SectionInfo] {
        SECTIONS
    }

    fn schemas(&self) -> Vec<RangeSchema> {
        vec![
            RangeSchema::Scalars(&CHLOROPHYLL),
            RangeSchema::Table(&CHROMATOGRAPHY),
            RangeSchema::Scalars(&ANABAENA),
        ]
    }

    fn grade(&self, grid: &SheetGrid, config: &GradingConfig) -> Vec<SectionReport> {
        vec![
            finish(&SECTIONS[0], chlorophyll(grid, config)),
            finish(&SECTIONS[1], chromatography(grid, config)),
            finish(&SECTIONS[2], anabaena(grid)),
        ]
    }
}

fn chlorophyll(grid: &SheetGrid, config: &GradingConfig) -> Result<GradedSection, ExtractError> {
    let record = extract_scalars(grid, &CHLOROPHYLL)?;
    let absorbance = record.number("absorbance")?;
    let concentration = chlorophyll_concentration(absorbance, EXTRACT_DILUTION);
    let per_gram = chlorophyll_per_gram(concentration);

    let mut table = Table::new("Chlorophyll a", ["Parameter", "Student", "Correct", "Check"]);
    for (name, student, correct) in [
        ("ABS 665 nm", Some(absorbance), absorbance),
        ("Chl a (mg/mL extract)", record.entered("concentration"), concentration),
        ("Chl a (mg/g leaf)", record.entered("per_gram"), per_gram),
    ] {
        table.push_row(vec![
            Cell::text(name),
            Cell::entered(student),
            Cell::number(correct),
            check(student, correct, config),
        ]);
    }
    Ok(GradedSection::new()
        .table(table)
        .note(format!(
            "Chl a (mg/mL) = ABS / 76.07 × {EXTRACT_DILUTION}; per gram = mg/mL × 8 mL / 4 g."
        ))
        .note(format!("Expected: {concentration} mg/mL, {per_gram} mg/g.")))
}

fn chromatography(grid: &SheetGrid, config: &GradingConfig) -> Result<GradedSection, ExtractError> {
    let records = extract_table(grid, &CHROMATOGRAPHY)?;
    let rfs: Vec<Option<f64>> = records.iter().map(|r| r.entered("rf")).collect();
    let sequence = match rfs.iter().copied().collect::<Option<Vec<f64>>>() {
        Some(values) => check_rf_sequence(&values),
        None => Verdict::Incorrect,
    };
    let names: Vec<(usize, Option<String>)> = records
        .iter()
        .map(|r| (r.offset as usize, r.text("pigment")))
        .collect();
    let identities = check_labels(&names, &EXPECTED_PIGMENTS);

    let mut table = Table::new(
        "Chromatogram",
        [
            "Band",
            "Pigment distance (cm)",
            "Solvent distance (cm)",
            "Student Rf",
            "Correct Rf",
            "Rf check",
            "Rf order",
            "Pigment",
            "Pigment check",
        ],
    );
    for (i, r) in records.iter().enumerate() {
        let pigment = r.number("pigment_distance")?;
        let solvent = r.number("solvent_distance")?;
        if solvent == 0.0 {
            return Err(ExtractError::Dependency {
                what: format!("a non-zero solvent distance in band {}", r.offset + 1),
            });
        }
        let rf = round2(pigment / solvent);
        table.push_row(vec![
            Cell::text(r.text("band").unwrap_or_else(|| (r.offset + 1).to_string())),
            Cell::number(pigment),
            Cell::number(solvent),
            Cell::entered(rfs[i]),
            Cell::number(rf),
            check(rfs[i], rf, config),
            verdict(sequence),
            Cell::text(names[i].1.clone().unwrap_or_default()),
            verdict(identities[i]),
        ]);
    }

    Ok(GradedSection::new()
        .table(table)
        .note("Rf = pigment distance / solvent distance. The first band runs with the front (Rf = 1) and Rf decreases with polarity.")
        .note(format!("Expected order: {}.", EXPECTED_PIGMENTS.join(" > "))))
}

fn anabaena(grid: &SheetGrid) -> Result<GradedSection, ExtractError> {
    let record = extract_scalars(grid, &ANABAENA)?;
    let maxima = record.text("maxima");
    let pigment = record.text("pigment");
    if maxima.is_none() && pigment.is_none() {
        return Err(ExtractError::MissingValue {
            sheet: grid.name().to_string(),
            cell: "D27:D28".into(),
            field: "anabaena".into(),
        });
    }

    let mut table = Table::new("Anabaena", ["Result", "Student", "Correct", "Check"]);
    table.push_row(vec![
        Cell::text("Absorption maxima"),
        Cell::text(maxima.unwrap_or_default()),
        Cell::Empty,
        Cell::Empty,
    ]);
    table.push_row(vec![
        Cell::text("Pigment"),
        Cell::text(pigment.clone().unwrap_or_default()),
        Cell::text(ANABAENA_PIGMENT),
        verdict(check_label(pigment.as_deref(), ANABAENA_PIGMENT)),
    ]);
    Ok(GradedSection::new()
        .table(table)
        .note("Cyanobacteria harvest light with phycobiliproteins; phycocyanin absorbs around 620 nm."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn chromatogram(rfs: &[f64]) -> SheetGrid {
        let mut grid = SheetGrid::new(SHEET);
        for (i, rf) in rfs.iter().enumerate() {
            grid = grid.with_row(
                &format!("B{}", 17 + i),
                [
                    CellValue::from((i + 1) as f64),
                    (rf * 8.0).into(),
                    8.0.into(),
                    (*rf).into(),
                    EXPECTED_PIGMENTS[i].into(),
                ],
            );
        }
        grid
    }

    #[test]
    fn chlorophyll_parameters() {
        let grid = SheetGrid::new(SHEET).with("G6", 0.532).with("G8", 0.35).with("G10", 0.9);
        let section = chlorophyll(&grid, &GradingConfig::default()).unwrap();
        let verdicts: Vec<Verdict> = section.verdicts().collect();
        assert_eq!(verdicts, vec![Verdict::Correct, Verdict::Correct, Verdict::Incorrect]);
    }

    #[test]
    fn chromatography_sequence_and_identities() {
        let section = chromatography(&chromatogram(&[1.0, 0.79, 0.61, 0.45]), &GradingConfig::default()).unwrap();
        assert!(section.verdicts().all(|v| v.is_correct()));
        assert_eq!(section.tables[0].len(), 4);
    }

    #[test]
    fn blank_band_keeps_later_pigments_in_place() {
        let mut grid = chromatogram(&[1.0, 0.79, 0.61, 0.45]);
        for col in 1..=5 {
            grid.set(17, col, CellValue::Empty);
        }
        let section = chromatography(&grid, &GradingConfig::default()).unwrap();
        assert_eq!(section.tables[0].len(), 3);
        assert!(section.verdicts().all(|v| v.is_correct()));
    }

    #[test]
    fn chromatography_rejects_a_non_decreasing_sequence() {
        let section = chromatography(&chromatogram(&[1.0, 0.5, 0.6]), &GradingConfig::default()).unwrap();
        let order = section.tables[0].column_index("Rf order").unwrap();
        assert!(section.tables[0]
            .rows
            .iter()
            .all(|row| row[order] == Cell::Verdict(Verdict::Incorrect)));
    }

    #[test]
    fn anabaena_pigment_is_case_insensitive() {
        let grid = SheetGrid::new(SHEET).with("D27", "620 nm").with("D28", "ficocianina");
        let section = anabaena(&grid).unwrap();
        assert_eq!(section.verdicts().collect::<Vec<_>>(), vec![Verdict::Correct]);
        assert!(anabaena(&SheetGrid::new(SHEET)).is_err());
    }
}
