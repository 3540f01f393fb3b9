//! Practical 4: the Hill reaction in isolated thylakoids.
//!
//! The kinetics section reuses the recomputed chlorophyll mass and the
//! ferricyanide concentrations of tubes 4 to 7, so it is only graded when
//! both earlier sections were read.

use crate::chart::Chart;
use crate::config::GradingConfig;
use crate::error::ExtractError;
use crate::fit::fit_linear;
use crate::formulas::{
    chlorophyll_concentration, chlorophyll_in_suspension, dcmu_activity, ferricyanide, hill_rates,
    hill_reduction, round2, THYLAKOID_DILUTION,
};
use crate::model::{Cell, Metric, Table};
use crate::report::{GradedSection, SectionReport};
use crate::schema::{
    extract_scalars, extract_table, FieldSpec, Layout, RangeSchema, RowPolicy, ScalarSchema,
    TableSchema,
};
use crate::workbook::SheetGrid;
use std::collections::BTreeMap;

use super::{check, finish, Exercise, ExerciseId, SectionInfo};

const SHEET: &str = "Practica 4";

/// Ferricyanide row offset of the first light-driven tube (tube 4); kinetics
/// row `k` reads tube `4 + k`.
const KINETIC_TUBES: u32 = 3;
/// Ferricyanide row offset of the DCMU-inhibited tube.
const DCMU_TUBE: u32 = 7;

pub const CHLOROPHYLL: ScalarSchema = ScalarSchema {
    key: "thylakoid_chlorophyll",
    sheet: SHEET,
    fields: &[
        FieldSpec::number("absorbance").at("D6"),
        FieldSpec::entered("per_ml").at("D7"),
        FieldSpec::entered("mg").at("D8"),
    ],
};

pub const FERRICYANIDE: TableSchema = TableSchema {
    key: "ferricyanide",
    sheet: SHEET,
    origin: "B13",
    rows: 9,
    records: 0,
    header_row: Some(12),
    layout: Layout::Rows,
    policy: RowPolicy::SkipBlank,
    fields: &[
        FieldSpec::text("tube"),
        FieldSpec::number("absorbance"),
        FieldSpec::entered("concentration"),
    ],
};

pub const KINETICS: TableSchema = TableSchema {
    key: "kinetics",
    sheet: SHEET,
    origin: "B24",
    rows: 4,
    records: 0,
    header_row: None,
    layout: Layout::Rows,
    policy: RowPolicy::SkipBlank,
    fields: &[
        FieldSpec::text("tube"),
        FieldSpec::number("time"),
        FieldSpec::entered("reduction"),
    ],
};

const SECTIONS: &[SectionInfo] = &[
    SectionInfo {
        key: "chlorophyll",
        title: "Chlorophyll in the thylakoid suspension",
    },
    SectionInfo {
        key: "ferricyanide",
        title: "Ferricyanide concentration",
    },
    SectionInfo {
        key: "kinetics",
        title: "Ferricyanide reduction kinetics",
    },
];

pub struct HillReaction;

impl Exercise for HillReaction {
    fn id(&self) -> ExerciseId {
        ExerciseId::HillReaction
    }

    fn sections(&self) -> &'static [SectionInfo] {
        SECTIONS
    }

    fn schemas(&self) -> Vec<RangeSchema> {
        vec![
            RangeSchema::Scalars(&CHLOROPHYLL),
            RangeSchema::Table(&FERRICYANIDE),
            RangeSchema::Table(&KINETICS),
        ]
    }

    fn grade(&self, grid: &SheetGrid, config: &GradingConfig) -> Vec<SectionReport> {
        let chl = chlorophyll(grid, config);
        let ferri = ferricyanide_table(grid, config);

        let kinetic = match (&chl, &ferri) {
            (Ok((_, mg)), Ok((_, concentrations))) => kinetics(grid, config, *mg, concentrations),
            (Err(_), _) => Err(ExtractError::Dependency {
                what: "the chlorophyll mass".into(),
            }),
            (_, Err(_)) => Err(ExtractError::Dependency {
                what: "the ferricyanide concentrations".into(),
            }),
        };

        vec![
            finish(&SECTIONS[0], chl.map(|(section, _)| section)),
            finish(&SECTIONS[1], ferri.map(|(section, _)| section)),
            finish(&SECTIONS[2], kinetic),
        ]
    }
}

/// The section plus the recomputed chlorophyll mass per tube, in mg.
fn chlorophyll(grid: &SheetGrid, config: &GradingConfig) -> Result<(GradedSection, f64), ExtractError> {
    let record = extract_scalars(grid, &CHLOROPHYLL)?;
    let absorbance = record.number("absorbance")?;
    let per_ml = chlorophyll_concentration(absorbance, THYLAKOID_DILUTION);
    let mg = chlorophyll_in_suspension(per_ml);

    let mut table = Table::new("Chlorophyll", ["Parameter", "Student", "Correct", "Check"]);
    for (name, student, correct) in [
        ("ABS 665 nm", Some(absorbance), absorbance),
        ("Chl (mg/mL suspension)", record.entered("per_ml"), per_ml),
        ("Chl per tube (mg)", record.entered("mg"), mg),
    ] {
        table.push_row(vec![
            Cell::text(name),
            Cell::entered(student),
            Cell::number(correct),
            check(student, correct, config),
        ]);
    }
    let section = GradedSection::new().table(table).note(format!(
        "Chl (mg/mL) = ABS / 76.07 × {THYLAKOID_DILUTION}; each tube receives 0.5 mL of suspension."
    ));
    Ok((section, mg))
}

/// The section plus the recomputed concentration of every tube, in mM, keyed
/// by row offset so blank tubes leave a gap instead of shifting the rest.
fn ferricyanide_table(
    grid: &SheetGrid,
    config: &GradingConfig,
) -> Result<(GradedSection, BTreeMap<u32, f64>), ExtractError> {
    let records = extract_table(grid, &FERRICYANIDE)?;
    let mut table = Table::new(
        "Ferricyanide",
        ["Tube", "ABS 420 nm", "Student [FeCN] (mM)", "Correct [FeCN] (mM)", "Check"],
    );
    let mut concentrations = BTreeMap::new();
    for r in records.iter() {
        let absorbance = r.number("absorbance")?;
        let correct = ferricyanide(absorbance);
        let student = r.entered("concentration");
        table.push_row(vec![
            Cell::text(r.text("tube").unwrap_or_else(|| (r.offset + 1).to_string())),
            Cell::number(absorbance),
            Cell::entered(student),
            Cell::number(correct),
            check(student, correct, config),
        ]);
        concentrations.insert(r.offset, correct);
    }
    let section = GradedSection::new()
        .table(table)
        .note("[FeCN] (mM) = ABS420 × 4, from the standard curve.");
    Ok((section, concentrations))
}

fn kinetics(
    grid: &SheetGrid,
    config: &GradingConfig,
    chlorophyll_mg: f64,
    ferricyanide_mm: &BTreeMap<u32, f64>,
) -> Result<GradedSection, ExtractError> {
    if chlorophyll_mg == 0.0 {
        return Err(ExtractError::Dependency {
            what: "a non-zero chlorophyll mass".into(),
        });
    }
    let records = extract_table(grid, &KINETICS)?;
    let concentration_of = |offset: u32| {
        ferricyanide_mm
            .get(&offset)
            .copied()
            .ok_or_else(|| ExtractError::Dependency {
                what: format!("the ferricyanide concentration of tube {}", offset + 1),
            })
    };

    let mut table = Table::new(
        "Reduction time course",
        [
            "Tube",
            "Time (min)",
            "Student (µmol/mg Chl)",
            "Correct (µmol/mg Chl)",
            "Check",
        ],
    );
    let mut times = Vec::with_capacity(records.len());
    let mut reductions = Vec::with_capacity(records.len());
    for r in records.iter() {
        let tube = KINETIC_TUBES + r.offset;
        let time = r.number("time")?;
        let correct = hill_reduction(concentration_of(tube)?, chlorophyll_mg);
        let student = r.entered("reduction");
        table.push_row(vec![
            Cell::text(r.text("tube").unwrap_or_else(|| (tube + 1).to_string())),
            Cell::number(time),
            Cell::entered(student),
            Cell::number(correct),
            check(student, correct, config),
        ]);
        times.push(time);
        reductions.push(correct);
    }

    let mut section = GradedSection::new()
        .table(table)
        .note("Reduction = [FeCN] × 3.5 mL / mg Chl. The rate is the slope of the time course.");

    match fit_linear(&times, &reductions) {
        Ok(fit) => {
            let rates = hill_rates(fit.slope);
            let mut rate_table = Table::new("Rates", ["Rate", "Value", "Unit"]);
            rate_table.push_row(vec![
                Cell::text("Ferricyanide reduction"),
                Cell::number(rates.per_minute),
                Cell::text("µmol/(mg Chl·min)"),
            ]);
            rate_table.push_row(vec![
                Cell::text("Ferricyanide reduction"),
                Cell::number(rates.per_hour),
                Cell::text("µmol/(mg Chl·h)"),
            ]);
            rate_table.push_row(vec![
                Cell::text("O₂ release"),
                Cell::number(rates.oxygen_per_hour),
                Cell::text("µmol O₂/(mg Chl·h)"),
            ]);

            let points = times.iter().copied().zip(reductions.iter().copied()).collect();
            let chart = Chart::scatter("Hill reaction", "Time (min)", "µmol FeCN / mg Chl", points)
                .with_curve(
                    format!("y = {:.3}x + {:.2}", fit.slope, fit.intercept),
                    2,
                    |x| fit.predict(x),
                );

            section = section
                .table(rate_table)
                .chart(chart)
                .metric(Metric::new("Reduction rate", rates.per_minute, "µmol/(mg Chl·min)"))
                .metric(Metric::new("O₂ release", rates.oxygen_per_hour, "µmol O₂/(mg Chl·h)"))
                .metric(Metric::new("r²", round2(fit.r_value * fit.r_value), ""));
        }
        Err(e) => {
            tracing::warn!("hill kinetics: {e}");
            section = section.issue(e.to_string());
        }
    }

    if let (Some(&control), Some(&inhibited)) = (
        ferricyanide_mm.get(&KINETIC_TUBES),
        ferricyanide_mm.get(&DCMU_TUBE),
    ) {
        let activity = dcmu_activity(control, inhibited, chlorophyll_mg);
        section = section.metric(Metric::new(
            "Activity lost with DCMU",
            activity,
            "µmol FeCN/(mg Chl·h)",
        ));
    }
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;
    use crate::model::CellValue;
    use crate::report::SectionOutcome;

    const ABSORBANCES: [f64; 9] = [0.25, 0.2, 0.15, 0.24, 0.205, 0.17, 0.135, 0.225, 0.245];

    fn sheet() -> SheetGrid {
        let mut grid = SheetGrid::new(SHEET).with("D6", 0.38).with("D7", 0.5).with("D8", 0.25);
        for (i, abs) in ABSORBANCES.iter().enumerate() {
            grid = grid.with_row(
                &format!("B{}", 13 + i),
                [CellValue::from((i + 1) as f64), (*abs).into(), (abs * 4.0).into()],
            );
        }
        for (i, (time, student)) in [(0.0, 13.44), (5.0, 11.48), (10.0, 9.52), (15.0, 7.56)]
            .into_iter()
            .enumerate()
        {
            grid = grid.with_row(
                &format!("B{}", 24 + i),
                [CellValue::from((i + 4) as f64), time.into(), student.into()],
            );
        }
        grid
    }

    fn metric(section: &GradedSection, label: &str) -> f64 {
        section
            .metrics
            .iter()
            .find(|m| m.label == label)
            .map(|m| m.value)
            .unwrap_or_else(|| panic!("no metric '{label}'"))
    }

    #[test]
    fn kinetics_rates_and_dcmu() {
        let sections = HillReaction.grade(&sheet(), &GradingConfig::default());
        let SectionOutcome::Graded(kinetics) = &sections[2].outcome else {
            panic!("kinetics not graded: {:?}", sections[2].outcome);
        };
        assert!(kinetics.verdicts().all(|v| v.is_correct()));
        assert_eq!(metric(kinetics, "Reduction rate"), 0.39);
        assert_eq!(metric(kinetics, "O₂ release"), 5.85);
        assert_eq!(metric(kinetics, "Activity lost with DCMU"), 3.36);
        assert!(matches!(kinetics.charts[0].kind, ChartKind::Scatter(_)));
    }

    #[test]
    fn blank_ferricyanide_tube_does_not_shift_later_tubes() {
        let mut grid = sheet();
        for col in 1..=3 {
            grid.set(13, col, CellValue::Empty);
        }
        let sections = HillReaction.grade(&grid, &GradingConfig::default());
        assert_eq!(sections[1].graded_section().unwrap().tables[0].rows.len(), 8);
        let kinetics = sections[2].graded_section().unwrap();
        assert!(kinetics.verdicts().all(|v| v.is_correct()));
        assert_eq!(metric(kinetics, "Reduction rate"), 0.39);
        assert_eq!(metric(kinetics, "Activity lost with DCMU"), 3.36);
    }

    #[test]
    fn blank_kinetic_tube_is_reported_as_missing() {
        let mut grid = sheet();
        for col in 1..=3 {
            grid.set(16, col, CellValue::Empty);
        }
        let sections = HillReaction.grade(&grid, &GradingConfig::default());
        match &sections[2].outcome {
            SectionOutcome::Unreadable { reason } => assert!(reason.contains("tube 5"), "{reason}"),
            other => panic!("expected unreadable, got {other:?}"),
        }
    }

    #[test]
    fn dcmu_activity_is_in_ferricyanide_units() {
        let sections = HillReaction.grade(&sheet(), &GradingConfig::default());
        let kinetics = sections[2].graded_section().unwrap();
        let dcmu = kinetics
            .metrics
            .iter()
            .find(|m| m.label == "Activity lost with DCMU")
            .unwrap();
        assert_eq!(dcmu.unit, "µmol FeCN/(mg Chl·h)");
    }

    #[test]
    fn dcmu_is_omitted_without_the_eighth_tube() {
        let mut grid = sheet();
        grid.set(19, 1, CellValue::Empty);
        grid.set(19, 2, CellValue::Empty);
        grid.set(19, 3, CellValue::Empty);
        grid.set(20, 1, CellValue::Empty);
        grid.set(20, 2, CellValue::Empty);
        grid.set(20, 3, CellValue::Empty);
        let sections = HillReaction.grade(&grid, &GradingConfig::default());
        let kinetics = sections[2].graded_section().unwrap();
        assert!(kinetics.metrics.iter().all(|m| !m.label.contains("DCMU")));
    }

    #[test]
    fn broken_ferricyanide_makes_kinetics_unreadable() {
        let grid = sheet().with("C15", "n/a");
        let sections = HillReaction.grade(&grid, &GradingConfig::default());
        assert!(sections[0].is_graded());
        assert!(!sections[1].is_graded());
        match &sections[2].outcome {
            SectionOutcome::Unreadable { reason } => assert!(reason.contains("ferricyanide"), "{reason}"),
            other => panic!("expected unreadable, got {other:?}"),
        }
    }

    #[test]
    fn missing_chlorophyll_makes_kinetics_unreadable() {
        let mut grid = sheet();
        grid.set(5, 3, CellValue::Empty);
        let sections = HillReaction.grade(&grid, &GradingConfig::default());
        assert!(!sections[0].is_graded());
        assert!(sections[1].is_graded());
        assert!(!sections[2].is_graded());
    }
}
