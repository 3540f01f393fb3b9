//! Practical 1: osmotic potential of sucrose, onion plasmolysis, potato
//! water potential.

use crate::chart::{Axis, Chart};
use crate::config::GradingConfig;
use crate::error::ExtractError;
use crate::fit::{fit_linear, fit_sigmoid};
use crate::formulas::{osmotic_potential, percent_change, round2};
use crate::model::{Cell, Metric, Table};
use crate::report::{GradedSection, SectionReport};
use crate::schema::{extract_table, FieldSpec, Layout, RangeSchema, RowPolicy, TableSchema};
use crate::validate::check_non_increasing;
use crate::workbook::SheetGrid;

use super::{check, finish, verdict, Exercise, ExerciseId, SectionInfo};

const SHEET: &str = "Practica 1";

pub const SUCROSE: TableSchema = TableSchema {
    key: "sucrose",
    sheet: SHEET,
    origin: "B7",
    rows: 8,
    records: 0,
    header_row: Some(6),
    layout: Layout::Rows,
    policy: RowPolicy::SkipBlank,
    fields: &[FieldSpec::number("concentration"), FieldSpec::entered("potential")],
};

pub const ONION: TableSchema = TableSchema {
    key: "onion",
    sheet: SHEET,
    origin: "B18",
    rows: 7,
    records: 0,
    header_row: None,
    layout: Layout::Rows,
    policy: RowPolicy::DropIncomplete,
    fields: &[
        FieldSpec::text("tube"),
        FieldSpec::number("concentration"),
        FieldSpec::number("osmotic_potential"),
        FieldSpec::number("plasmolysis"),
    ],
};

pub const POTATO: TableSchema = TableSchema {
    key: "potato",
    sheet: SHEET,
    origin: "B38",
    rows: 7,
    records: 0,
    header_row: None,
    layout: Layout::Rows,
    policy: RowPolicy::SkipBlank,
    fields: &[
        FieldSpec::text("tube"),
        FieldSpec::number("concentration"),
        FieldSpec::number("water_potential"),
        FieldSpec::number("initial"),
        FieldSpec::number("final"),
        FieldSpec::entered("change"),
    ],
};

const SECTIONS: &[SectionInfo] = &[
    SectionInfo {
        key: "sucrose",
        title: "Osmotic potential of sucrose solutions",
    },
    SectionInfo {
        key: "onion",
        title: "Onion epidermis plasmolysis",
    },
    SectionInfo {
        key: "potato",
        title: "Water potential of potato tissue",
    },
];

pub struct WaterPotential;

impl Exercise for WaterPotential {
    fn id(&self) -> ExerciseId {
        ExerciseId::WaterPotential
    }

    fn sections(&self) -> &'static [SectionInfo] {
        SECTIONS
    }

    fn schemas(&self) -> Vec<RangeSchema> {
        vec![
            RangeSchema::Table(&SUCROSE),
            RangeSchema::Table(&ONION),
            RangeSchema::Table(&POTATO),
        ]
    }

    fn grade(&self, grid: &SheetGrid, config: &GradingConfig) -> Vec<SectionReport> {
        vec![
            finish(&SECTIONS[0], sucrose(grid, config)),
            finish(&SECTIONS[1], onion(grid, config)),
            finish(&SECTIONS[2], potato(grid, config)),
        ]
    }
}

fn sucrose(grid: &SheetGrid, config: &GradingConfig) -> Result<GradedSection, ExtractError> {
    let records = extract_table(grid, &SUCROSE)?;
    let mut table = Table::new(
        "Osmotic potential",
        ["Sucrose (M)", "Student Ψπ (MPa)", "Correct Ψπ (MPa)", "Check"],
    );
    for r in records.iter() {
        let c = r.number("concentration")?;
        let correct = osmotic_potential(c, config.gas_constant, config.temperature_k);
        let student = r.entered("potential");
        table.push_row(vec![
            Cell::number(c),
            Cell::entered(student),
            Cell::number(correct),
            check(student, correct, config),
        ]);
    }
    Ok(GradedSection::new().table(table).note(format!(
        "Ψπ = −C·R·T with R = {} MPa·L/(mol·K) and T = {} K.",
        config.gas_constant, config.temperature_k
    )))
}

fn onion(grid: &SheetGrid, config: &GradingConfig) -> Result<GradedSection, ExtractError> {
    let records = extract_table(grid, &ONION)?;
    let mut potentials = Vec::with_capacity(records.len());
    let mut plasmolysis = Vec::with_capacity(records.len());
    for r in records.iter() {
        potentials.push(r.number("osmotic_potential")?);
        plasmolysis.push(r.number("plasmolysis")?);
    }

    let order = check_non_increasing(&plasmolysis);
    let mut table = Table::new(
        "Plasmolysis",
        ["Tube", "Sucrose (M)", "Ψπ (MPa)", "Plasmolysis (%)", "Order"],
    );
    for (i, r) in records.iter().enumerate() {
        table.push_row(vec![
            Cell::text(r.text("tube").unwrap_or_default()),
            Cell::number(r.number("concentration")?),
            Cell::number(potentials[i]),
            Cell::number(plasmolysis[i]),
            verdict(order[i]),
        ]);
    }

    let mut section = GradedSection::new()
        .table(table)
        .note("Plasmolysis must not increase as the solution becomes more dilute.");

    let threshold = config.plasmolysis_threshold;
    match fit_sigmoid(&potentials, &plasmolysis, config.sigmoid_max_evaluations) {
        Ok(fit) => {
            let potential = round2(fit.threshold_potential(threshold));
            let reached = 100.0 - threshold;
            let points = potentials.iter().copied().zip(plasmolysis.iter().copied()).collect();
            let chart = Chart::scatter("Plasmolysis curve", "Ψπ (MPa)", "Plasmolysis (%)", points)
                .with_curve("Logistic fit", 100, |x| fit.predict(x))
                .with_marker(format!("{reached} %"), Axis::Y, reached)
                .with_marker(format!("Ψπ = {potential} MPa"), Axis::X, potential);
            section = section
                .chart(chart)
                .metric(Metric::new(
                    format!("Tissue osmotic potential at {reached} % plasmolysis"),
                    potential,
                    "MPa",
                ))
                .note(format!(
                    "Fitted y = 100 / (1 + exp(−(x − {:.3})·{:.3})) after {} evaluations.",
                    fit.xmid, fit.scale, fit.evaluations
                ));
        }
        Err(e) => {
            tracing::warn!("onion plasmolysis: {e}");
            section = section.issue(e.to_string());
        }
    }
    Ok(section)
}

fn potato(grid: &SheetGrid, config: &GradingConfig) -> Result<GradedSection, ExtractError> {
    let records = extract_table(grid, &POTATO)?;
    let mut table = Table::new(
        "Weight change",
        [
            "Tube",
            "Sucrose (M)",
            "Ψw (MPa)",
            "Initial (g)",
            "Final (g)",
            "Student change (%)",
            "Correct change (%)",
            "Check",
        ],
    );
    // The regression uses what the student reported.
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for r in records.iter() {
        let psi = r.number("water_potential")?;
        let initial = r.number("initial")?;
        let final_weight = r.number("final")?;
        let correct = percent_change(initial, final_weight);
        let student = r.entered("change");
        if let Some(s) = student {
            xs.push(psi);
            ys.push(s);
        }
        table.push_row(vec![
            Cell::text(r.text("tube").unwrap_or_default()),
            Cell::number(r.number("concentration")?),
            Cell::number(psi),
            Cell::number(initial),
            Cell::number(final_weight),
            Cell::entered(student),
            Cell::number(correct),
            check(student, correct, config),
        ]);
    }

    let mut section = GradedSection::new()
        .table(table)
        .note("Weight change (%) = (final − initial) / initial × 100.");

    match fit_linear(&xs, &ys) {
        Ok(fit) => {
            let points = xs.iter().copied().zip(ys.iter().copied()).collect();
            let mut chart = Chart::scatter("Weight change vs Ψw", "Ψw (MPa)", "Weight change (%)", points)
                .with_curve(
                    format!("y = {:.2}x + {:.2}", fit.slope, fit.intercept),
                    2,
                    |x| fit.predict(x),
                )
                .with_marker("No change", Axis::Y, 0.0);
            section = section.metric(Metric::new("r²", round2(fit.r_value * fit.r_value), ""));
            match fit.x_intercept() {
                Some(x0) => {
                    let potential = round2(x0);
                    chart = chart.with_marker(format!("Ψw = {potential} MPa"), Axis::X, potential);
                    section = section.metric(Metric::new("Tissue water potential", potential, "MPa"));
                }
                None => {
                    section = section.issue("water potential undefined: the regression slope is zero");
                }
            }
            section = section.chart(chart);
        }
        Err(e) => {
            tracing::warn!("potato regression: {e}");
            section = section.issue(e.to_string());
        }
    }
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Verdict};
    use crate::report::SectionOutcome;

    fn graded(report: &SectionReport) -> &GradedSection {
        match &report.outcome {
            SectionOutcome::Graded(g) => g,
            SectionOutcome::Unreadable { reason } => panic!("unreadable: {reason}"),
        }
    }

    fn sheet() -> SheetGrid {
        let concentrations = [0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1];
        let plasmolysis = [100.0, 95.0, 80.0, 45.0, 15.0, 5.0, 0.0];
        let mut grid = SheetGrid::new(SHEET)
            .with_row("B7", [0.1, -0.25])
            .with_row("B8", [0.2, -0.6]);
        for (i, (c, p)) in concentrations.iter().zip(plasmolysis).enumerate() {
            let psi = osmotic_potential(*c, 0.008314, 295.0);
            grid = grid.with_row(
                &format!("B{}", 18 + i),
                [CellValue::from((i + 1) as f64), (*c).into(), psi.into(), p.into()],
            );
        }
        grid
    }

    #[test]
    fn sucrose_rows_are_checked_against_the_formula() {
        let section = sucrose(&sheet(), &GradingConfig::default()).unwrap();
        let verdicts: Vec<Verdict> = section.verdicts().collect();
        assert_eq!(verdicts, vec![Verdict::Correct, Verdict::Incorrect]);
    }

    #[test]
    fn onion_fit_gives_a_potential_between_the_bracketing_tubes() {
        let section = onion(&sheet(), &GradingConfig::default()).unwrap();
        assert!(section.issues.is_empty(), "{:?}", section.issues);
        let potential = section.metrics[0].value;
        assert!(potential > -1.23 && potential < -0.74, "potential {potential}");
        assert_eq!(section.charts.len(), 1);
        assert!(section.verdicts().all(|v| v.is_correct()));
    }

    #[test]
    fn onion_metric_names_the_percentage_it_reads() {
        let config = GradingConfig {
            plasmolysis_threshold: 20.0,
            ..GradingConfig::default()
        };
        let section = onion(&sheet(), &config).unwrap();
        let metric = &section.metrics[0];
        assert_eq!(metric.label, "Tissue osmotic potential at 80 % plasmolysis");
        let default = onion(&sheet(), &GradingConfig::default()).unwrap();
        // Plasmolysis rises with the potential, so 80 % lies above the midpoint.
        assert!(metric.value > default.metrics[0].value);
    }

    #[test]
    fn onion_without_a_transition_reports_the_failed_fit() {
        let mut grid = sheet();
        for row in 17..24 {
            grid.set(row, 4, 0.0);
        }
        let section = onion(&grid, &GradingConfig::default()).unwrap();
        assert!(section.metrics.is_empty());
        assert!(section.charts.is_empty());
        assert!(section.issues[0].starts_with("model fit failed"), "{:?}", section.issues);
    }

    #[test]
    fn onion_with_too_few_rows_keeps_the_table() {
        let grid = SheetGrid::new(SHEET)
            .with_row("B18", [1.0, 0.7, -1.72, 100.0])
            .with_row("B19", [2.0, 0.6, -1.47, 90.0]);
        let section = onion(&grid, &GradingConfig::default()).unwrap();
        assert_eq!(section.tables[0].len(), 2);
        assert!(section.charts.is_empty());
        assert!(section.issues[0].starts_with("model fit failed"));
    }

    #[test]
    fn potato_without_rows_is_unreadable() {
        let report = WaterPotential.grade(&sheet(), &GradingConfig::default());
        assert!(report[0].is_graded());
        graded(&report[1]);
        assert!(!report[2].is_graded());
    }
}
