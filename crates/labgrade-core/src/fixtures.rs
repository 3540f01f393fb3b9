//! A complete, correctly filled lab-report workbook.
//!
//! Used by `labgrade demo` and by tests that need a realistic template.

use crate::model::CellValue;
use crate::workbook::{MemoryWorkbook, SheetGrid};

fn n(value: f64) -> CellValue {
    CellValue::Number(value)
}

fn t(value: &str) -> CellValue {
    CellValue::from(value)
}

fn info_sheet() -> SheetGrid {
    SheetGrid::new("INFO PAREJA")
        .with("B2", "Pareja")
        .with("C2", "Ejemplo")
        .with("B3", "Grupo")
        .with("C3", "A1")
}

fn practica_1() -> SheetGrid {
    let mut grid = SheetGrid::new("Practica 1")
        .with("B4", "Potencial osmótico de disoluciones de sacarosa")
        .with_row("B6", ["Sacarosa (M)", "Ψπ (MPa)"]);
    let sucrose = [
        (0.05, -0.12),
        (0.1, -0.25),
        (0.2, -0.49),
        (0.3, -0.74),
        (0.4, -0.98),
        (0.5, -1.23),
        (0.6, -1.47),
        (0.7, -1.72),
    ];
    for (i, (c, psi)) in sucrose.into_iter().enumerate() {
        grid = grid.with_row(&format!("B{}", 7 + i), [c, psi]);
    }

    grid = grid.with_row("B17", ["Tubo", "Sacarosa (M)", "Ψπ (MPa)", "% plasmólisis"]);
    let onion = [
        (0.7, -1.72, 100.0),
        (0.6, -1.47, 95.0),
        (0.5, -1.23, 80.0),
        (0.4, -0.98, 45.0),
        (0.3, -0.74, 15.0),
        (0.2, -0.49, 5.0),
        (0.1, -0.25, 0.0),
    ];
    for (i, (c, psi, p)) in onion.into_iter().enumerate() {
        grid = grid.with_row(&format!("B{}", 18 + i), [n((i + 1) as f64), n(c), n(psi), n(p)]);
    }

    grid = grid.with_row(
        "B37",
        ["Tubo", "Sacarosa (M)", "Ψw (MPa)", "Peso inicial (g)", "Peso final (g)", "Variación (%)"],
    );
    let potato = [
        (0.7, -1.72, 1.70, -15.0),
        (0.6, -1.47, 1.76, -12.0),
        (0.5, -1.23, 1.84, -8.0),
        (0.4, -0.98, 1.94, -3.0),
        (0.3, -0.74, 2.04, 2.0),
        (0.2, -0.49, 2.10, 5.0),
        (0.1, -0.25, 2.16, 8.0),
    ];
    for (i, (c, psi, final_g, change)) in potato.into_iter().enumerate() {
        grid = grid.with_row(
            &format!("B{}", 38 + i),
            [n((i + 1) as f64), n(c), n(psi), n(2.0), n(final_g), n(change)],
        );
    }
    grid
}

fn practica_2() -> SheetGrid {
    SheetGrid::new("Practica 2")
        .with_row(
            "B8",
            ["Tratamiento", "Control", "AIA 10^-6 M", "AIA 10^-5 M", "AIA 10^-4 M"],
        )
        .with_row("B9", [t("Media longitud (mm)"), n(12.1), n(14.5), n(16.8), n(13.2)])
        .with_row("B10", [t("Variación (%)"), n(21.0), n(45.0), n(68.0), n(32.0)])
        .with_row("H8", ["Parámetro", "0 mM", "100 mM", "200 mM"])
        .with_row("H9", [t("Peso seco (g)"), n(2.10), n(2.05), n(2.12)])
        .with_row("H10", [t("Peso húmedo (g)"), n(4.30), n(3.60), n(3.05)])
        .with_row("H11", [t("% Variación peso"), n(104.76), n(75.61), n(43.87)])
        .with_row("H12", [t("% embriones TFT"), n(95.0), n(80.0), n(55.0)])
        .with_row("H13", [t("% cotiledones NBT+"), n(10.0), n(35.0), n(60.0)])
        .with_row("H14", [t("% cotiledones NBT++"), n(2.0), n(12.0), n(30.0)])
        .with("H15", "Observaciones")
}

fn practica_3() -> SheetGrid {
    let mut grid = SheetGrid::new("Practica 3")
        .with("F6", "ABS 665")
        .with("G6", 0.532)
        .with("F8", "mg/mL")
        .with("G8", 0.35)
        .with("F10", "mg/g")
        .with("G10", 0.70)
        .with_row(
            "B16",
            ["Banda", "Distancia pigmento (cm)", "Distancia disolvente (cm)", "Rf", "Pigmento"],
        );
    let bands = [
        (1.0, "β-caroteno"),
        (0.79, "Clorofila a"),
        (0.61, "Clorofila b"),
        (0.45, "Luteina"),
        (0.30, "Violaxantina"),
        (0.15, "Neoxantina"),
    ];
    for (i, (rf, pigment)) in bands.into_iter().enumerate() {
        grid = grid.with_row(
            &format!("B{}", 17 + i),
            [n((i + 1) as f64), n(rf * 8.0), n(8.0), n(rf), t(pigment)],
        );
    }
    grid.with("C27", "Máximos de absorción")
        .with("D27", "620 nm")
        .with("C28", "Pigmento")
        .with("D28", "Ficocianina")
}

fn practica_4() -> SheetGrid {
    let mut grid = SheetGrid::new("Practica 4")
        .with("C6", "ABS 665")
        .with("D6", 0.380)
        .with("C7", "mg/mL")
        .with("D7", 0.50)
        .with("C8", "mg")
        .with("D8", 0.25)
        .with_row("B12", ["Tubo", "ABS 420", "[FeCN] (mM)"]);
    let absorbances = [0.250, 0.200, 0.150, 0.240, 0.205, 0.170, 0.135, 0.225, 0.245];
    for (i, abs) in absorbances.into_iter().enumerate() {
        grid = grid.with_row(
            &format!("B{}", 13 + i),
            [n((i + 1) as f64), n(abs), n((abs * 400.0).round() / 100.0)],
        );
    }
    let kinetics = [(0.0, 13.44), (5.0, 11.48), (10.0, 9.52), (15.0, 7.56)];
    grid = grid.with_row("B23", ["Tubo", "Tiempo (min)", "µmol FeCN/mg Chl"]);
    for (i, (time, reduction)) in kinetics.into_iter().enumerate() {
        grid = grid.with_row(
            &format!("B{}", 24 + i),
            [n((i + 4) as f64), n(time), n(reduction)],
        );
    }
    grid
}

fn practica_5() -> SheetGrid {
    let mut grid = SheetGrid::new("Practica 5")
        .with("D4", "% germinación")
        .with("E4", 92.0)
        .with_row(
            "B10",
            [
                "Muestra",
                "Semilla",
                "Tratamiento",
                "Peso seco (mg)",
                "ABS t0",
                "ABS t10",
                "Almidón (mg/h)",
                "Actividad",
            ],
        );
    let samples = [
        ("Entera", "Agua", 250.0, 0.70, 1.84, 0.29),
        ("Sin embrión", "Agua", 240.0, 1.10, 0.37, 0.06),
        ("Sin embrión", "GA3", 245.0, 0.60, 2.21, 0.36),
        ("Sin embrión", "GA3 + Cicloheximida", 238.0, 1.05, 0.55, 0.09),
        ("Entera", "GA3", 252.0, 0.45, 2.76, 0.44),
    ];
    for (i, (seed, treatment, dry, abs10, starch, activity)) in samples.into_iter().enumerate() {
        grid = grid.with_row(
            &format!("B{}", 11 + i),
            [
                n((i + 1) as f64),
                t(seed),
                t(treatment),
                n(dry),
                n(1.2),
                n(abs10),
                n(starch),
                n(activity),
            ],
        );
    }
    grid
}

/// The sample workbook: marker sheet plus all five practicals, filled in
/// with correct answers.
pub fn sample_workbook() -> MemoryWorkbook {
    MemoryWorkbook::new()
        .with_sheet(info_sheet())
        .with_sheet(practica_1())
        .with_sheet(practica_2())
        .with_sheet(practica_3())
        .with_sheet(practica_4())
        .with_sheet(practica_5())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradingConfig;
    use crate::engine::{Grader, NoopReporter};
    use crate::workbook::Workbook;

    #[test]
    fn sample_has_marker_and_practicals() {
        let wb = sample_workbook();
        assert_eq!(wb.sheet_names().len(), 6);
        assert!(wb.has_sheet("INFO PAREJA"));
    }

    #[test]
    fn sample_grades_without_placeholders() {
        let mut wb = sample_workbook();
        let report = Grader::new(GradingConfig::default())
            .grade(&mut wb, "sample", &NoopReporter)
            .unwrap();
        let summary = report.summary();
        assert_eq!(summary.unreadable_sections, 0, "{:#?}", report.exercises);
        assert_eq!(summary.incorrect, 0, "{summary:#?}");
        assert!(summary.correct > 50);
        for exercise in &report.exercises {
            for section in &exercise.sections {
                let graded = section.graded_section().unwrap();
                assert!(graded.issues.is_empty(), "{}: {:?}", section.key, graded.issues);
            }
        }
    }
}
