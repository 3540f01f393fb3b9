//! The five practicals.
//!
//! Each practical declares its ranges as schema constants and implements
//! [`Exercise`], turning one sheet into an ordered list of sections.

mod amylase;
mod growth;
mod hill;
mod osmosis;
mod pigments;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GradingConfig;
use crate::error::ExtractError;
use crate::model::{Cell, Verdict};
use crate::report::{GradedSection, SectionReport};
use crate::schema::RangeSchema;
use crate::validate::check_tolerance;
use crate::workbook::SheetGrid;

pub use amylase::Germination;
pub use growth::GrowthRegulators;
pub use hill::HillReaction;
pub use osmosis::WaterPotential;
pub use pigments::Pigments;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseId {
    #[default]
    WaterPotential,
    GrowthRegulators,
    Pigments,
    HillReaction,
    Germination,
}

impl ExerciseId {
    pub const ALL: [ExerciseId; 5] = [
        ExerciseId::WaterPotential,
        ExerciseId::GrowthRegulators,
        ExerciseId::Pigments,
        ExerciseId::HillReaction,
        ExerciseId::Germination,
    ];

    pub fn number(self) -> u8 {
        match self {
            ExerciseId::WaterPotential => 1,
            ExerciseId::GrowthRegulators => 2,
            ExerciseId::Pigments => 3,
            ExerciseId::HillReaction => 4,
            ExerciseId::Germination => 5,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ExerciseId::WaterPotential => "Osmotic and water potential",
            ExerciseId::GrowthRegulators => "Auxin growth and salt stress",
            ExerciseId::Pigments => "Photosynthetic pigments",
            ExerciseId::HillReaction => "Hill reaction",
            ExerciseId::Germination => "Germination and α-amylase",
        }
    }

    /// Worksheet holding this practical.
    pub fn sheet(self) -> &'static str {
        match self {
            ExerciseId::WaterPotential => "Practica 1",
            ExerciseId::GrowthRegulators => "Practica 2",
            ExerciseId::Pigments => "Practica 3",
            ExerciseId::HillReaction => "Practica 4",
            ExerciseId::Germination => "Practica 5",
        }
    }

    /// Look up by number (`1`..=`5`) or by snake_case name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| s == id.number().to_string() || s.eq_ignore_ascii_case(&id.to_string()))
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExerciseId::WaterPotential => "water_potential",
            ExerciseId::GrowthRegulators => "growth_regulators",
            ExerciseId::Pigments => "pigments",
            ExerciseId::HillReaction => "hill_reaction",
            ExerciseId::Germination => "germination",
        };
        write!(f, "{name}")
    }
}

/// Key and title of one section of a practical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionInfo {
    pub key: &'static str,
    pub title: &'static str,
}

/// One practical of the course.
pub trait Exercise {
    fn id(&self) -> ExerciseId;

    /// Sections in report order.
    fn sections(&self) -> &'static [SectionInfo];

    /// Every range this practical reads.
    fn schemas(&self) -> Vec<RangeSchema>;

    /// Grade the practical's sheet. Never fails: sections that cannot be
    /// read come back as placeholders.
    fn grade(&self, grid: &SheetGrid, config: &GradingConfig) -> Vec<SectionReport>;

    /// Placeholders for every section, used when the sheet itself is unusable.
    fn unreadable(&self, reason: &str) -> Vec<SectionReport> {
        self.sections()
            .iter()
            .map(|s| SectionReport::unreadable(s.key, s.title, format!("could not read data: {reason}")))
            .collect()
    }
}

/// All practicals in course order.
pub fn all() -> Vec<Box<dyn Exercise>> {
    vec![
        Box::new(WaterPotential),
        Box::new(GrowthRegulators),
        Box::new(Pigments),
        Box::new(HillReaction),
        Box::new(Germination),
    ]
}

/// Every declared range, tagged with its practical.
pub fn all_schemas() -> Vec<(ExerciseId, RangeSchema)> {
    all()
        .iter()
        .flat_map(|e| {
            let id = e.id();
            e.schemas().into_iter().map(move |s| (id, s))
        })
        .collect()
}

/// Turn a section result into its report entry.
pub(crate) fn finish(info: &SectionInfo, result: Result<GradedSection, ExtractError>) -> SectionReport {
    match result {
        Ok(section) => SectionReport::graded(info.key, info.title, section),
        Err(e) => {
            tracing::warn!(section = info.key, "could not read data: {e}");
            SectionReport::unreadable(info.key, info.title, format!("could not read data: {e}"))
        }
    }
}

/// Tolerance verdict as a table cell.
pub(crate) fn check(student: Option<f64>, reference: f64, config: &GradingConfig) -> Cell {
    Cell::Verdict(check_tolerance(student, reference, config.tolerance))
}

pub(crate) fn verdict(v: Verdict) -> Cell {
    Cell::Verdict(v)
}

/// Record label or a positional fallback.
pub(crate) fn label_or(label: Option<&str>, index: usize) -> String {
    label
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_from_number_and_name() {
        assert_eq!(ExerciseId::parse("3"), Some(ExerciseId::Pigments));
        assert_eq!(ExerciseId::parse("hill_reaction"), Some(ExerciseId::HillReaction));
        assert_eq!(ExerciseId::parse("6"), None);
    }

    #[test]
    fn practicals_are_in_course_order() {
        let ids: Vec<ExerciseId> = all().iter().map(|e| e.id()).collect();
        assert_eq!(ids, ExerciseId::ALL);
        for e in all() {
            assert!(!e.sections().is_empty());
            assert!(!e.schemas().is_empty());
        }
    }

    #[test]
    fn every_schema_points_at_its_practical_sheet() {
        for (id, schema) in all_schemas() {
            assert_eq!(schema.sheet(), id.sheet(), "{}", schema.key());
        }
    }

    #[test]
    fn unreadable_covers_every_section() {
        let placeholders = HillReaction.unreadable("sheet 'Practica 4' not found");
        assert_eq!(placeholders.len(), HillReaction.sections().len());
        assert!(placeholders.iter().all(|s| !s.is_graded()));
    }
}
