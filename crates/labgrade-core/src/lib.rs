//! labgrade-core: extraction, validation, curve fitting and grading.
//!
//! This crate defines the workbook abstraction, the declarative range
//! schema, the per-exercise formulas and fits, and the grading engine that
//! turns one uploaded workbook into an immutable [`report::GradeReport`].

pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod exercises;
pub mod fit;
pub mod fixtures;
pub mod formulas;
pub mod model;
pub mod report;
pub mod schema;
pub mod validate;
pub mod workbook;

pub use config::GradingConfig;
pub use engine::{Grader, NoopReporter, ProgressReporter};
pub use error::{ExtractError, FitError, GradeError};
pub use report::GradeReport;
pub use workbook::{MemoryWorkbook, SheetGrid, Workbook};
