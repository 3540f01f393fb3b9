//! Error types for grading.
//!
//! Only [`GradeError`] aborts a run. [`ExtractError`] is caught at the
//! section boundary and turned into an "unreadable" placeholder, and
//! [`FitError`] is attached to an otherwise graded section.

use thiserror::Error;

/// Errors that abort the whole grading pass.
#[derive(Debug, Error)]
pub enum GradeError {
    /// The workbook does not carry the sheet that marks a lab-report template.
    #[error("the file does not have the expected format: sheet '{marker}' not found (sheets: {})", .found.join(", "))]
    MissingMarkerSheet { marker: String, found: Vec<String> },

    /// The workbook itself could not be opened or listed.
    #[error("could not open workbook: {0}")]
    Workbook(String),
}

/// Errors raised while reading a declared range out of a sheet.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The exercise sheet is absent from the workbook.
    #[error("sheet '{0}' not found")]
    MissingSheet(String),

    /// The sheet exists but could not be decoded.
    #[error("sheet '{sheet}' could not be read: {message}")]
    UnreadableSheet { sheet: String, message: String },

    /// A required cell is empty.
    #[error("{sheet}!{cell}: missing value for '{field}'")]
    MissingValue {
        sheet: String,
        cell: String,
        field: String,
    },

    /// A required cell holds something that is not a number.
    #[error("{sheet}!{cell}: expected a number for '{field}', found '{found}'")]
    NotNumeric {
        sheet: String,
        cell: String,
        field: String,
        found: String,
    },

    /// A transposed table has no row with the requested label.
    #[error("{sheet}: no row labelled '{label}' in column {column}")]
    MissingLabel {
        sheet: String,
        label: String,
        column: String,
    },

    /// The range held no usable rows.
    #[error("{table}: no data rows found in {sheet}!{range}")]
    NoRows {
        table: String,
        sheet: String,
        range: String,
    },

    /// A section needs the output of an earlier section that failed.
    #[error("requires {what}, which could not be computed")]
    Dependency { what: String },

    /// A cell reference in a schema could not be parsed.
    #[error("invalid cell reference '{0}'")]
    InvalidReference(String),
}

/// Errors from the curve fits.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    /// Not enough points to determine the model.
    #[error("model fit failed: need at least {needed} points, got {got}")]
    TooFewPoints { needed: usize, got: usize },

    /// All x values are identical, so no line can be fitted.
    #[error("model fit failed: x values are constant")]
    ConstantInput,

    /// The nonlinear fit did not converge within its evaluation budget.
    #[error("model fit failed: no convergence after {evaluations} evaluations")]
    NoConvergence { evaluations: usize },

    /// The fit converged to parameters with no physical meaning.
    #[error("model fit failed: degenerate parameters ({0})")]
    Degenerate(String),
}
