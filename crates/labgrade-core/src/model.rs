//! Core data model types for labgrade.
//!
//! These are the values read out of a workbook and the presentation-ready
//! tables, verdicts and derived scalars that flow into the report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    #[default]
    Empty,
}

impl CellValue {
    /// Numeric view of the cell.
    ///
    /// Text is accepted when it parses as a number, including a decimal comma
    /// (`"0,25"`), which is what spreadsheets in Spanish locales produce when
    /// a value is typed as text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed
                    .replace(',', ".")
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
            }
            _ => None,
        }
    }

    /// Text view of the cell; numbers are rendered without trailing zeros.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Empty => Ok(()),
        }
    }
}

/// Render a number the way a spreadsheet shows it: integers without a
/// decimal point, everything else with up to four decimals.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let s = format!("{n:.4}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Outcome of checking one student entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct => write!(f, "Correct"),
            Verdict::Incorrect => write!(f, "Incorrect"),
        }
    }
}

/// One cell of a presentation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Cell {
    Number(f64),
    Text(String),
    Verdict(Verdict),
    Empty,
}

impl Cell {
    pub fn number(n: f64) -> Self {
        Cell::Number(n)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// A student entry: the number when present, otherwise an empty cell.
    pub fn entered(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Empty)
    }
}

impl From<&CellValue> for Cell {
    fn from(v: &CellValue) -> Self {
        match v {
            CellValue::Number(n) => Cell::Number(*n),
            CellValue::Text(s) => Cell::Text(s.clone()),
            CellValue::Bool(b) => Cell::Text(b.to_string()),
            CellValue::Empty => Cell::Empty,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Verdict(v) => write!(f, "{v}"),
            Cell::Empty => Ok(()),
        }
    }
}

/// A titled table ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(title: impl Into<String>, columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            title: title.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch in '{}'", self.title);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All verdict cells in the table, row by row.
    pub fn verdicts(&self) -> impl Iterator<Item = Verdict> + '_ {
        self.rows.iter().flatten().filter_map(|c| match c {
            Cell::Verdict(v) => Some(*v),
            _ => None,
        })
    }

    /// Index of a column by its header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// A named derived scalar, e.g. the water potential of a tissue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: f64,
    pub unit: String,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
            unit: unit.into(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{}: {}", self.label, format_number(self.value))
        } else {
            write!(f, "{}: {} {}", self.label, format_number(self.value), self.unit)
        }
    }
}
