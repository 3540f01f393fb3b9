//! Workbook abstraction.
//!
//! The grading engine only sees [`Workbook`] and [`SheetGrid`]; the
//! `labgrade-sheets` crate implements the trait on top of real spreadsheet
//! files, and [`MemoryWorkbook`] serves tests and the built-in sample.

use std::collections::{BTreeMap, HashMap};

use crate::error::ExtractError;
use crate::model::CellValue;

/// A source of worksheets.
pub trait Workbook {
    /// Names of all sheets, in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Load one sheet by name.
    fn sheet(&mut self, name: &str) -> Result<SheetGrid, ExtractError>;

    /// Whether a sheet with this exact name exists.
    fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names().iter().any(|s| s == name)
    }
}

/// The cells of one worksheet, addressed by absolute 0-based `(row, col)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    name: String,
    cells: BTreeMap<(u32, u32), CellValue>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value at `(row, col)`; unset cells read as [`CellValue::Empty`].
    pub fn get(&self, row: u32, col: u32) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&(row, col)).unwrap_or(&EMPTY)
    }

    /// Store a value; empty values are not stored.
    pub fn set(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        let value = value.into();
        if value.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
    }

    /// The value at an A1 reference such as `"G6"`.
    pub fn get_a1(&self, reference: &str) -> Result<&CellValue, ExtractError> {
        let (row, col) = parse_a1(reference)?;
        Ok(self.get(row, col))
    }

    /// Builder-style setter using an A1 reference.
    pub fn with(mut self, reference: &str, value: impl Into<CellValue>) -> Self {
        match parse_a1(reference) {
            Ok((row, col)) => self.set(row, col, value),
            Err(e) => tracing::warn!("ignoring cell for sheet '{}': {e}", self.name),
        }
        self
    }

    /// Builder-style setter for a horizontal run of cells starting at `reference`.
    pub fn with_row<V: Into<CellValue>>(
        mut self,
        reference: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        match parse_a1(reference) {
            Ok((row, col)) => {
                for (offset, value) in values.into_iter().enumerate() {
                    self.set(row, col + offset as u32, value);
                }
            }
            Err(e) => tracing::warn!("ignoring row for sheet '{}': {e}", self.name),
        }
        self
    }

    /// Non-empty cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &CellValue)> + '_ {
        self.cells.iter().map(|(&pos, value)| (pos, value))
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// An in-memory workbook.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    order: Vec<String>,
    sheets: HashMap<String, SheetGrid>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a sheet.
    pub fn with_sheet(mut self, sheet: SheetGrid) -> Self {
        self.insert(sheet);
        self
    }

    pub fn insert(&mut self, sheet: SheetGrid) {
        let name = sheet.name().to_string();
        if !self.sheets.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.sheets.insert(name, sheet);
    }

    /// Sheets in workbook order.
    pub fn sheets(&self) -> impl Iterator<Item = &SheetGrid> + '_ {
        self.order.iter().filter_map(|name| self.sheets.get(name))
    }

    /// Remove a sheet, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<SheetGrid> {
        self.order.retain(|n| n != name);
        self.sheets.remove(name)
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn sheet(&mut self, name: &str) -> Result<SheetGrid, ExtractError> {
        self.sheets
            .get(name)
            .cloned()
            .ok_or_else(|| ExtractError::MissingSheet(name.to_string()))
    }
}

/// Convert a column name (`"A"`, `"AB"`) to a 0-based index.
pub fn column_index(letters: &str) -> Result<u32, ExtractError> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ExtractError::InvalidReference(letters.to_string()));
    }
    let mut index: u32 = 0;
    for c in letters.chars() {
        index = index * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    Ok(index - 1)
}

/// Convert a 0-based column index to its name.
pub fn column_name(mut index: u32) -> String {
    let mut name = Vec::new();
    loop {
        name.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.iter().rev().collect()
}

/// Parse an A1 reference into 0-based `(row, col)`.
pub fn parse_a1(reference: &str) -> Result<(u32, u32), ExtractError> {
    let reference = reference.trim();
    let split = reference
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| ExtractError::InvalidReference(reference.to_string()))?;
    let (letters, digits) = reference.split_at(split);
    let col = column_index(letters)?;
    let row: u32 = digits
        .parse()
        .map_err(|_| ExtractError::InvalidReference(reference.to_string()))?;
    if row == 0 {
        return Err(ExtractError::InvalidReference(reference.to_string()));
    }
    Ok((row - 1, col))
}

/// Format 0-based `(row, col)` as an A1 reference.
pub fn a1(row: u32, col: u32) -> String {
    format!("{}{}", column_name(col), row + 1)
}
