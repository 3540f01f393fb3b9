//! calamine-backed workbook reader for `.xlsx`, `.xlsm`, `.xls` and `.ods`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};

use labgrade_core::error::{ExtractError, GradeError};
use labgrade_core::model::CellValue;
use labgrade_core::workbook::{SheetGrid, Workbook};

/// A workbook opened from disk. Sheets are decoded lazily, one per request.
pub struct ExcelWorkbook {
    path: PathBuf,
    inner: Sheets<BufReader<File>>,
}

impl ExcelWorkbook {
    /// Open a workbook, picking the format from the file extension.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GradeError> {
        let path = path.as_ref();
        let inner = open_workbook_auto(path)
            .map_err(|e| GradeError::Workbook(format!("{}: {e}", path.display())))?;
        tracing::debug!("opened workbook {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Workbook for ExcelWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    fn sheet(&mut self, name: &str) -> Result<SheetGrid, ExtractError> {
        if !self.has_sheet(name) {
            return Err(ExtractError::MissingSheet(name.to_string()));
        }
        let range = self
            .inner
            .worksheet_range(name)
            .map_err(|e| ExtractError::UnreadableSheet {
                sheet: name.to_string(),
                message: e.to_string(),
            })?;

        // Range coordinates are relative to the first used cell.
        let (row0, col0) = range.start().unwrap_or((0, 0));
        let mut grid = SheetGrid::new(name);
        for (row, col, data) in range.cells() {
            grid.set(row0 + row as u32, col0 + col as u32, convert_data(data));
        }
        tracing::debug!("{}: read {} cell(s) from '{name}'", self.path.display(), grid.len());
        Ok(grid)
    }
}

/// Map a calamine cell onto the grader's cell model.
///
/// Dates keep their serial number so that numeric fields still read them;
/// error cells (`#DIV/0!` and friends) count as empty.
pub fn convert_data(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}
