//! Spreadsheet files as [`labgrade_core::Workbook`]s, and `.xlsx` templates
//! written from in-memory workbooks.

pub mod excel;
pub mod export;

pub use excel::{convert_data, ExcelWorkbook};
pub use export::{write_xlsx, ExportError};
