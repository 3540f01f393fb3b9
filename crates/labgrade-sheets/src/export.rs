//! Minimal `.xlsx` writer for in-memory workbooks.
//!
//! Writes one worksheet per sheet with inline strings and no styles: enough
//! for a blank template a student can fill in, and for any reader (including
//! [`ExcelWorkbook`](crate::ExcelWorkbook)) to load back.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use labgrade_core::model::CellValue;
use labgrade_core::workbook::{a1, MemoryWorkbook, SheetGrid};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write workbook: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not write workbook: {0}")]
    Zip(#[from] zip::result::ZipError),
}

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Write `workbook` to `path` as an Office Open XML spreadsheet.
pub fn write_xlsx(workbook: &MemoryWorkbook, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let sheets: Vec<&SheetGrid> = workbook.sheets().collect();

    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types(sheets.len()).as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(root_rels().as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook_xml(&sheets).as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_rels(sheets.len()).as_bytes())?;

    for (i, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip.write_all(worksheet_xml(sheet).as_bytes())?;
    }

    zip.finish()?;
    tracing::debug!("wrote {} sheet(s) to {}", sheets.len(), path.display());
    Ok(())
}

fn content_types(sheets: usize) -> String {
    let mut xml = String::from(XML_HEADER);
    xml.push_str("<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">");
    xml.push_str("<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>");
    xml.push_str("<Default Extension=\"xml\" ContentType=\"application/xml\"/>");
    xml.push_str("<Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>");
    for i in 1..=sheets {
        xml.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{i}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>"
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        "{XML_HEADER}<Relationships xmlns=\"{PACKAGE_REL_NS}\">\
         <Relationship Id=\"rId1\" Type=\"{REL_NS}/officeDocument\" Target=\"xl/workbook.xml\"/>\
         </Relationships>"
    )
}

fn workbook_xml(sheets: &[&SheetGrid]) -> String {
    let mut xml = format!("{XML_HEADER}<workbook xmlns=\"{MAIN_NS}\" xmlns:r=\"{REL_NS}\"><sheets>");
    for (i, sheet) in sheets.iter().enumerate() {
        xml.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
            xml_escape(sheet.name()),
            i + 1,
            i + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels(sheets: usize) -> String {
    let mut xml = format!("{XML_HEADER}<Relationships xmlns=\"{PACKAGE_REL_NS}\">");
    for i in 1..=sheets {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{i}\" Type=\"{REL_NS}/worksheet\" Target=\"worksheets/sheet{i}.xml\"/>"
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn worksheet_xml(sheet: &SheetGrid) -> String {
    let mut xml = format!("{XML_HEADER}<worksheet xmlns=\"{MAIN_NS}\"><sheetData>");
    let mut open_row = None;
    for ((row, col), value) in sheet.cells() {
        let Some(cell) = cell_xml(&a1(row, col), value) else {
            continue;
        };
        if open_row != Some(row) {
            if open_row.is_some() {
                xml.push_str("</row>");
            }
            xml.push_str(&format!("<row r=\"{}\">", row + 1));
            open_row = Some(row);
        }
        xml.push_str(&cell);
    }
    if open_row.is_some() {
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn cell_xml(reference: &str, value: &CellValue) -> Option<String> {
    match value {
        CellValue::Number(n) if n.is_finite() => Some(format!("<c r=\"{reference}\"><v>{n}</v></c>")),
        CellValue::Number(_) | CellValue::Empty => None,
        CellValue::Text(s) => Some(format!(
            "<c r=\"{reference}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
            xml_escape(s)
        )),
        CellValue::Bool(b) => Some(format!("<c r=\"{reference}\" t=\"b\"><v>{}</v></c>", u8::from(*b))),
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
