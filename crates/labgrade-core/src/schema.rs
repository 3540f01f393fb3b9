//! Declarative range schema and the generic extraction routine.
//!
//! Every exercise declares where its data lives as [`TableSchema`] or
//! [`ScalarSchema`] constants; [`extract_table`] and [`extract_scalars`] are
//! the only code that walks sheet cells.

use serde::Serialize;

use crate::error::ExtractError;
use crate::model::CellValue;
use crate::workbook::{a1, parse_a1, SheetGrid};

/// What a field must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// A measurement; missing or non-numeric is an extraction error.
    Number,
    /// A value typed by the student; missing is allowed and graded Incorrect.
    Entered,
    /// Free text such as a treatment name.
    Text,
}

/// Where a field lives relative to its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Locator {
    /// Position in declaration order (column for row tables, row for
    /// transposed tables).
    Next,
    /// Row whose label column matches this text (transposed tables only).
    Label(&'static str),
    /// A fixed cell (scalar schemas).
    Cell(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub locator: Locator,
}

impl FieldSpec {
    pub const fn number(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number,
            locator: Locator::Next,
        }
    }

    pub const fn entered(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Entered,
            locator: Locator::Next,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            locator: Locator::Next,
        }
    }

    pub const fn labelled(self, label: &'static str) -> Self {
        Self {
            locator: Locator::Label(label),
            ..self
        }
    }

    pub const fn at(self, cell: &'static str) -> Self {
        Self {
            locator: Locator::Cell(cell),
            ..self
        }
    }
}

/// How records are laid out in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One record per row, one field per column.
    Rows,
    /// Transposed: the first column holds field labels, each further column
    /// is one record whose label sits in the header row.
    Columns,
}

/// What to do with rows that are not fully populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Fully blank records are skipped; partially filled ones must be valid.
    SkipBlank,
    /// Records with any missing or non-numeric measurement are dropped.
    DropIncomplete,
}

/// A table-shaped range.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TableSchema {
    pub key: &'static str,
    pub sheet: &'static str,
    /// Top-left data cell (the label column for [`Layout::Columns`]).
    pub origin: &'static str,
    /// Data rows (row tables) or label rows spanned (transposed tables).
    pub rows: u32,
    /// Record columns to the right of the label column (transposed tables).
    pub records: u32,
    /// 1-based header row holding record labels (transposed tables).
    pub header_row: Option<u32>,
    pub layout: Layout,
    pub policy: RowPolicy,
    pub fields: &'static [FieldSpec],
}

impl TableSchema {
    /// The covered range in A1 notation, e.g. `B7:C14`.
    pub fn range(&self) -> String {
        let Ok((row, col)) = parse_a1(self.origin) else {
            return self.origin.to_string();
        };
        let width = match self.layout {
            Layout::Rows => self.fields.len() as u32,
            Layout::Columns => self.records + 1,
        };
        let top = match (self.layout, self.header_row) {
            (Layout::Columns, Some(h)) if h >= 1 => (h - 1).min(row),
            _ => row,
        };
        format!(
            "{}:{}",
            a1(top, col),
            a1(row + self.rows.max(1) - 1, col + width.max(1) - 1)
        )
    }
}

/// A set of single cells read as one record.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScalarSchema {
    pub key: &'static str,
    pub sheet: &'static str,
    pub fields: &'static [FieldSpec],
}

impl ScalarSchema {
    pub fn range(&self) -> String {
        self.fields
            .iter()
            .filter_map(|f| match f.locator {
                Locator::Cell(c) => Some(c),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Either kind of declared range, for listing and dry runs.
#[derive(Debug, Clone, Copy)]
pub enum RangeSchema {
    Table(&'static TableSchema),
    Scalars(&'static ScalarSchema),
}

impl RangeSchema {
    pub fn key(&self) -> &'static str {
        match self {
            RangeSchema::Table(t) => t.key,
            RangeSchema::Scalars(s) => s.key,
        }
    }

    pub fn sheet(&self) -> &'static str {
        match self {
            RangeSchema::Table(t) => t.sheet,
            RangeSchema::Scalars(s) => s.sheet,
        }
    }

    pub fn range(&self) -> String {
        match self {
            RangeSchema::Table(t) => t.range(),
            RangeSchema::Scalars(s) => s.range(),
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            RangeSchema::Table(t) => t.fields,
            RangeSchema::Scalars(s) => s.fields,
        }
    }

    /// Extract against `grid` and return how many records were read.
    pub fn dry_run(&self, grid: &SheetGrid) -> Result<usize, ExtractError> {
        match self {
            RangeSchema::Table(t) => extract_table(grid, t).map(|r| r.len()),
            RangeSchema::Scalars(s) => extract_scalars(grid, s).map(|_| 1),
        }
    }
}

/// One extracted field value with its source cell.
#[derive(Debug, Clone, PartialEq)]
struct FieldValue {
    name: &'static str,
    cell: String,
    value: CellValue,
}

/// One row (or transposed column) of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    sheet: String,
    /// Header label of a transposed record.
    pub label: Option<String>,
    /// Position inside the schema range: row offset for [`Layout::Rows`],
    /// record column offset for [`Layout::Columns`]. Blank records keep
    /// their slot, so later records do not shift.
    pub offset: u32,
    values: Vec<FieldValue>,
}

impl Record {
    fn find(&self, field: &str) -> Option<&FieldValue> {
        self.values.iter().find(|v| v.name == field)
    }

    /// Raw value of a field; unknown fields read as empty.
    pub fn value(&self, field: &str) -> CellValue {
        self.find(field).map(|v| v.value.clone()).unwrap_or_default()
    }

    /// A required measurement.
    pub fn number(&self, field: &str) -> Result<f64, ExtractError> {
        let fv = self.find(field).ok_or_else(|| ExtractError::MissingValue {
            sheet: self.sheet.clone(),
            cell: "?".into(),
            field: field.to_string(),
        })?;
        numeric(&self.sheet, fv)
    }

    /// A student entry; `None` when empty or not a number.
    pub fn entered(&self, field: &str) -> Option<f64> {
        self.find(field).and_then(|v| v.value.as_number())
    }

    /// Text of a field, if any.
    pub fn text(&self, field: &str) -> Option<String> {
        self.find(field).and_then(|v| v.value.as_text())
    }

    /// Source cell of a field in A1 notation.
    pub fn cell_of(&self, field: &str) -> Option<&str> {
        self.find(field).map(|v| v.cell.as_str())
    }

    fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.value.is_empty())
    }
}

fn numeric(sheet: &str, fv: &FieldValue) -> Result<f64, ExtractError> {
    if fv.value.is_empty() {
        return Err(ExtractError::MissingValue {
            sheet: sheet.to_string(),
            cell: fv.cell.clone(),
            field: fv.name.to_string(),
        });
    }
    fv.value.as_number().ok_or_else(|| ExtractError::NotNumeric {
        sheet: sheet.to_string(),
        cell: fv.cell.clone(),
        field: fv.name.to_string(),
        found: fv.value.to_string(),
    })
}

/// The records read through one [`TableSchema`].
#[derive(Debug, Clone)]
pub struct Records {
    pub key: &'static str,
    pub rows: Vec<Record>,
}

impl Records {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.rows.iter()
    }
}

fn normalize_label(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Check a record against its field kinds.
fn check_record(record: &Record, fields: &[FieldSpec]) -> Result<(), ExtractError> {
    for spec in fields.iter().filter(|f| f.kind == FieldKind::Number) {
        if let Some(fv) = record.find(spec.name) {
            numeric(&record.sheet, fv)?;
        }
    }
    Ok(())
}

/// Read a table through its schema.
pub fn extract_table(grid: &SheetGrid, schema: &TableSchema) -> Result<Records, ExtractError> {
    let (row0, col0) = parse_a1(schema.origin)?;
    let sheet = grid.name().to_string();

    let candidates: Vec<Record> = match schema.layout {
        Layout::Rows => (0..schema.rows)
            .map(|r| {
                let row = row0 + r;
                let values = schema
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(i, spec)| {
                        let col = col0 + i as u32;
                        FieldValue {
                            name: spec.name,
                            cell: a1(row, col),
                            value: grid.get(row, col).clone(),
                        }
                    })
                    .collect();
                Record {
                    sheet: sheet.clone(),
                    label: None,
                    offset: r,
                    values,
                }
            })
            .collect(),
        Layout::Columns => {
            // Resolve each field to a sheet row once, shared by every record.
            let mut field_rows = Vec::with_capacity(schema.fields.len());
            for (i, spec) in schema.fields.iter().enumerate() {
                let row = match spec.locator {
                    Locator::Label(label) => {
                        let wanted = normalize_label(label);
                        (row0..row0 + schema.rows)
                            .find(|&r| {
                                grid.get(r, col0)
                                    .as_text()
                                    .is_some_and(|t| normalize_label(&t) == wanted)
                            })
                            .ok_or_else(|| ExtractError::MissingLabel {
                                sheet: sheet.clone(),
                                label: label.to_string(),
                                column: crate::workbook::column_name(col0),
                            })?
                    }
                    Locator::Next | Locator::Cell(_) => row0 + i as u32,
                };
                field_rows.push(row);
            }

            (1..=schema.records)
                .map(|c| {
                    let col = col0 + c;
                    let label = schema
                        .header_row
                        .filter(|h| *h >= 1)
                        .and_then(|h| grid.get(h - 1, col).as_text());
                    let values = schema
                        .fields
                        .iter()
                        .zip(&field_rows)
                        .map(|(spec, &row)| FieldValue {
                            name: spec.name,
                            cell: a1(row, col),
                            value: grid.get(row, col).clone(),
                        })
                        .collect();
                    Record {
                        sheet: sheet.clone(),
                        label,
                        offset: c - 1,
                        values,
                    }
                })
                .collect()
        }
    };

    let mut rows = Vec::new();
    for record in candidates {
        if record.is_blank() {
            continue;
        }
        match (schema.policy, check_record(&record, schema.fields)) {
            (_, Ok(())) => rows.push(record),
            (RowPolicy::DropIncomplete, Err(e)) => {
                tracing::debug!("{}: dropping incomplete record: {e}", schema.key);
            }
            (RowPolicy::SkipBlank, Err(e)) => return Err(e),
        }
    }

    if rows.is_empty() {
        return Err(ExtractError::NoRows {
            table: schema.key.to_string(),
            sheet: schema.sheet.to_string(),
            range: schema.range(),
        });
    }

    Ok(Records {
        key: schema.key,
        rows,
    })
}

/// Read a set of single cells through its schema.
pub fn extract_scalars(grid: &SheetGrid, schema: &ScalarSchema) -> Result<Record, ExtractError> {
    let mut values = Vec::with_capacity(schema.fields.len());
    for spec in schema.fields {
        let Locator::Cell(reference) = spec.locator else {
            return Err(ExtractError::InvalidReference(format!(
                "{}.{} has no cell",
                schema.key, spec.name
            )));
        };
        let (row, col) = parse_a1(reference)?;
        values.push(FieldValue {
            name: spec.name,
            cell: a1(row, col),
            value: grid.get(row, col).clone(),
        });
    }
    let record = Record {
        sheet: grid.name().to_string(),
        label: None,
        offset: 0,
        values,
    };
    check_record(&record, schema.fields)?;
    Ok(record)
}
