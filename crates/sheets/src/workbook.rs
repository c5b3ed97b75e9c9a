//! Local `.xlsx` copy of the interaction log.
//!
//! Every append reads the whole workbook, adds the row to its sheet and
//! rewrites the file. Concurrent writers are not coordinated; the last
//! rewrite wins.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use hilight_core::{CellValue, LogSheet};
use rust_xlsxwriter::Workbook;

use crate::sink::{header_row, RowSink, SinkError, SinkOutcome};

/// One sheet of the local workbook; the first row is the header.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

#[derive(Clone, Debug)]
pub struct LocalWorkbook {
    path: PathBuf,
}

impl LocalWorkbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every sheet of the workbook, in file order. A missing file has no
    /// sheets.
    pub fn load(&self) -> Result<Vec<SheetTable>, SinkError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        read_workbook(&self.path)
    }

    /// Appends `row` to `sheet` and rewrites the file. An existing file that
    /// cannot be read is left untouched.
    pub fn append_blocking(&self, sheet: LogSheet, row: Vec<CellValue>) -> Result<(), SinkError> {
        let mut sheets = self.load()?;
        let title = sheet.title();

        match sheets.iter_mut().find(|table| table.name == title) {
            Some(table) => {
                if table.rows.is_empty() {
                    table.rows.push(header_row(sheet));
                }
                table.rows.push(row);
            }
            None => sheets.push(SheetTable {
                name: title.to_string(),
                rows: vec![header_row(sheet), row],
            }),
        }

        write_workbook(&self.path, &sheets)
    }
}

#[async_trait]
impl RowSink for LocalWorkbook {
    fn name(&self) -> &'static str {
        "local_workbook"
    }

    async fn append_row(
        &self,
        sheet: LogSheet,
        row: &[CellValue],
    ) -> Result<SinkOutcome, SinkError> {
        let workbook = self.clone();
        let row = row.to_vec();
        tokio::task::spawn_blocking(move || workbook.append_blocking(sheet, row)).await??;
        Ok(SinkOutcome::Appended)
    }
}

fn read_workbook(path: &Path) -> Result<Vec<SheetTable>, SinkError> {
    let read_error =
        |message: String| SinkError::WorkbookRead { path: path.to_path_buf(), message };

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|error: XlsxError| read_error(error.to_string()))?;
    let names: Vec<String> = workbook.sheet_names().iter().cloned().collect();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range =
            workbook.worksheet_range(&name).map_err(|error| read_error(error.to_string()))?;
        let rows: Vec<Vec<CellValue>> =
            range.rows().map(|cells| cells.iter().map(cell_value).collect()).collect();
        sheets.push(SheetTable { name, rows });
    }
    Ok(sheets)
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::String(value) => CellValue::Text(value.clone()),
        Data::Empty => CellValue::Text(String::new()),
        other => CellValue::Text(other.to_string()),
    }
}

fn write_workbook(path: &Path, sheets: &[SheetTable]) -> Result<(), SinkError> {
    let write_error =
        |message: String| SinkError::WorkbookWrite { path: path.to_path_buf(), message };

    let mut workbook = Workbook::new();
    for table in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.name).map_err(|error| write_error(error.to_string()))?;

        for (row_index, row) in table.rows.iter().enumerate() {
            let row_number =
                u32::try_from(row_index).map_err(|error| write_error(error.to_string()))?;
            for (col_index, cell) in row.iter().enumerate() {
                let col_number =
                    u16::try_from(col_index).map_err(|error| write_error(error.to_string()))?;
                match cell {
                    CellValue::Number(value) => {
                        worksheet
                            .write_number(row_number, col_number, *value)
                            .map_err(|error| write_error(error.to_string()))?;
                    }
                    // blank cells read back as empty text
                    CellValue::Text(value) if value.is_empty() => {}
                    CellValue::Text(value) => {
                        worksheet
                            .write_string(row_number, col_number, value)
                            .map_err(|error| write_error(error.to_string()))?;
                    }
                }
            }
        }
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| write_error(error.to_string()))?;
    }
    let staging = staging_path(path);
    workbook.save(&staging).map_err(|error| write_error(error.to_string()))?;
    fs::rename(&staging, path).map_err(|error| write_error(error.to_string()))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staging = OsString::from(path.as_os_str());
    staging.push(".partial");
    PathBuf::from(staging)
}
