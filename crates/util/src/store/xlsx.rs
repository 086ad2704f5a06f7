//! `.xlsx` workbooks: calamine for reading, rust_xlsxwriter for writing.
//!
//! Only the first worksheet is read. Every cell is written as text and blank
//! cells are not written at all. Neither crate keeps a row that has no cells,
//! so the number of data lines is recorded in a workbook-level defined name
//! and trailing blank lines are restored from it on load.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use casegrid_types::Sheet;
use chrono::NaiveTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use super::{StoreError, TabularStore};

/// Defined name holding the number of data lines below the header.
const ROW_COUNT_NAME: &str = "CasegridRowCount";

/// Excel workbook store.
#[derive(Debug, Clone)]
pub struct XlsxStore {
    sheet_name: String,
}

impl XlsxStore {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }
}

impl TabularStore for XlsxStore {
    fn load(&self, path: &Path) -> Result<Sheet, StoreError> {
        let read_error = |source| StoreError::XlsxRead {
            path: path.to_path_buf(),
            source,
        };
        let mut workbook: Xlsx<_> = open_workbook(path).map_err(read_error)?;
        let recorded_rows = recorded_row_count(workbook.defined_names());
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| StoreError::NoWorksheet { path: path.to_path_buf() })?
            .map_err(read_error)?;

        // calamine ranges start at the first used cell, not at A1
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut lines: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];
        for row in range.rows() {
            let mut line = vec![String::new(); start_col as usize];
            line.extend(row.iter().map(cell_text));
            lines.push(line);
        }

        let mut lines = lines.into_iter();
        let header = lines.next().unwrap_or_default();
        let mut rows: Vec<Vec<String>> = lines.collect();
        if let Some(count) = recorded_rows
            && rows.len() < count
        {
            rows.resize(count, vec![String::new(); header.len()]);
        }
        debug!(path = %path.display(), rows = rows.len(), "loaded xlsx workbook");
        Ok(Sheet { header, rows })
    }

    fn save(&self, path: &Path, sheet: &Sheet) -> Result<(), StoreError> {
        let write_error = |source| StoreError::XlsxWrite {
            path: path.to_path_buf(),
            source,
        };
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name).map_err(write_error)?;

        write_line(worksheet, 0, &sheet.header, Some(&header_format)).map_err(write_error)?;
        for (offset, row) in sheet.rows.iter().enumerate() {
            write_line(worksheet, offset as u32 + 1, row, None).map_err(write_error)?;
        }

        workbook
            .define_name(ROW_COUNT_NAME, &format!("={}", sheet.rows.len()))
            .map_err(write_error)?;
        workbook.save(path).map_err(write_error)?;
        debug!(path = %path.display(), rows = sheet.rows.len(), "saved xlsx workbook");
        Ok(())
    }
}

fn write_line(worksheet: &mut Worksheet, row: u32, cells: &[String], format: Option<&Format>) -> Result<(), XlsxError> {
    for (col, value) in cells.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        let col = col as u16;
        match format {
            Some(format) => worksheet.write_string_with_format(row, col, value, format)?,
            None => worksheet.write_string(row, col, value)?,
        };
    }
    Ok(())
}

fn recorded_row_count(names: &[(String, String)]) -> Option<usize> {
    names
        .iter()
        .find(|(name, _)| name == ROW_COUNT_NAME)
        .and_then(|(_, value)| value.trim().trim_start_matches('=').parse().ok())
}

/// Render a cell as the text a user sees in Excel.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => format!("{}", *value as i64),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) if datetime.time() == NaiveTime::MIN => datetime.format("%Y-%m-%d").to_string(),
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => value.as_f64().to_string(),
        },
        other => other.to_string(),
    }
}
