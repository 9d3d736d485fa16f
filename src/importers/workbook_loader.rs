use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::cleaning::count_decoder::parse_timestamp_text;
use crate::models::{RawCell, RawSheet};

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("Can't find data file: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}

/// Reads sheets of the field-survey workbook into raw cell grids
#[derive(Debug, Clone)]
pub struct WorkbookLoader {
    workbook_path: PathBuf,
}

impl WorkbookLoader {
    /// Create a loader for an existing workbook
    ///
    /// A missing file is reported straight away rather than on first read.
    pub fn open(workbook_path: impl Into<PathBuf>) -> Result<Self, WorkbookError> {
        let workbook_path = workbook_path.into();
        if !workbook_path.is_file() {
            return Err(WorkbookError::FileNotFound(workbook_path));
        }
        Ok(Self { workbook_path })
    }

    pub fn path(&self) -> &Path {
        &self.workbook_path
    }

    pub fn sheet_names(&self) -> Result<Vec<String>, WorkbookError> {
        let workbook = open_workbook_auto(&self.workbook_path)
            .map_err(|e| WorkbookError::WorkbookOpen(e.to_string()))?;
        Ok(workbook.sheet_names())
    }

    /// Read one sheet. The workbook is opened for this read only and closed
    /// before returning.
    pub fn load_sheet(&self, sheet_name: &str) -> Result<RawSheet, WorkbookError> {
        info!("Reading sheet: {}", sheet_name);

        let mut workbook = open_workbook_auto(&self.workbook_path)
            .map_err(|e| WorkbookError::WorkbookOpen(e.to_string()))?;

        let range = match workbook.worksheet_range(sheet_name) {
            Ok(range) => range,
            Err(_) => return Err(WorkbookError::SheetNotFound(sheet_name.to_string())),
        };

        let sheet = range_to_sheet(sheet_name, &range);
        debug!(
            "Sheet '{}' read as {} rows x {} columns",
            sheet_name,
            sheet.height(),
            sheet.width()
        );
        Ok(sheet)
    }
}

/// Lay a used range out on an A1-anchored grid.
///
/// calamine trims leading blank rows and columns from the used range, but the
/// positional layouts count from column A, so the offset is padded back in.
pub fn range_to_sheet(sheet_name: &str, range: &Range<Data>) -> RawSheet {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<RawCell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![RawCell::Empty; col_offset];
        cells.extend(row.iter().map(to_raw_cell));
        rows.push(cells);
    }

    RawSheet::new(sheet_name, rows)
}

pub fn to_raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTime(excel_date) => match excel_date.as_datetime() {
            Some(ts) => RawCell::Timestamp(ts),
            None => RawCell::Number(excel_date.as_f64()),
        },
        Data::DateTimeIso(s) => parse_timestamp_text(s)
            .map(RawCell::Timestamp)
            .unwrap_or_else(|| RawCell::Text(s.clone())),
        Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => {
            debug!("Cell error {:?} read as empty", e);
            RawCell::Empty
        }
        Data::Empty => RawCell::Empty,
    }
}
