//! Spreadsheet bulletins: first worksheet only

use crate::content::{DocumentContent, Sheet};
use crate::error::{BulletinError, Result};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;
use tracing::debug;

pub fn read_sheet(path: &Path) -> Result<DocumentContent> {
    let read_error = |reason: String| BulletinError::DocumentRead {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| read_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| read_error("workbook has no worksheets".to_string()))?
        .map_err(|e| read_error(e.to_string()))?;

    // Ranges start at the first used cell; pad so indices are sheet-absolute
    let (first_row, first_column) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); first_row as usize];
    for cells in range.rows() {
        let mut row = vec![String::new(); first_column as usize];
        row.extend(cells.iter().map(cell_text));
        rows.push(row);
    }

    debug!("Read {} worksheet rows from {}", rows.len(), path.display());
    Ok(DocumentContent::Sheet(Sheet::new(rows)))
}

/// Cell value as text; whole-number floats lose their fractional part
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            (*value as i64).to_string()
        }
        other => other.to_string(),
    }
}
