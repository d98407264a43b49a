//! Shared handling for word-processor table layouts
//!
//! Table bulletins put river and station into one cell ("Обь – Барнаул"),
//! repeat the column header at the top of every table, and sometimes show
//! water levels with a spurious thousands digit.

use crate::constants::{NAME_DASHES, RIVER_HEADER, WATER_LEVEL_DISPLAY_LIMIT};
use crate::content::{DocumentContent, Table};
use crate::error::ExtractError;
use crate::models::{ObservationRecord, VariantCode};

/// Column of the river name after splitting
pub const RIVER_COLUMN: usize = 0;
/// Column of the station name after splitting
pub const STATION_COLUMN: usize = 1;
pub const WATER_LEVEL_COLUMN: usize = 2;
pub const WATER_LEVEL_CHANGE_COLUMN: usize = 3;

/// Rows ready for column mapping: names split, headers dropped, whitespace removed.
///
/// Used by the layouts that keep all their rows in plain tables (B, ZB).
pub fn prepare_rows(
    content: &DocumentContent,
    variant: VariantCode,
) -> Result<Vec<Vec<String>>, ExtractError> {
    let tables = content.as_tables().ok_or_else(|| {
        ExtractError::mismatch(
            variant,
            format!("expected word-processor tables, got {}", content.kind()),
        )
    })?;

    let rows = read_rows(tables);
    if rows.is_empty() {
        return Err(ExtractError::mismatch(variant, "document has no table rows"));
    }

    let mut rows = split_names(rows, variant)?;
    drop_leading_headers(&mut rows);
    Ok(rows.iter().map(|row| strip_row(row)).collect())
}

/// Rows of every table with trimmed cells, skipping rows with no text at all
pub fn read_rows(tables: &[Table]) -> Vec<Vec<String>> {
    tables
        .iter()
        .flat_map(|table| table.rows.iter())
        .map(|row| row.iter().map(|cell| cell.trim().to_string()).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect()
}

/// Replace each row's combined first cell with its river and station parts
pub fn split_names(
    rows: Vec<Vec<String>>,
    variant: VariantCode,
) -> Result<Vec<Vec<String>>, ExtractError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            split_row(row).ok_or_else(|| {
                ExtractError::mismatch(
                    variant,
                    format!("row {} has no river/station separator", index + 1),
                )
            })
        })
        .collect()
}

/// Split the first cell on the highest-priority dash it contains.
///
/// Spaces are removed first. Every occurrence of the chosen dash splits, so a
/// name that itself contains that dash yields more than two parts.
fn split_row(mut row: Vec<String>) -> Option<Vec<String>> {
    if row.is_empty() {
        return None;
    }
    let combined = row.remove(0).replace(' ', "");
    let dash = NAME_DASHES.iter().find(|dash| combined.contains(**dash))?;

    let mut split: Vec<String> = combined.split(*dash).map(str::to_string).collect();
    split.extend(row);
    Some(split)
}

/// Remove the repeated column-header rows at the top of the table
pub fn drop_leading_headers(rows: &mut Vec<Vec<String>>) {
    let headers = rows
        .iter()
        .take_while(|row| row.first().is_some_and(|cell| cell.trim() == RIVER_HEADER))
        .count();
    rows.drain(..headers);
}

/// Remove spaces, tabs and line breaks anywhere in a field
pub fn strip_whitespace(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        .collect()
}

pub fn strip_row(row: &[String]) -> Vec<String> {
    row.iter().map(|cell| strip_whitespace(cell)).collect()
}

/// Drop the spurious thousands digit some offices print in front of levels.
///
/// Integers above 999 are reduced modulo 1000; anything else is returned as is.
pub fn normalize_water_level(value: &str) -> String {
    match value.parse::<i64>() {
        Ok(level) if level > WATER_LEVEL_DISPLAY_LIMIT => (level % 1000).to_string(),
        _ => value.to_string(),
    }
}

/// Record with identity, level and level change filled from a stripped row.
///
/// The caller has already checked the row length.
pub fn base_record(row: &[String]) -> ObservationRecord {
    let mut record = ObservationRecord::new(&row[RIVER_COLUMN], &row[STATION_COLUMN]);
    record.water_level = normalize_water_level(&row[WATER_LEVEL_COLUMN]);
    record.water_level_change = row[WATER_LEVEL_CHANGE_COLUMN].clone();
    record
}

pub fn unexpected_length(variant: VariantCode, index: usize, len: usize) -> ExtractError {
    ExtractError::UnexpectedRowLength {
        variant,
        row: index + 1,
        len,
    }
}
