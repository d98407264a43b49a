//! I layout: a rivers table and a separate water-bodies table
//!
//! Both tables are found by their header cell rather than by position. Some
//! offices add a merged "Состояние водного объекта" column; its presence
//! shifts the ice and flood columns, so the extractor tracks it while reading.

use super::Extractor;
use super::table::{
    base_record, drop_leading_headers, split_names, strip_row, unexpected_length,
};
use crate::constants::{NO_CONNECTION, WATER_BODY_HEADER, WATER_STATE_HEADER};
use crate::content::{DocumentContent, Table};
use crate::error::ExtractError;
use crate::models::{ObservationRecord, VariantCode};
use regex::Regex;
use std::sync::LazyLock;

/// Header cell of either table once spaces are removed
static TABLE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(Река)|Водныйобъект)[—–-]пункт$").expect("table header pattern is valid")
});

/// Column the water-bodies table carries that the rivers table does not
const WATER_TABLE_EXTRA_COLUMN: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct IExtractor;

impl Extractor for IExtractor {
    fn variant(&self) -> VariantCode {
        VariantCode::I
    }

    fn extract(&self, content: &DocumentContent) -> Result<Vec<ObservationRecord>, ExtractError> {
        let tables = content.as_tables().ok_or_else(|| {
            ExtractError::mismatch(
                VariantCode::I,
                format!("expected word-processor tables, got {}", content.kind()),
            )
        })?;

        let (rivers, water_bodies) = locate_tables(tables);
        if rivers.is_none() && water_bodies.is_none() {
            return Err(ExtractError::mismatch(
                VariantCode::I,
                "no 'Река – пункт' or 'Водный объект – пункт' table",
            ));
        }

        let mut has_state = false;
        let mut rows = Vec::new();
        if let Some(table) = rivers {
            has_state |= collect_rows(table, false, &mut rows);
        }
        if let Some(table) = water_bodies {
            has_state |= collect_rows(table, true, &mut rows);
        }

        let mut rows = split_names(rows, VariantCode::I)?;
        rows.retain(|row| row[0] != WATER_BODY_HEADER);
        drop_leading_headers(&mut rows);

        if !has_state {
            // Rows spanning the two unused gauge columns
            for row in rows.iter_mut().filter(|row| row.len() == 7) {
                row.drain(4..6);
            }
        }
        rows.retain(|row| row.get(2).is_none_or(|level| level.trim() != NO_CONNECTION));

        rows.iter()
            .enumerate()
            .map(|(index, row)| parse_row(index, &strip_row(row), has_state))
            .collect()
    }
}

/// The last rivers table and the last water-bodies table in the document
fn locate_tables(tables: &[Table]) -> (Option<&Table>, Option<&Table>) {
    let mut rivers = None;
    let mut water_bodies = None;

    for table in tables {
        for cell in table.cells() {
            let key = cell.trim().replace(' ', "");
            if let Some(captures) = TABLE_HEADER.captures(&key) {
                if captures.get(1).is_some() {
                    rivers = Some(table);
                } else {
                    water_bodies = Some(table);
                }
            }
        }
    }

    (rivers, water_bodies)
}

/// Append the table's rows to `rows`, dropping the ice-state header cell.
///
/// Returns whether that cell was seen.
fn collect_rows(table: &Table, water_bodies: bool, rows: &mut Vec<Vec<String>>) -> bool {
    let mut has_state = false;

    for source in &table.rows {
        let mut row = Vec::with_capacity(source.len());
        for cell in source {
            if cell.trim().replace('\n', " ") == WATER_STATE_HEADER {
                has_state = true;
            } else {
                row.push(cell.replace(['\n', '\t'], ""));
            }
        }

        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if water_bodies && row.len() > WATER_TABLE_EXTRA_COLUMN {
            row.remove(WATER_TABLE_EXTRA_COLUMN);
        }
        rows.push(row);
    }

    has_state
}

fn parse_row(
    index: usize,
    row: &[String],
    has_state: bool,
) -> Result<ObservationRecord, ExtractError> {
    if row.len() < 4 {
        return Err(unexpected_length(VariantCode::I, index, row.len()));
    }

    let mut record = base_record(row);
    let merged = record.clear_merged_identity();

    if has_state {
        match row.len() {
            4 => {}
            5 => record.ice_state = row[4].clone(),
            6 => {
                record.ice_state = row[4].clone();
                record.flood_level = row[5].clone();
            }
            len => return Err(unexpected_length(VariantCode::I, index, len)),
        }
    } else {
        // Without the state column a merged row keeps its ice text in the level cell
        if merged {
            record.ice_state = row[2].clone();
        }
        match row.len() {
            4 => {}
            5 => record.flood_level = row[4].clone(),
            len => return Err(unexpected_length(VariantCode::I, index, len)),
        }
    }

    Ok(record)
}
