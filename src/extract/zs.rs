//! ZS layout: a fixed-width plain-text bulletin
//!
//! The data block lies between two separator lines. Each data line is framed
//! by `:` borders and splits into nine fields. Long ice descriptions wrap onto
//! continuation lines whose river field is empty.

use super::Extractor;
use super::table::strip_whitespace;
use crate::constants::{
    ZS_DATA_FIELDS, ZS_END_MARKER, ZS_RIVER_PREFIX, ZS_SPLIT_PARTS, ZS_START_MARKER,
};
use crate::content::DocumentContent;
use crate::error::ExtractError;
use crate::models::{ObservationRecord, VariantCode};
use tracing::debug;

/// Data-field positions kept, in output order
const RIVER: usize = 0;
const STATION: usize = 1;
const WATER_LEVEL: usize = 2;
const WATER_LEVEL_CHANGE: usize = 3;
const ICE: usize = 7;
const FLOOD_LEVEL: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct ZsExtractor;

impl Extractor for ZsExtractor {
    fn variant(&self) -> VariantCode {
        VariantCode::Zs
    }

    fn extract(&self, content: &DocumentContent) -> Result<Vec<ObservationRecord>, ExtractError> {
        let lines = content.as_text().ok_or_else(|| {
            ExtractError::mismatch(
                VariantCode::Zs,
                format!("expected plain text, got {}", content.kind()),
            )
        })?;

        let (first, block) = data_block(lines)?;
        let mut records: Vec<ObservationRecord> = Vec::new();

        for (offset, line) in block.iter().enumerate() {
            let line_number = first + offset + 1;
            let record = parse_line(line, line_number)?;

            if !record.river_name.is_empty() {
                records.push(record);
                continue;
            }

            match records.last_mut() {
                Some(previous) => {
                    previous.ice_state.push(' ');
                    previous.ice_state.push_str(&record.ice_state);
                }
                None => debug!(
                    "Dropping continuation line {} with no preceding station",
                    line_number
                ),
            }
        }

        Ok(records)
    }
}

/// Lines strictly between the start and end markers, with the index of the first one
fn data_block(lines: &[String]) -> Result<(usize, &[String]), ExtractError> {
    let start = lines
        .iter()
        .position(|line| line.trim_end() == ZS_START_MARKER)
        .ok_or(ExtractError::StartMarkerMissing)?
        + 1;
    let length = lines[start..]
        .iter()
        .position(|line| line.trim_end() == ZS_END_MARKER)
        .ok_or(ExtractError::EndMarkerMissing)?;

    Ok((start, &lines[start..start + length]))
}

fn parse_line(line: &str, line_number: usize) -> Result<ObservationRecord, ExtractError> {
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() != ZS_SPLIT_PARTS {
        return Err(ExtractError::MissingColumns {
            line: line_number,
            found: parts.len().saturating_sub(2),
            expected: ZS_DATA_FIELDS,
        });
    }

    let fields = &parts[1..=ZS_DATA_FIELDS];
    let river = strip_whitespace(&fields[RIVER].replace(ZS_RIVER_PREFIX, ""));

    let mut record = ObservationRecord::new(river, strip_whitespace(fields[STATION]));
    record.water_level = strip_whitespace(fields[WATER_LEVEL]);
    record.water_level_change = strip_whitespace(fields[WATER_LEVEL_CHANGE]);
    record.ice_state = fields[ICE].trim().to_string();
    record.flood_level = strip_whitespace(fields[FLOOD_LEVEL]);
    Ok(record)
}
