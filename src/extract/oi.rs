//! OI layout: a spreadsheet with river and station in separate columns
//!
//! The data block starts at the `Река` header row and ends at the
//! confidentiality notice. Between them sit sub-header rows and blank spacer
//! rows, which are recognised by their date and level columns.

use super::Extractor;
use super::table::{normalize_water_level, strip_whitespace, unexpected_length};
use crate::constants::{CONFIDENTIAL_NOTICE, OI_CLEAR_ICE, OI_START_DATE_HEADER, RIVER_HEADER};
use crate::content::{DocumentContent, Sheet};
use crate::error::ExtractError;
use crate::models::{ObservationRecord, VariantCode};

const RIVER: usize = 0;
const STATION: usize = 1;
const WATER_LEVEL: usize = 3;
const WATER_LEVEL_CHANGE: usize = 4;
const DATE: usize = 5;
const FLOOD_LEVEL: usize = 11;
const FLOODPLAIN_LEVEL: usize = 12;
const ICE: usize = 13;

/// Columns a data row must have
const ROW_WIDTH: usize = ICE + 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct OiExtractor;

impl Extractor for OiExtractor {
    fn variant(&self) -> VariantCode {
        VariantCode::Oi
    }

    fn extract(&self, content: &DocumentContent) -> Result<Vec<ObservationRecord>, ExtractError> {
        let sheet = content.as_sheet().ok_or_else(|| {
            ExtractError::mismatch(
                VariantCode::Oi,
                format!("expected a spreadsheet, got {}", content.kind()),
            )
        })?;

        let rows = data_rows(sheet)?;
        rows.into_iter()
            .enumerate()
            .map(|(index, row)| parse_row(index, row))
            .collect()
    }
}

/// Rows between the `Река` header and the confidentiality notice that carry a level
fn data_rows(sheet: &Sheet) -> Result<Vec<&[String]>, ExtractError> {
    let mut started = false;
    let mut ended = false;
    let mut rows = Vec::new();

    for index in 0..sheet.row_count() {
        let row = sheet.row_values(index);
        let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
        let first = cell(RIVER).trim();

        if first == RIVER_HEADER {
            started = true;
        }
        if first == CONFIDENTIAL_NOTICE {
            ended = true;
        }

        let is_data = started
            && first != CONFIDENTIAL_NOTICE
            && first != RIVER_HEADER
            && cell(DATE).trim() != OI_START_DATE_HEADER
            && !cell(WATER_LEVEL).trim().is_empty();

        if is_data {
            rows.push(row);
        } else if started && ended {
            break;
        }
    }

    if !started {
        return Err(ExtractError::mismatch(
            VariantCode::Oi,
            "sheet has no 'Река' header row",
        ));
    }
    Ok(rows)
}

fn parse_row(index: usize, row: &[String]) -> Result<ObservationRecord, ExtractError> {
    if row.len() < ROW_WIDTH {
        return Err(unexpected_length(VariantCode::Oi, index, row.len()));
    }

    let field = |i: usize| strip_whitespace(&row[i]);
    let mut record = ObservationRecord::new(field(RIVER), field(STATION));
    record.water_level = normalize_water_level(&field(WATER_LEVEL));
    record.water_level_change = field(WATER_LEVEL_CHANGE);
    record.flood_level = field(FLOOD_LEVEL);
    record.floodplain_level = field(FLOODPLAIN_LEVEL);
    if !row[ICE].contains(OI_CLEAR_ICE) {
        record.ice_state = field(ICE);
    }
    record.clear_merged_identity();
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> DocumentContent {
        DocumentContent::Sheet(Sheet::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        ))
    }

    fn data_row<'a>(
        river: &'a str,
        station: &'a str,
        level: &'a str,
        ice: &'a str,
    ) -> [&'a str; 14] {
        [
            river, station, "", level, "+4", "", "", "", "", "", "", "520", "410", ice,
        ]
    }

    #[test]
    fn test_reads_rows_between_header_and_notice() {
        let content = sheet(&[
            &["Бюллетень"],
            &["Река", "Пост", "", "Уровень"],
            &["", "", "", "", "", "начальная дата"],
            &data_row("Обь", "Колпашево", "1412", "ледостав"),
            &["", "", "", ""],
            &data_row("Кеть", "Максимкин Яр", "230", "Чисто"),
            &[CONFIDENTIAL_NOTICE],
            &data_row("Томь", "Томск", "300", ""),
        ]);

        let records = OiExtractor.extract(&content).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].river_name, "Обь");
        assert_eq!(records[0].station_name, "Колпашево");
        assert_eq!(records[0].water_level, "412");
        assert_eq!(records[0].water_level_change, "+4");
        assert_eq!(records[0].flood_level, "520");
        assert_eq!(records[0].floodplain_level, "410");
        assert_eq!(records[0].ice_state, "ледостав");
        assert_eq!(records[1].station_name, "МаксимкинЯр");
        assert!(records[1].ice_state.is_empty());
    }

    #[test]
    fn test_missing_header_is_mismatch() {
        let content = sheet(&[&data_row("Обь", "Колпашево", "140", "")]);
        assert!(OiExtractor.extract(&content).unwrap_err().is_format_mismatch());
    }

    #[test]
    fn test_tables_content_is_mismatch() {
        let content = DocumentContent::Tables(Vec::new());
        assert!(OiExtractor.extract(&content).unwrap_err().is_format_mismatch());
    }

    #[test]
    fn test_short_data_row_is_fatal() {
        let content = sheet(&[&["Река"], &["Обь", "Колпашево", "", "140", "+1"]]);
        let error = OiExtractor.extract(&content).unwrap_err();
        assert_eq!(
            error,
            ExtractError::UnexpectedRowLength {
                variant: VariantCode::Oi,
                row: 1,
                len: 5
            }
        );
    }
}
