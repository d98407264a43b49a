//! B layout: one word-processor table whose optional columns vary by row length

use super::Extractor;
use super::table::{base_record, prepare_rows, unexpected_length};
use crate::content::DocumentContent;
use crate::error::ExtractError;
use crate::models::{ObservationRecord, VariantCode};

#[derive(Debug, Clone, Copy, Default)]
pub struct BExtractor;

impl Extractor for BExtractor {
    fn variant(&self) -> VariantCode {
        VariantCode::B
    }

    fn extract(&self, content: &DocumentContent) -> Result<Vec<ObservationRecord>, ExtractError> {
        let rows = prepare_rows(content, VariantCode::B)?;
        rows.iter()
            .enumerate()
            .map(|(index, row)| parse_row(index, row))
            .collect()
    }
}

fn parse_row(index: usize, row: &[String]) -> Result<ObservationRecord, ExtractError> {
    let (ice, floodplain, flood) = match row.len() {
        8 => (None, 4, 5),
        9 => (Some(4), 5, 6),
        10 => (None, 6, 7),
        11 => (None, 6, 8),
        len => return Err(unexpected_length(VariantCode::B, index, len)),
    };

    let mut record = base_record(row);
    if let Some(ice) = ice {
        record.ice_state = row[ice].clone();
    }
    record.floodplain_level = row[floodplain].clone();
    record.flood_level = row[flood].clone();
    record.clear_merged_identity();
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::table_of;

    fn extract(rows: &[&[&str]]) -> Result<Vec<ObservationRecord>, ExtractError> {
        BExtractor.extract(&DocumentContent::Tables(vec![table_of(rows)]))
    }

    #[test]
    fn test_eight_column_rows() {
        let records = extract(&[
            &["Река – пункт", "Уровень", "Изм", "a", "b", "c", "d"],
            &["Обь – Барнаул", "1245", "+3", "310", "450", "x", "y"],
        ])
        .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.river_name, "Обь");
        assert_eq!(record.station_name, "Барнаул");
        assert_eq!(record.water_level, "245");
        assert_eq!(record.water_level_change, "+3");
        assert_eq!(record.floodplain_level, "310");
        assert_eq!(record.flood_level, "450");
        assert!(record.ice_state.is_empty());
    }

    #[test]
    fn test_nine_column_rows_carry_ice() {
        let records = extract(&[&[
            "Бия – Бийск",
            "210",
            "-2",
            "забереги",
            "300",
            "420",
            "a",
            "b",
        ]])
        .unwrap();

        assert_eq!(records[0].ice_state, "забереги");
        assert_eq!(records[0].floodplain_level, "300");
        assert_eq!(records[0].flood_level, "420");
    }

    #[test]
    fn test_ten_and_eleven_column_rows() {
        let records = extract(&[
            &["Обь — Камень", "1", "2", "a", "b", "fp10", "fl10", "c", "d"],
            &["Обь — Камень", "1", "2", "a", "b", "fp11", "c", "fl11", "d", "e"],
        ])
        .unwrap();

        assert_eq!(records[0].floodplain_level, "fp10");
        assert_eq!(records[0].flood_level, "fl10");
        assert_eq!(records[1].floodplain_level, "fp11");
        assert_eq!(records[1].flood_level, "fl11");
    }

    #[test]
    fn test_unknown_row_length_is_fatal() {
        let error = extract(&[&["Обь – Барнаул", "1", "2", "3", "4"]]).unwrap_err();
        assert_eq!(
            error,
            ExtractError::UnexpectedRowLength {
                variant: VariantCode::B,
                row: 1,
                len: 6
            }
        );
    }

    #[test]
    fn test_cells_are_stripped() {
        let records = extract(&[&["Обь – Барнаул", "1 20", "+\n3", "3 10", "45\t0", "a", "b"]])
            .unwrap();
        assert_eq!(records[0].water_level, "120");
        assert_eq!(records[0].water_level_change, "+3");
        assert_eq!(records[0].floodplain_level, "310");
        assert_eq!(records[0].flood_level, "450");
    }

    #[test]
    fn test_text_content_is_mismatch() {
        let error = BExtractor
            .extract(&DocumentContent::Text(vec!["Обь".to_string()]))
            .unwrap_err();
        assert!(error.is_format_mismatch());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let content = DocumentContent::Tables(vec![table_of(&[&[
            "Обь – Барнаул",
            "120",
            "+3",
            "a",
            "310",
            "450",
            "b",
        ]])]);
        assert_eq!(
            BExtractor.extract(&content).unwrap(),
            BExtractor.extract(&content).unwrap()
        );
    }
}
