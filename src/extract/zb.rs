//! ZB layout: one word-processor table with eight or ten columns

use super::Extractor;
use super::table::{base_record, prepare_rows, unexpected_length};
use crate::content::DocumentContent;
use crate::error::ExtractError;
use crate::models::{ObservationRecord, VariantCode};

#[derive(Debug, Clone, Copy, Default)]
pub struct ZbExtractor;

impl Extractor for ZbExtractor {
    fn variant(&self) -> VariantCode {
        VariantCode::Zb
    }

    fn extract(&self, content: &DocumentContent) -> Result<Vec<ObservationRecord>, ExtractError> {
        let rows = prepare_rows(content, VariantCode::Zb)?;
        let mut records = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let (ice, floodplain) = match row.len() {
                8 => (Some(4), 5),
                // Ten-column offices report no ice text
                10 => (None, 9),
                len => return Err(unexpected_length(VariantCode::Zb, index, len)),
            };

            let mut record = base_record(row);
            if let Some(ice) = ice {
                record.ice_state = row[ice].clone();
            }
            record.floodplain_level = row[floodplain].clone();
            record.clear_merged_identity();
            records.push(record);
        }

        Ok(records)
    }
}
