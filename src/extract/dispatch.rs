//! Sequential trial of extractors against one document

use super::{Extractor, extractor_for};
use crate::content::DocumentContent;
use crate::error::ExtractError;
use crate::models::{ExtractedDocument, VariantCode};
use tracing::{debug, trace};

/// Tries each configured extractor in order and keeps the first that accepts the document
pub struct FormatDispatcher {
    extractors: Vec<&'static dyn Extractor>,
}

impl FormatDispatcher {
    pub fn new(order: &[VariantCode]) -> Self {
        Self {
            extractors: order.iter().map(|variant| extractor_for(*variant)).collect(),
        }
    }

    /// Trial order as variant codes
    pub fn order(&self) -> Vec<VariantCode> {
        self.extractors.iter().map(|e| e.variant()).collect()
    }

    /// Extract records with the first extractor that recognises the content.
    ///
    /// Structural errors from a recognising extractor are returned as is; they
    /// are not a reason to try the next layout.
    pub fn dispatch(&self, content: &DocumentContent) -> Result<ExtractedDocument, ExtractError> {
        for extractor in &self.extractors {
            let variant = extractor.variant();
            match extractor.extract(content) {
                Ok(records) => {
                    debug!("{} layout accepted {} records", variant, records.len());
                    return Ok(ExtractedDocument { variant, records });
                }
                Err(error) if error.is_format_mismatch() => {
                    trace!("{}", error);
                }
                Err(error) => return Err(error),
            }
        }

        let tried = self
            .order()
            .iter()
            .map(VariantCode::code)
            .collect::<Vec<_>>()
            .join(", ");
        Err(ExtractError::UnknownFormat { tried })
    }
}

impl Default for FormatDispatcher {
    fn default() -> Self {
        Self::new(&VariantCode::ALL)
    }
}
