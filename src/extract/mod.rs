//! Format-specific table extractors
//!
//! Every regional office publishes its bulletin in its own layout. Each layout
//! has one extractor that turns raw [`DocumentContent`] into uniform
//! [`ObservationRecord`]s, and the [`FormatDispatcher`] picks the first
//! extractor that recognises a document.
//!
//! ## Layouts
//!
//! - [`zs`] - fixed-width plain text between two marker lines
//! - [`b`] - word-processor table, 8 to 11 columns
//! - [`zb`] - word-processor table, 8 or 10 columns
//! - [`i`] - rivers table plus water-bodies table, optional ice-state column
//! - [`oi`] - spreadsheet with separate river and station columns
//!
//! Shared table handling (name splitting, header stripping, water-level
//! normalization) lives in [`table`].

pub mod b;
pub mod dispatch;
pub mod i;
pub mod oi;
pub mod table;
pub mod zb;
pub mod zs;

pub use b::BExtractor;
pub use dispatch::FormatDispatcher;
pub use i::IExtractor;
pub use oi::OiExtractor;
pub use zb::ZbExtractor;
pub use zs::ZsExtractor;

use crate::content::DocumentContent;
use crate::error::ExtractError;
use crate::models::{ObservationRecord, VariantCode};

/// One bulletin layout's record extraction
pub trait Extractor: Send + Sync {
    fn variant(&self) -> VariantCode;

    /// Turn document content into records, in document order.
    ///
    /// Fails with [`ExtractError::FormatMismatch`] when the content is not this
    /// layout; any other error means the document is this layout but broken.
    fn extract(&self, content: &DocumentContent) -> Result<Vec<ObservationRecord>, ExtractError>;
}

/// The extractor for a layout
pub fn extractor_for(variant: VariantCode) -> &'static dyn Extractor {
    match variant {
        VariantCode::Zs => &ZsExtractor,
        VariantCode::B => &BExtractor,
        VariantCode::Zb => &ZbExtractor,
        VariantCode::I => &IExtractor,
        VariantCode::Oi => &OiExtractor,
    }
}
