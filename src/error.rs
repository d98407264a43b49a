//! Error handling for bulletin processing operations.
//!
//! Two layers: [`ExtractError`] describes why a single extractor could not
//! turn document content into records, and [`BulletinError`] covers everything
//! around it (loading, reference data, writing, configuration).

use crate::models::VariantCode;
use std::path::PathBuf;
use thiserror::Error;

/// Failure raised while extracting records from one document's content.
///
/// `FormatMismatch` is the only recoverable variant: it tells the dispatcher
/// to try the next extractor. Everything else means the right extractor was
/// chosen but the document is internally malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("content does not match the {variant} layout: {reason}")]
    FormatMismatch { variant: VariantCode, reason: String },

    #[error("start marker line not present in text bulletin")]
    StartMarkerMissing,

    #[error("end marker line not present in text bulletin")]
    EndMarkerMissing,

    #[error("line {line} has {found} ':'-separated data fields, expected {expected}")]
    MissingColumns {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("{variant} row {row} has {len} columns, which matches no known layout")]
    UnexpectedRowLength {
        variant: VariantCode,
        row: usize,
        len: usize,
    },

    #[error("none of the configured extractors recognised the document (tried: {tried})")]
    UnknownFormat { tried: String },
}

impl ExtractError {
    pub fn mismatch(variant: VariantCode, reason: impl Into<String>) -> Self {
        Self::FormatMismatch {
            variant,
            reason: reason.into(),
        }
    }

    /// True when the dispatcher may move on to the next extractor
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::FormatMismatch { .. })
    }
}

#[derive(Error, Debug)]
pub enum BulletinError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input directory not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Reference set not found at path: {path}")]
    ReferenceNotFound { path: PathBuf },

    #[error("Invalid reference set in file: {path} - {reason}")]
    InvalidReference { path: PathBuf, reason: String },

    #[error("Rename table not found at path: {path}")]
    RenameTableNotFound { path: PathBuf },

    #[error("Invalid rename table {path} at line {line}: {reason}")]
    InvalidRenameTable {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Unsupported document: {path} - {reason}")]
    UnsupportedDocument { path: PathBuf, reason: String },

    #[error("Failed to read document: {path} - {reason}")]
    DocumentRead { path: PathBuf, reason: String },

    #[error("Extraction failed for document: {path} - {source}")]
    Extraction {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing failed for document: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, BulletinError>;
