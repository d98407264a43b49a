//! Hydrological bulletin converter
//!
//! Regional hydrometeorological offices publish daily water-level bulletins,
//! each office in its own layout. This library turns those bulletins into
//! feature tables keyed to a canonical list of gauges.
//!
//! This library provides tools for:
//! - Loading bulletins from plain text, `.docx` tables and spreadsheets
//! - Extracting observations with one extractor per bulletin layout
//! - Resolving raw station and river names exactly or by similarity
//! - Merging observations onto the canonical gauge list
//! - Writing CSV or Parquet feature tables, one per bulletin

pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod extract;
pub mod loader;
pub mod models;
pub mod processor;
pub mod reconcile;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::BulletinConfig;
pub use content::DocumentContent;
pub use error::{BulletinError, ExtractError, Result};
pub use extract::{Extractor, FormatDispatcher};
pub use models::{CanonicalSet, FeatureTable, ObservationRecord, RenameTable, VariantCode};
pub use processor::BulletinProcessor;
