//! Command-line argument definitions for the bulletin converter
//!
//! This module defines the CLI interface using the clap derive API and maps
//! it onto [`BulletinConfig`].

use crate::config::{BulletinConfig, OutputFormat, ReferenceColumns};
use crate::constants::{
    DEFAULT_FALLBACK_ENCODING, DEFAULT_REFERENCE_GEOMETRY_COLUMN, DEFAULT_REFERENCE_RIVER_COLUMN,
    DEFAULT_REFERENCE_STATION_COLUMN, DEFAULT_UNSET_SENTINEL,
};
use crate::error::{BulletinError, Result};
use crate::models::VariantCode;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// CLI arguments for the hydrological bulletin converter
///
/// Reads every bulletin in a directory, extracts station observations and
/// writes one feature table per bulletin, keyed to a canonical gauge list.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hydro-bulletin",
    version,
    about = "Convert regional hydrological bulletins into gauge feature tables",
    long_about = "Extracts water-level observations from regional hydrological bulletins \
                  (plain text, word-processor tables or spreadsheets), reconciles station \
                  and river names against a canonical gauge list and writes one feature \
                  table per bulletin."
)]
pub struct Args {
    /// Directory holding the bulletins to convert
    ///
    /// Only the top level is scanned. Editor lock files (~$name) are skipped.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Canonical gauge list (CSV with a header row)
    #[arg(short = 'r', long = "reference", value_name = "CSV")]
    pub reference: PathBuf,

    /// Exact rename table (`raw;canonical` per line)
    ///
    /// When given, names are mapped exactly through this table instead of
    /// being matched approximately.
    #[arg(long = "renames", value_name = "CSV")]
    pub renames: Option<PathBuf>,

    /// Output directory for feature tables
    ///
    /// Created if it does not exist. Defaults to INPUT_DIR/output.
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Bulletin layouts to try, in order (comma-separated: zs,b,zb,i,oi)
    #[arg(long = "formats", value_name = "LIST", value_delimiter = ',')]
    pub formats: Vec<VariantCode>,

    /// Placeholder for attributes that received no observation
    #[arg(long = "null-symbol", value_name = "SYMBOL", default_value = DEFAULT_UNSET_SENTINEL)]
    pub null_symbol: String,

    /// Keep gauges that received neither a level nor a level change
    #[arg(long = "no-prune")]
    pub no_prune: bool,

    /// Feature table file format
    #[arg(long = "output-format", value_enum, default_value_t = OutputFormatArg::Csv)]
    pub output_format: OutputFormatArg,

    /// Maximum bulletins processed at once (defaults to the CPU count)
    #[arg(short = 'j', long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Encoding of text bulletins that are not UTF-8
    #[arg(long = "fallback-encoding", value_name = "LABEL", default_value = DEFAULT_FALLBACK_ENCODING)]
    pub fallback_encoding: String,

    /// Station name column in the reference file
    #[arg(long = "station-column", value_name = "NAME", default_value = DEFAULT_REFERENCE_STATION_COLUMN)]
    pub station_column: String,

    /// River name column in the reference file
    #[arg(long = "river-column", value_name = "NAME", default_value = DEFAULT_REFERENCE_RIVER_COLUMN)]
    pub river_column: String,

    /// Geometry column in the reference file
    #[arg(long = "geometry-column", value_name = "NAME", default_value = DEFAULT_REFERENCE_GEOMETRY_COLUMN)]
    pub geometry_column: String,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and hide progress output
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Output file format as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Parquet,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::Csv => OutputFormat::Csv,
            OutputFormatArg::Parquet => OutputFormat::Parquet,
        }
    }
}

impl Args {
    /// Reject missing inputs before anything is loaded
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.is_dir() {
            return Err(BulletinError::InputNotFound {
                path: self.input_dir.clone(),
            });
        }
        if !self.reference.is_file() {
            return Err(BulletinError::ReferenceNotFound {
                path: self.reference.clone(),
            });
        }
        if let Some(renames) = &self.renames {
            if !renames.is_file() {
                return Err(BulletinError::RenameTableNotFound {
                    path: renames.clone(),
                });
            }
        }
        Ok(())
    }

    /// Output directory, defaulting to `INPUT_DIR/output`
    pub fn get_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => default_output_dir(&self.input_dir),
        }
    }

    /// Processing configuration for these arguments
    pub fn to_config(&self) -> BulletinConfig {
        let mut config = BulletinConfig::default()
            .with_unset_sentinel(self.null_symbol.clone())
            .with_prune_unset(!self.no_prune)
            .with_output_format(self.output_format.into())
            .with_fallback_encoding(self.fallback_encoding.clone())
            .with_reference_columns(ReferenceColumns {
                station: self.station_column.clone(),
                river: self.river_column.clone(),
                geometry: self.geometry_column.clone(),
            });

        if !self.formats.is_empty() {
            config = config.with_formats(self.formats.clone());
        }
        if let Some(limit) = self.concurrency {
            config = config.with_max_concurrent_documents(limit);
        }
        config
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

fn default_output_dir(input_dir: &Path) -> PathBuf {
    input_dir.join("output")
}
