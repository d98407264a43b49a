//! Configuration management and validation.
//!
//! Holds the reconciliation parameters (sentinel, pruning, matcher cutoffs),
//! the extractor trial order, concurrency limits and the reference-file
//! column names.

use crate::constants::{
    DEFAULT_DIAGNOSTIC_BUFFER, DEFAULT_FALLBACK_ENCODING, DEFAULT_REFERENCE_GEOMETRY_COLUMN,
    DEFAULT_REFERENCE_RIVER_COLUMN, DEFAULT_REFERENCE_STATION_COLUMN, DEFAULT_UNSET_SENTINEL,
};
use crate::error::{BulletinError, Result};
use crate::models::VariantCode;
use serde::{Deserialize, Serialize};

/// Parameters of the adaptive-threshold similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum similarity for a candidate to enter the search at all
    pub seed_cutoff: f64,

    /// Cutoff of the first narrowing step
    pub initial_cutoff: f64,

    /// Cutoff adjustment of the first narrowing step, halved every step
    pub initial_step: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            seed_cutoff: 0.1,
            initial_cutoff: 0.5,
            initial_step: 0.25,
        }
    }
}

/// Output file format for feature tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Column names of the canonical reference file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceColumns {
    pub station: String,
    pub river: String,
    pub geometry: String,
}

impl Default for ReferenceColumns {
    fn default() -> Self {
        Self {
            station: DEFAULT_REFERENCE_STATION_COLUMN.to_string(),
            river: DEFAULT_REFERENCE_RIVER_COLUMN.to_string(),
            geometry: DEFAULT_REFERENCE_GEOMETRY_COLUMN.to_string(),
        }
    }
}

/// Global configuration for bulletin processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletinConfig {
    /// Placeholder for attributes that received no observation
    pub unset_sentinel: String,

    /// Drop output rows whose level and level change are both unset
    pub prune_unset: bool,

    /// Extractors to try, in order
    pub formats: Vec<VariantCode>,

    /// Maximum documents processed at once
    pub max_concurrent_documents: usize,

    /// Capacity of the unmatched-record diagnostic channel
    pub diagnostic_buffer: usize,

    /// Feature table file format
    pub output_format: OutputFormat,

    /// Encoding label for text bulletins that are not valid UTF-8
    pub fallback_encoding: String,

    /// Column names in the reference file
    pub reference_columns: ReferenceColumns,

    /// Similarity search parameters
    pub matcher: MatcherConfig,
}

impl Default for BulletinConfig {
    fn default() -> Self {
        Self {
            unset_sentinel: DEFAULT_UNSET_SENTINEL.to_string(),
            prune_unset: true,
            formats: VariantCode::ALL.to_vec(),
            max_concurrent_documents: num_cpus::get(),
            diagnostic_buffer: DEFAULT_DIAGNOSTIC_BUFFER,
            output_format: OutputFormat::Csv,
            fallback_encoding: DEFAULT_FALLBACK_ENCODING.to_string(),
            reference_columns: ReferenceColumns::default(),
            matcher: MatcherConfig::default(),
        }
    }
}

impl BulletinConfig {
    pub fn with_unset_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.unset_sentinel = sentinel.into();
        self
    }

    pub fn with_prune_unset(mut self, prune: bool) -> Self {
        self.prune_unset = prune;
        self
    }

    pub fn with_formats(mut self, formats: Vec<VariantCode>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_max_concurrent_documents(mut self, limit: usize) -> Self {
        self.max_concurrent_documents = limit;
        self
    }

    pub fn with_diagnostic_buffer(mut self, capacity: usize) -> Self {
        self.diagnostic_buffer = capacity;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_fallback_encoding(mut self, label: impl Into<String>) -> Self {
        self.fallback_encoding = label.into();
        self
    }

    pub fn with_reference_columns(mut self, columns: ReferenceColumns) -> Self {
        self.reference_columns = columns;
        self
    }

    pub fn with_matcher(mut self, matcher: MatcherConfig) -> Self {
        self.matcher = matcher;
        self
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.formats.is_empty() {
            return Err(BulletinError::Configuration {
                message: "at least one bulletin format must be enabled".to_string(),
            });
        }
        if self.max_concurrent_documents == 0 {
            return Err(BulletinError::Configuration {
                message: "concurrency must be at least 1".to_string(),
            });
        }
        if self.diagnostic_buffer == 0 {
            return Err(BulletinError::Configuration {
                message: "diagnostic buffer must hold at least one message".to_string(),
            });
        }
        if encoding_rs::Encoding::for_label(self.fallback_encoding.as_bytes()).is_none() {
            return Err(BulletinError::Configuration {
                message: format!("unknown text encoding '{}'", self.fallback_encoding),
            });
        }
        let m = &self.matcher;
        // NaN falls outside every range, so this also rejects non-finite values
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        let positive_step = m.initial_step.is_finite() && m.initial_step > 0.0;
        if !in_unit(m.seed_cutoff) || !in_unit(m.initial_cutoff) || !positive_step {
            return Err(BulletinError::Configuration {
                message: "matcher cutoffs must lie in [0, 1] and the step must be positive"
                    .to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BulletinConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.unset_sentinel, "-");
        assert!(config.prune_unset);
        assert_eq!(config.formats, VariantCode::ALL.to_vec());
        assert!(config.max_concurrent_documents >= 1);
    }

    #[test]
    fn test_builder_overrides() {
        let config = BulletinConfig::default()
            .with_unset_sentinel("n/a")
            .with_prune_unset(false)
            .with_formats(vec![VariantCode::Oi])
            .with_output_format(OutputFormat::Parquet);

        assert_eq!(config.unset_sentinel, "n/a");
        assert!(!config.prune_unset);
        assert_eq!(config.formats, vec![VariantCode::Oi]);
        assert_eq!(config.output_format.extension(), "parquet");
    }

    #[test]
    fn test_validation_rejects_bad_settings() {
        assert!(
            BulletinConfig::default()
                .with_formats(Vec::new())
                .validate()
                .is_err()
        );
        assert!(
            BulletinConfig::default()
                .with_max_concurrent_documents(0)
                .validate()
                .is_err()
        );
        assert!(
            BulletinConfig::default()
                .with_fallback_encoding("no-such-encoding")
                .validate()
                .is_err()
        );
        let matcher = MatcherConfig {
            seed_cutoff: 1.5,
            ..MatcherConfig::default()
        };
        assert!(
            BulletinConfig::default()
                .with_matcher(matcher)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_validation_rejects_non_finite_matcher_values() {
        for step in [f64::NAN, f64::INFINITY, 0.0, -0.25] {
            let matcher = MatcherConfig {
                initial_step: step,
                ..MatcherConfig::default()
            };
            assert!(
                BulletinConfig::default()
                    .with_matcher(matcher)
                    .validate()
                    .is_err(),
                "step {} should be rejected",
                step
            );
        }
        for cutoff in [f64::NAN, f64::NEG_INFINITY] {
            let matcher = MatcherConfig {
                initial_cutoff: cutoff,
                ..MatcherConfig::default()
            };
            assert!(
                BulletinConfig::default()
                    .with_matcher(matcher)
                    .validate()
                    .is_err()
            );
        }
    }
}
