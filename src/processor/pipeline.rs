//! Conversion of a single bulletin: load, extract, resolve, merge, write
//!
//! Everything here is synchronous and CPU-bound; the processor runs one
//! [`DocumentPipeline::process_document`] call per blocking task.

use super::writer::FeatureWriter;
use crate::config::BulletinConfig;
use crate::content::DocumentContent;
use crate::error::{BulletinError, ExtractError, Result};
use crate::extract::FormatDispatcher;
use crate::loader::DocumentLoader;
use crate::models::{CanonicalSet, DocumentStats, FeatureTable, RenameTable, VariantCode};
use crate::reconcile::{
    DiagnosticSink, IdentityResolver, ReconciliationMerger, SimilarityMatcher,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Result of converting one document's content
#[derive(Debug, Clone)]
pub struct Conversion {
    pub variant: VariantCode,
    /// `None` when no record resolved to a canonical identity
    pub table: Option<FeatureTable>,
    pub stats: DocumentStats,
}

/// What processing one document produced
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Written { output: PathBuf, stats: DocumentStats },
    /// Nothing resolved, so nothing was written
    Empty { stats: DocumentStats },
}

impl DocumentOutcome {
    pub fn stats(&self) -> &DocumentStats {
        match self {
            DocumentOutcome::Written { stats, .. } | DocumentOutcome::Empty { stats } => stats,
        }
    }
}

/// Shared, read-only state for converting documents
pub struct DocumentPipeline {
    canonical: Arc<CanonicalSet>,
    renames: Option<Arc<RenameTable>>,
    dispatcher: FormatDispatcher,
    matcher: SimilarityMatcher,
    merger: ReconciliationMerger,
    loader: DocumentLoader,
    writer: FeatureWriter,
}

impl DocumentPipeline {
    pub fn new(
        canonical: Arc<CanonicalSet>,
        renames: Option<Arc<RenameTable>>,
        config: &BulletinConfig,
        output_dir: PathBuf,
    ) -> Result<Self> {
        Ok(Self {
            canonical,
            renames,
            dispatcher: FormatDispatcher::new(&config.formats),
            matcher: SimilarityMatcher::new(config.matcher.clone()),
            merger: ReconciliationMerger::new(config.unset_sentinel.clone(), config.prune_unset),
            loader: DocumentLoader::from_label(&config.fallback_encoding)?,
            writer: FeatureWriter::new(output_dir, config.output_format),
        })
    }

    pub fn canonical(&self) -> &CanonicalSet {
        &self.canonical
    }

    pub fn writer(&self) -> &FeatureWriter {
        &self.writer
    }

    /// Extract, resolve and merge already-loaded content
    pub fn convert(
        &self,
        content: &DocumentContent,
        sink: &dyn DiagnosticSink,
    ) -> std::result::Result<Conversion, ExtractError> {
        let extracted = self.dispatcher.dispatch(content)?;
        let mut stats = DocumentStats {
            records_extracted: extracted.records.len(),
            ..Default::default()
        };

        let resolver = IdentityResolver::new(
            &self.canonical,
            self.renames.as_deref(),
            self.matcher.clone(),
        );
        let resolved = resolver.resolve(extracted.records, sink);
        stats.records_resolved = resolved.len();

        if resolved.is_empty() {
            return Ok(Conversion {
                variant: extracted.variant,
                table: None,
                stats,
            });
        }

        let outcome = self
            .merger
            .merge(&self.canonical, extracted.variant, &resolved, sink);
        stats.records_merged = outcome.merged;
        stats.records_unmatched = outcome.unmatched;

        // Nothing landed on the reference set
        let table = if outcome.merged == 0 || outcome.table.is_empty() {
            None
        } else {
            Some(outcome.table)
        };

        Ok(Conversion {
            variant: extracted.variant,
            table,
            stats,
        })
    }

    /// Convert one file and write its feature table
    pub fn process_document(
        &self,
        path: &Path,
        sink: &dyn DiagnosticSink,
    ) -> Result<DocumentOutcome> {
        let content = self.loader.load(path)?;
        let conversion = self
            .convert(&content, sink)
            .map_err(|source| BulletinError::Extraction {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            "{}: {} layout, {} extracted, {} resolved",
            path.display(),
            conversion.variant,
            conversion.stats.records_extracted,
            conversion.stats.records_resolved
        );

        match conversion.table {
            Some(table) => {
                let output = self.writer.write(path, &table)?;
                Ok(DocumentOutcome::Written {
                    output,
                    stats: conversion.stats,
                })
            }
            None => Ok(DocumentOutcome::Empty {
                stats: conversion.stats,
            }),
        }
    }
}
