//! Directory-level processing engine.
//!
//! Discovers bulletins in the input directory and runs each through the
//! [`DocumentPipeline`] on a blocking task, with at most
//! `max_concurrent_documents` in flight. A failing document is logged and
//! counted; it never stops the others.

pub mod discovery;
pub mod pipeline;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::discovery::DocumentDiscovery;
use self::pipeline::{DocumentOutcome, DocumentPipeline};

use crate::config::BulletinConfig;
use crate::error::{BulletinError, Result};
use crate::models::{CanonicalSet, ProcessingStats, RenameTable};
use crate::reconcile::{ChannelSink, DiagnosticSink};

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tokio::task;
use tracing::{debug, error, warn};

/// Converts every bulletin in one directory
pub struct BulletinProcessor {
    input_dir: PathBuf,
    output_dir: PathBuf,
    config: BulletinConfig,
    pipeline: Arc<DocumentPipeline>,
    sink: Option<Arc<dyn DiagnosticSink>>,
    show_progress: bool,
}

impl BulletinProcessor {
    /// Create a processor over a loaded reference set.
    ///
    /// A rename table switches identity resolution to exact mode.
    pub fn new(
        input_dir: PathBuf,
        output_dir: PathBuf,
        canonical: CanonicalSet,
        renames: Option<RenameTable>,
        config: BulletinConfig,
    ) -> Result<Self> {
        if !input_dir.is_dir() {
            return Err(BulletinError::InputNotFound { path: input_dir });
        }
        config.validate()?;

        let pipeline = DocumentPipeline::new(
            Arc::new(canonical),
            renames.map(Arc::new),
            &config,
            output_dir.clone(),
        )?;

        Ok(Self {
            input_dir,
            output_dir,
            config,
            pipeline: Arc::new(pipeline),
            sink: None,
            show_progress: true,
        })
    }

    /// Send diagnostics to `sink` instead of a background channel
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Toggle the progress bar and the printed summary
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn pipeline(&self) -> &DocumentPipeline {
        &self.pipeline
    }

    /// Main processing entry point
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        if self.show_progress {
            println!("{}", "Starting bulletin processing".bright_green().bold());
            println!("  {} {}", "Input:".bright_cyan(), self.input_dir.display());
            println!("  {} {}", "Output:".bright_cyan(), self.output_dir.display());
            println!(
                "  {} {} gauges",
                "Reference:".bright_cyan(),
                self.pipeline.canonical().len()
            );
        }

        let mut discovery = DocumentDiscovery::new(self.input_dir.clone());
        let documents = discovery.discover_documents().await?;
        if self.show_progress {
            println!(
                "  {} {} bulletins ({} other files skipped)",
                "Found".bright_green(),
                documents.len().to_string().bright_white().bold(),
                discovery.skipped()
            );
        }

        let mut stats = ProcessingStats::default();
        if documents.is_empty() {
            warn!("No bulletins found in {}", self.input_dir.display());
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }

        fs::create_dir_all(&self.output_dir).await?;

        // Caller-supplied sink, or a bounded channel drained into the log
        let (sink, channel) = match &self.sink {
            Some(sink) => (sink.clone(), None),
            None => {
                let (channel, drain) = ChannelSink::spawn(self.config.diagnostic_buffer);
                let sink: Arc<dyn DiagnosticSink> = Arc::new(channel.clone());
                (sink, Some((channel, drain)))
            }
        };

        let progress_bar = if self.show_progress {
            let pb = ProgressBar::new(documents.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                    )
                    .map_err(|e| BulletinError::Configuration {
                        message: format!("invalid progress template: {}", e),
                    })?
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let concurrent_limit = self.config.max_concurrent_documents.min(documents.len());
        debug!(
            "Processing {} bulletins, {} at a time",
            documents.len(),
            concurrent_limit
        );

        let mut results = stream::iter(documents)
            .map(|path| {
                let pipeline = self.pipeline.clone();
                let sink = sink.clone();
                async move {
                    let task_path = path.clone();
                    let result = task::spawn_blocking(move || {
                        pipeline.process_document(&task_path, sink.as_ref())
                    })
                    .await
                    .map_err(|e| BulletinError::ProcessingFailed {
                        path: path.clone(),
                        reason: format!("Task join error: {}", e),
                    })
                    .and_then(|result| result);
                    (path, result)
                }
            })
            .buffer_unordered(concurrent_limit);

        while let Some((path, result)) = results.next().await {
            let name = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();

            match result {
                Ok(outcome) => {
                    stats.documents_processed += 1;
                    stats.add_document(outcome.stats());
                    match outcome {
                        DocumentOutcome::Written { output, .. } => stats.outputs.push(output),
                        DocumentOutcome::Empty { .. } => {
                            stats.documents_empty += 1;
                            warn!("No records in {} matched the reference set", name);
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to process {}: {}", name, e);
                    stats.documents_failed += 1;
                }
            }

            progress_bar.inc(1);
            progress_bar.set_message(name);
        }
        progress_bar.finish_with_message("Processing complete");

        drop(results);
        drop(sink);
        if let Some((channel, drain)) = channel {
            stats.diagnostics_dropped = channel.dropped();
            drop(channel);
            match drain.await {
                Ok(forwarded) => debug!("Forwarded {} diagnostics", forwarded),
                Err(e) => warn!("Diagnostic drain task failed: {}", e),
            }
        }

        stats.outputs.sort();
        stats.processing_time_ms = start_time.elapsed().as_millis();

        if self.show_progress {
            print_summary(&stats);
        }

        Ok(stats)
    }
}

fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Bulletins processed:".bright_cyan(),
        stats.documents_processed.to_string().bright_white()
    );
    if stats.documents_failed > 0 {
        println!(
            "  {} {}",
            "Bulletins failed:".bright_red(),
            stats.documents_failed.to_string().bright_red().bold()
        );
    }
    if stats.documents_empty > 0 {
        println!(
            "  {} {}",
            "Bulletins without matches:".bright_yellow(),
            stats.documents_empty.to_string().bright_yellow()
        );
    }
    println!(
        "  {} {} extracted, {} resolved, {} merged",
        "Records:".bright_cyan(),
        stats.records_extracted.to_string().bright_white().bold(),
        stats.records_resolved.to_string().bright_white(),
        stats.records_merged.to_string().bright_white()
    );
    if stats.records_unmatched > 0 || stats.diagnostics_dropped > 0 {
        println!(
            "  {} {} unmatched, {} diagnostics dropped",
            "Diagnostics:".bright_yellow(),
            stats.records_unmatched,
            stats.diagnostics_dropped
        );
    }
    println!(
        "  {} {}",
        "Files written:".bright_cyan(),
        stats.outputs.len().to_string().bright_white().bold()
    );
}
