//! Command implementation for the bulletin converter CLI
//!
//! Sets up logging, loads the reference data and runs the processor. Any
//! failure here happens before a single bulletin is touched; per-bulletin
//! failures are counted by the processor instead.

use crate::cli::args::Args;
use crate::loader::{load_canonical_set, load_rename_table, text::encoding_for_label};
use crate::models::ProcessingStats;
use crate::processor::BulletinProcessor;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Main command runner
///
/// 1. Set up logging and validate arguments
/// 2. Load the canonical set and the optional rename table
/// 3. Process the input directory
pub async fn run(args: Args) -> Result<ProcessingStats> {
    setup_logging(&args)?;

    info!("Starting hydrological bulletin conversion");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = args.to_config();
    config.validate()?;
    debug!("Configuration: {:?}", config);

    let canonical = load_canonical_set(&args.reference, &config.reference_columns)
        .with_context(|| format!("loading reference set {}", args.reference.display()))?;

    let renames = match &args.renames {
        Some(path) => {
            let fallback = encoding_for_label(&config.fallback_encoding)?;
            let table = load_rename_table(path, fallback)
                .with_context(|| format!("loading rename table {}", path.display()))?;
            info!("Exact name mapping with {} renames", table.len());
            Some(table)
        }
        None => {
            info!("No rename table given, matching names approximately");
            None
        }
    };

    let processor = BulletinProcessor::new(
        args.input_dir.clone(),
        args.get_output_dir(),
        canonical,
        renames,
        config,
    )?
    .with_progress(args.show_progress());

    let stats = processor.process().await?;
    info!(
        "Converted {} bulletins ({} failed) in {}ms",
        stats.documents_processed, stats.documents_failed, stats.processing_time_ms
    );
    Ok(stats)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hydro_bulletin={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
