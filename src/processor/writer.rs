//! Feature table output
//!
//! One file per converted document, named `<document stem>_<variant code>`,
//! with the columns `Obs Point`, `River`, the variant's attributes and
//! `geometry`. Every column is text.

use crate::config::OutputFormat;
use crate::constants::columns;
use crate::error::{BulletinError, Result};
use crate::models::FeatureTable;
use polars::prelude::{
    Column, CsvWriter, DataFrame, ParquetCompression, ParquetWriter, SerWriter,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes feature tables into one output directory
#[derive(Debug, Clone)]
pub struct FeatureWriter {
    output_dir: PathBuf,
    format: OutputFormat,
}

impl FeatureWriter {
    pub fn new(output_dir: PathBuf, format: OutputFormat) -> Self {
        Self { output_dir, format }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Output path for a document's table
    pub fn output_path(&self, document: &Path, table: &FeatureTable) -> PathBuf {
        let stem = document
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy();
        self.output_dir.join(format!(
            "{}_{}.{}",
            stem,
            table.variant.code(),
            self.format.extension()
        ))
    }

    /// Write `table` for `document`, returning the path written
    pub fn write(&self, document: &Path, table: &FeatureTable) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_path(document, table);

        let mut df = to_dataframe(table)?;
        let mut file = File::create(&output_path)?;
        let write_error = |e: polars::error::PolarsError| BulletinError::ProcessingFailed {
            path: output_path.clone(),
            reason: format!("Failed to write feature table: {}", e),
        };

        match self.format {
            OutputFormat::Csv => {
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .finish(&mut df)
                    .map_err(write_error)?;
            }
            OutputFormat::Parquet => {
                ParquetWriter::new(file)
                    .with_compression(ParquetCompression::Snappy)
                    .finish(&mut df)
                    .map_err(write_error)?;
            }
        }

        debug!("Wrote {} rows to {}", df.height(), output_path.display());
        Ok(output_path)
    }
}

/// Column-major copy of a feature table
pub fn to_dataframe(table: &FeatureTable) -> Result<DataFrame> {
    let text_column = |name: &str, values: Vec<&str>| Column::new(name.into(), values);

    let mut frame_columns = Vec::with_capacity(table.attributes.len() + 3);
    frame_columns.push(text_column(
        columns::STATION,
        table.rows.iter().map(|r| r.station_name.as_str()).collect(),
    ));
    frame_columns.push(text_column(
        columns::RIVER,
        table.rows.iter().map(|r| r.river_name.as_str()).collect(),
    ));
    for (index, attribute) in table.attributes.iter().enumerate() {
        frame_columns.push(text_column(
            attribute.column_name(),
            table
                .rows
                .iter()
                .map(|r| r.values.get(index).map(String::as_str).unwrap_or_default())
                .collect(),
        ));
    }
    frame_columns.push(text_column(
        columns::GEOMETRY,
        table.rows.iter().map(|r| r.geometry.as_str()).collect(),
    ));

    Ok(DataFrame::new(frame_columns)?)
}
