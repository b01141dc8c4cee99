//! CSV input/output and the ingest entrypoint.

use crate::clean::clean;
use crate::error::Result;
use crate::normalize::{NormalizeMethod, normalize};
use crate::schema::validate_schema;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Rows used to infer column types when reading CSV.
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Read a CSV file with a header row into a dataset.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    info!(path = %path.display(), rows = df.height(), columns = df.width(), "read csv");
    Ok(df)
}

/// Write a dataset to CSV, creating parent directories as needed.
pub fn write_csv(df: &DataFrame, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    let mut out = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut out)?;

    info!(path = %path.display(), rows = df.height(), "wrote csv");
    Ok(path.to_path_buf())
}

/// Result of [`process_file`].
#[derive(Debug)]
pub enum IngestOutput {
    /// The cleaned table was written to this path
    Written(PathBuf),
    /// No output path was given; the cleaned table is returned in memory
    Frame(DataFrame),
}

/// Read, validate, clean and normalize a telemetry CSV.
///
/// A schema failure aborts with [`crate::EtlError::Schema`]. When
/// `output` is given the table is written there and its path returned,
/// otherwise the cleaned table is returned.
pub fn process_file(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    method: NormalizeMethod,
) -> Result<IngestOutput> {
    let raw = read_csv(input)?;
    validate_schema(&raw).into_result()?;

    let cleaned = clean(&raw)?;
    let normalized = normalize(&cleaned, method)?;

    match output {
        Some(path) => Ok(IngestOutput::Written(write_csv(&normalized, path)?)),
        None => Ok(IngestOutput::Frame(normalized)),
    }
}
