//! JSON manifest of a batch run.
//!
//! The manifest is what a downstream merger needs to stitch the per-article
//! PDFs into one book: chapters in order, each with bookmark labels and file
//! paths, plus the URLs that were skipped or failed.

use chrono::NaiveDate;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

use crate::batch::{BatchResult, Chapter, FailedEntry};

#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub date: String,
    pub chapters: Vec<Chapter>,
    pub skipped: &'a [String],
    pub failed: &'a [FailedEntry],
}

impl<'a> Manifest<'a> {
    pub fn new(result: &'a BatchResult, date: NaiveDate) -> Self {
        Self {
            date: date.to_string(),
            chapters: result.chapters(),
            skipped: &result.skipped,
            failed: &result.failed,
        }
    }
}

/// Write the manifest for `result` to `{output_dir}/{date}_manifest.json`.
///
/// # Arguments
///
/// * `result` - Outcome of the batch run
/// * `output_dir` - Batch output directory, created if missing
/// * `date` - Date the manifest is filed under
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir, %date))]
pub async fn write_manifest(
    result: &BatchResult,
    output_dir: &str,
    date: NaiveDate,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(&Manifest::new(result, date))?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let path = PathBuf::from(output_dir).join(format!("{date}_manifest.json"));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote batch manifest");
    Ok(path)
}
