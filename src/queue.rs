//! Plain-text URL queue for batch runs.
//!
//! One URL per line. Blank lines and lines starting with `#` are ignored and
//! duplicates are dropped, keeping the first occurrence. Processed URLs are
//! appended to a separate done file so an interrupted run can be resumed by
//! hand.

use itertools::Itertools;
use std::error::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// Parse queue file contents into the ordered list of URLs.
pub fn parse_queue(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .unique()
        .map(str::to_string)
        .collect()
}

#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn read_queue(path: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let text = fs::read_to_string(path).await?;
    let urls = parse_queue(&text);
    info!(count = urls.len(), "Loaded URL queue");
    Ok(urls)
}

/// Append `url` to the done file, creating it if needed.
pub async fn mark_done(path: &str, url: &str) -> Result<(), Box<dyn Error>> {
    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(format!("{url}\n").as_bytes()).await?;
    Ok(())
}
