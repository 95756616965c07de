//! # Article Press
//!
//! Turns news and opinion articles into clean, self-contained printable
//! documents.
//!
//! ## Features
//!
//! - Dedicated extraction strategies for a fixed set of publishers, picked by
//!   the URL's origin
//! - A generic text-density extractor for every other site, and as the
//!   fallback when a strategy fails
//! - Images inlined as data URIs so documents print offline
//! - PDF rendering through headless Chrome
//! - Batch runs over a queue file, sorted into chapters with a JSON manifest
//!
//! ## Usage
//!
//! ```sh
//! article_press extract https://www.wsj.com/articles/some-story --index 3
//! article_press batch --queue urls.txt --output-dir ./out
//! ```
//!
//! ## Architecture
//!
//! 1. **Routing**: map the URL's origin to a publisher strategy
//! 2. **Extraction**: fetch, clean and rewrite the article under a retry policy
//! 3. **Fallback**: run the generic extractor when the strategy gives up
//! 4. **Output**: write HTML, render PDF, record the batch manifest

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod batch;
mod browser;
mod cli;
mod config;
mod dom;
mod error;
mod fetch;
mod images;
mod models;
mod outputs;
mod queue;
mod readability;
mod render;
mod retry;
mod router;
mod scrapers;
mod summary;
#[cfg(test)]
mod testing;
mod utils;

use batch::{BatchOptions, run_batch};
use cli::{Cli, Command};
use fetch::HttpFetcher;
use models::{ArticleRequest, PrintableArticle};
use outputs::json;
use render::{ChromePdf, Render};
use router::Router;
use scrapers::Registry;
use utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("article_press starting up");

    let args = Cli::parse();
    debug!(?args.command, "Parsed CLI arguments");

    let config = config::load_config(args.config.as_deref())?;
    let fetcher = HttpFetcher::new(&config)?;
    let router = Router::new(Registry::standard(), fetcher, config.retry.policy());

    match args.command {
        Command::Extract { url, index, output } => {
            let Some(article) = route_one(&router, &url, index).await? else {
                return Ok(());
            };
            match output {
                Some(path) => {
                    fs::write(&path, &article.html).await?;
                    info!(%path, title = %article.title, "Wrote article");
                }
                None => println!("{}", article.html),
            }
        }
        Command::Pdf { url, index, output } => {
            let Some(article) = route_one(&router, &url, index).await? else {
                return Ok(());
            };
            let pdf = ChromePdf::new(&config).render(&article.html).await?;
            fs::write(&output, pdf).await?;
            info!(path = %output, title = %article.title, "Wrote PDF");
        }
        Command::Summary { url } => {
            let Some(article) = route_one(&router, &url, None).await? else {
                return Ok(());
            };
            let text = summary::digest(&article.html);
            debug!(preview = %truncate_for_log(&text, 200), "Digest ready");
            println!("{text}");
        }
        Command::Batch {
            queue,
            output_dir,
            done,
            no_pdf,
        } => {
            ensure_writable_dir(&output_dir).await?;
            let urls = queue::read_queue(&queue).await?;
            let options = BatchOptions {
                output_dir: PathBuf::from(&output_dir),
                done_file: done,
            };
            let renderer = ChromePdf::new(&config);
            let renderer = (!no_pdf).then_some(&renderer);

            let result = run_batch(&router, renderer, &urls, &options).await;
            let manifest = json::write_manifest(&result, &output_dir, Local::now().date_naive()).await?;
            info!(
                written = result.written(),
                skipped = result.skipped.len(),
                failed = result.failed.len(),
                manifest = %manifest.display(),
                "Batch complete"
            );
        }
    }

    info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "article_press finished");
    Ok(())
}

/// Route a single URL; `None` means it was skipped as a non-article.
async fn route_one(
    router: &Router<HttpFetcher>,
    url: &str,
    index: Option<String>,
) -> Result<Option<PrintableArticle>, Box<dyn Error>> {
    let request = ArticleRequest::parse(url, index)?;
    let article = router.route(&request).await?;
    if article.is_none() {
        info!(%url, "URL is not an article; nothing to write");
    }
    Ok(article)
}
