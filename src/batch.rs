//! Batch driver: route a list of URLs one after another and sort the results
//! into chapters.
//!
//! Each URL gets the sequence index `position + 1`. Successful articles are
//! written to `{out}/{category}/{index}_{slug}.html` and, when a renderer is
//! given, printed to a PDF next to it. The outcome of every URL lands in a
//! [`BatchResult`] that the caller turns into a manifest.
//!
//! # Chapters
//!
//! | Order | Chapter | URLs |
//! |-------|---------|------|
//! | 1 | Opinion Articles | opinion sections, WSJ, Guardian comment, Global Times, Livemint, Dawn |
//! | 2 | Explained Articles | URL contains `explained` |
//! | 3 | Other Articles | everything else |
//! | 4 | Economist and EPW | economist.com, epw.in |
//!
//! Opinion articles are shuffled so a long run of one publisher gets broken
//! up.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

use crate::error::ExtractError;
use crate::fetch::Fetch;
use crate::models::{ArticleRequest, PrintableArticle};
use crate::queue::mark_done;
use crate::render::Render;
use crate::router::Router;
use crate::utils::slugify_title;

const OPINION_MARKERS: &[&str] = &[
    "opinion",
    "wsj.com",
    "theguardian.com/commentisfree/",
    "globaltimes.cn/",
    "livemint.com/",
    "dawn.com/",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Opinion,
    Explained,
    Other,
    EconomistEpw,
}

impl Category {
    /// Chapter order.
    pub const ALL: [Category; 4] = [
        Category::Opinion,
        Category::Explained,
        Category::Other,
        Category::EconomistEpw,
    ];

    /// Category of a URL; the first matching rule wins.
    pub fn of(url: &str) -> Self {
        if url.contains("explained") {
            Category::Explained
        } else if OPINION_MARKERS.iter().any(|m| url.contains(m)) {
            Category::Opinion
        } else if url.contains("economist.com/") || url.contains("epw.in/") {
            Category::EconomistEpw
        } else {
            Category::Other
        }
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Opinion => "opinion",
            Category::Explained => "explained",
            Category::Other => "other",
            Category::EconomistEpw => "economist_epw",
        }
    }

    pub fn chapter_title(self) -> &'static str {
        match self {
            Category::Opinion => "Chapter 1: Opinion Articles",
            Category::Explained => "Chapter 2: Explained Articles",
            Category::Other => "Chapter 3: Other Articles",
            Category::EconomistEpw => "Chapter 4: Economist and EPW",
        }
    }
}

/// One article written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    /// Sequence index within the whole batch.
    pub index: usize,
    pub url: String,
    pub title: String,
    pub html_path: PathBuf,
    pub pdf_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedEntry {
    pub url: String,
    pub error: String,
}

/// A chapter entry with its bookmark label.
#[derive(Debug, Clone, Serialize)]
pub struct Bookmark {
    /// `"{position}_{index}.{title}"`, position 1-based within the chapter.
    ///
    /// Titles that already start with `"{index}_"` (the generic extractor
    /// labels its titles) lose that prefix first, so the index appears once.
    pub label: String,
    pub url: String,
    pub html_path: PathBuf,
    pub pdf_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    pub title: String,
    pub entries: Vec<Bookmark>,
}

/// Outcome of a batch run, owned by the caller.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub opinion: Vec<BatchEntry>,
    pub explained: Vec<BatchEntry>,
    pub other: Vec<BatchEntry>,
    pub economist_epw: Vec<BatchEntry>,
    /// URLs recognized as non-articles.
    pub skipped: Vec<String>,
    pub failed: Vec<FailedEntry>,
}

fn bookmark_label(position: usize, entry: &BatchEntry) -> String {
    let prefix = format!("{}_", entry.index);
    let title = entry.title.strip_prefix(&prefix).unwrap_or(&entry.title);
    format!("{}_{}.{}", position, entry.index, title)
}

impl BatchResult {
    pub fn push(&mut self, category: Category, entry: BatchEntry) {
        match category {
            Category::Opinion => self.opinion.push(entry),
            Category::Explained => self.explained.push(entry),
            Category::Other => self.other.push(entry),
            Category::EconomistEpw => self.economist_epw.push(entry),
        }
    }

    pub fn bucket(&self, category: Category) -> &[BatchEntry] {
        match category {
            Category::Opinion => &self.opinion,
            Category::Explained => &self.explained,
            Category::Other => &self.other,
            Category::EconomistEpw => &self.economist_epw,
        }
    }

    /// Number of articles written.
    pub fn written(&self) -> usize {
        Category::ALL.iter().map(|&c| self.bucket(c).len()).sum()
    }

    pub fn shuffle_opinion<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.opinion.shuffle(rng);
    }

    /// Non-empty chapters in order, with bookmark labels.
    pub fn chapters(&self) -> Vec<Chapter> {
        Category::ALL
            .iter()
            .filter(|&&c| !self.bucket(c).is_empty())
            .map(|&c| Chapter {
                title: c.chapter_title().to_string(),
                entries: self
                    .bucket(c)
                    .iter()
                    .enumerate()
                    .map(|(pos, e)| Bookmark {
                        label: bookmark_label(pos + 1, e),
                        url: e.url.clone(),
                        html_path: e.html_path.clone(),
                        pdf_path: e.pdf_path.clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    /// File processed URLs are appended to.
    pub done_file: Option<String>,
}

/// `{index}_{slug}.html` under the category directory.
pub fn html_path(output_dir: &Path, category: Category, index: usize, title: &str) -> PathBuf {
    output_dir
        .join(category.dir_name())
        .join(format!("{index}_{}.html", slugify_title(title)))
}

async fn write_article<R: Render>(
    renderer: Option<&R>,
    article: &PrintableArticle,
    path: &Path,
) -> Result<Option<PathBuf>, ExtractError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).await?;
    }
    fs::write(path, &article.html).await?;

    let Some(renderer) = renderer else {
        return Ok(None);
    };
    let pdf_path = path.with_extension("pdf");
    match renderer.render(&article.html).await {
        Ok(pdf) => {
            fs::write(&pdf_path, pdf).await?;
            Ok(Some(pdf_path))
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "PDF rendering failed; keeping HTML only");
            Ok(None)
        }
    }
}

/// Route every URL in order and write the results.
///
/// Failures never stop the run; they are recorded in
/// [`BatchResult::failed`].
#[instrument(level = "info", skip_all, fields(count = urls.len(), out = %options.output_dir.display()))]
pub async fn run_batch<F: Fetch, R: Render>(
    router: &Router<F>,
    renderer: Option<&R>,
    urls: &[String],
    options: &BatchOptions,
) -> BatchResult {
    let mut result = BatchResult::default();

    for (pos, url) in urls.iter().enumerate() {
        let index = pos + 1;
        let outcome = match ArticleRequest::parse(url, Some(index.to_string())) {
            Ok(request) => router.route(&request).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(Some(article)) => {
                let category = Category::of(url);
                let path = html_path(&options.output_dir, category, index, &article.title);
                match write_article(renderer, &article, &path).await {
                    Ok(pdf_path) => {
                        info!(index, %url, path = %path.display(), "Wrote article");
                        result.push(
                            category,
                            BatchEntry {
                                index,
                                url: url.clone(),
                                title: article.title,
                                html_path: path,
                                pdf_path,
                            },
                        );
                    }
                    Err(e) => {
                        error!(index, %url, error = %e, "Failed to write article");
                        result.failed.push(FailedEntry {
                            url: url.clone(),
                            error: e.to_string(),
                        });
                        continue;
                    }
                }
            }
            Ok(None) => {
                info!(index, %url, "Skipped non-article");
                result.skipped.push(url.clone());
            }
            Err(e) => {
                error!(index, %url, error = %e, "Extraction failed");
                result.failed.push(FailedEntry {
                    url: url.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        }

        if let Some(done) = &options.done_file {
            if let Err(e) = mark_done(done, url).await {
                warn!(%url, error = %e, "Could not record processed URL");
            }
        }
    }

    result.shuffle_opinion(&mut rand::rng());
    info!(
        written = result.written(),
        skipped = result.skipped.len(),
        failed = result.failed.len(),
        "Batch finished"
    );
    result
}
