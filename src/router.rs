//! Dispatch of article requests to publisher strategies.
//!
//! The router owns the registry, the fetcher and the retry policy. A
//! recognized origin runs its strategy under the retry policy; anything that
//! goes wrong there is logged and the generic extractor gets a turn. Only the
//! generic extractor's own failure reaches the caller.

use tracing::{info, instrument, warn};

use crate::error::ExtractError;
use crate::fetch::Fetch;
use crate::models::{ArticleRequest, PrintableArticle};
use crate::readability;
use crate::retry::RetryPolicy;
use crate::scrapers::Registry;

pub struct Router<F: Fetch> {
    registry: Registry,
    fetcher: F,
    retry: RetryPolicy,
}

impl<F: Fetch> Router<F> {
    pub fn new(registry: Registry, fetcher: F, retry: RetryPolicy) -> Self {
        Self {
            registry,
            fetcher,
            retry,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Produce the printable article for `request`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(article))` on success
    /// - `Ok(None)` when the strategy recognized the URL as a non-article
    /// - `Err(_)` only when the generic extractor fails as well
    #[instrument(level = "info", skip_all, fields(url = %request.url, index = ?request.index))]
    pub async fn route(&self, request: &ArticleRequest) -> Result<Option<PrintableArticle>, ExtractError> {
        let origin = request.origin();
        let Some(publisher) = self.registry.lookup(&origin) else {
            info!(%origin, "No strategy for origin; using generic extractor");
            return readability::extract(&self.fetcher, request).await;
        };

        let what = format!("{publisher} {}", request.url);
        match self
            .retry
            .run(&what, || publisher.extract(&self.fetcher, request))
            .await
        {
            Ok(Some(article)) => {
                info!(%publisher, title = %article.title, "Strategy succeeded");
                Ok(Some(article))
            }
            Ok(None) => {
                info!(%publisher, "Strategy recognized a non-article; skipping");
                Ok(None)
            }
            Err(ExtractError::Unsupported { .. }) => {
                info!(%publisher, "Layout not handled by strategy; using generic extractor");
                readability::extract(&self.fetcher, request).await
            }
            Err(e) => {
                warn!(%publisher, error = %e, "Strategy failed; using generic extractor");
                readability::extract(&self.fetcher, request).await
            }
        }
    }
}
