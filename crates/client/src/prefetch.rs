//! Fetch a page, inline its assets, and cache the result.

use url::Url;

use preture_core::Error;

use crate::coordinator::RequestCoordinator;
use crate::inliner::AssetInliner;

/// Warms the page cache with self-contained pages.
#[derive(Debug, Clone)]
pub struct Prefetcher {
    coordinator: RequestCoordinator,
    inliner: AssetInliner,
}

impl Prefetcher {
    pub fn new(coordinator: RequestCoordinator) -> Self {
        let inliner = AssetInliner::new(coordinator.clone());
        Self { coordinator, inliner }
    }

    /// Fetch `url`, inline its scripts and stylesheets, and store the result.
    ///
    /// The inlined page always replaces whatever was cached for `url`, even
    /// the raw copy the coordinator stored moments earlier.
    pub async fn prefetch(&self, url: &Url) -> Result<(), Error> {
        let text = self.coordinator.get(url).await?;
        tracing::debug!(%url, "prefetch");

        let html = self.inliner.inline(&text, url).await?;
        self.coordinator.cache().set_text(url.as_str(), &html).await
    }
}
