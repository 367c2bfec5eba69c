//! Link interception, speculative prefetch and in-place rendering.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use url::Url;

use preture_client::{Link, inline_scripts, same_site_links};
use preture_core::Error;

use crate::context::PageContext;
use crate::host::Page;

/// Drives navigation for one page.
pub struct Navigator<P: Page> {
    ctx: Arc<PageContext>,
    page: Arc<P>,
    prefetches: Mutex<JoinSet<()>>,
}

impl<P: Page> Navigator<P> {
    pub fn new(ctx: Arc<PageContext>, page: Arc<P>) -> Self {
        Self { ctx, page, prefetches: Mutex::new(JoinSet::new()) }
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    /// Wire up the page once.
    ///
    /// Clears the cache first when debug mode applies to the current page.
    /// Returns false, doing nothing else, if the context was already
    /// initialized by an earlier call.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(&self) -> Result<bool, Error> {
        self.ctx.reset_if_debug(&self.page.location()).await?;

        if !self.ctx.mark_initialized() {
            tracing::info!("already initialized");
            return Ok(false);
        }

        tracing::info!(page = %self.page.location(), "init");
        self.scan().await?;
        Ok(true)
    }

    /// Intercept every same-site link in the current document and start a
    /// background prefetch for each one not already cached.
    ///
    /// Prefetch failures are logged and dropped; a later click fetches
    /// the page again.
    pub async fn scan(&self) -> Result<Vec<Link>, Error> {
        let location = self.page.location();
        let links = same_site_links(&self.page.document_html(), &location);

        let mut prefetches = self.prefetches.lock().await;
        while let Some(joined) = prefetches.try_join_next() {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "prefetch task failed");
            }
        }

        for link in &links {
            tracing::debug!(href = %link.href, "register onclick");
            self.page.intercept(link);

            if self.ctx.cache().get(link.href.as_str()).await?.is_some() {
                continue;
            }

            let prefetcher = self.ctx.prefetcher().clone();
            let href = link.href.clone();
            prefetches.spawn(async move {
                if let Err(e) = prefetcher.prefetch(&href).await {
                    tracing::debug!(%href, error = %e, "prefetch abandoned");
                }
            });
        }

        Ok(links)
    }

    /// Background prefetches not yet reaped.
    ///
    /// Finished tasks are collected at the start of every scan.
    pub async fn pending_prefetches(&self) -> usize {
        self.prefetches.lock().await.len()
    }

    /// Wait for every background prefetch started so far.
    pub async fn settle(&self) {
        let mut pending = std::mem::take(&mut *self.prefetches.lock().await);
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "prefetch task failed");
            }
        }
    }

    /// Navigate to `href` without a full page load.
    ///
    /// Uses the cached page when there is one, otherwise waits on the
    /// coordinator. Then swaps the document, pushes history and scans the
    /// new document for links.
    ///
    /// # Errors
    ///
    /// A failed fetch is returned as is and the current document stays in
    /// place.
    pub async fn route(&self, href: &Url) -> Result<(), Error> {
        let html = match self.ctx.cache().get(href.as_str()).await? {
            Some(cached) => {
                tracing::debug!(%href, "cached");
                cached
            }
            None => {
                tracing::debug!(%href, "fetch");
                self.ctx.coordinator().get(href).await?
            }
        };

        self.render(href, &html);
        self.scan().await?;
        Ok(())
    }

    /// Replace the document, run its inline scripts in order, push history.
    ///
    /// A script that throws is logged and the remaining scripts still run.
    fn render(&self, href: &Url, html: &str) {
        self.page.replace_document(html);

        for (index, source) in inline_scripts(html).iter().enumerate() {
            if let Err(e) = self.page.eval_script(source) {
                tracing::warn!(%href, index, error = %e, "inline script failed");
            }
        }

        self.page.push_state(href);
    }
}
