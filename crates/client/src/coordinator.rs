//! Single-flight, cache-first GET.
//!
//! Every page and asset fetch goes through `RequestCoordinator::get`:
//!
//! 1. A cached value is returned without touching the network.
//! 2. A fetch already in flight for the same URL is joined; all callers
//!    share its outcome.
//! 3. Otherwise a new fetch is registered in the in-flight map before the
//!    request is issued. The cache is checked again under the map lock, so a
//!    fetch that settled between the first lookup and the lock is not
//!    repeated.
//!
//! Each fetch runs on its own task, which writes the cache and then removes
//! the in-flight entry. Callers only hold a shared handle to that task, so
//! the fetch settles even when every caller is dropped. Failures are shared
//! too and leave no cache entry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture, Shared};
use tokio::sync::Mutex;
use url::Url;

use preture_core::{Error, FetchError, PersistentCache};

use crate::fetch::Fetcher;

type PendingFetch = Shared<BoxFuture<'static, Result<String, FetchError>>>;

struct Inner {
    cache: PersistentCache,
    fetcher: Arc<dyn Fetcher>,
    in_flight: Mutex<HashMap<String, PendingFetch>>,
}

/// Deduplicating fetcher in front of the page cache.
///
/// Cloning shares the cache, fetcher and in-flight map.
#[derive(Clone)]
pub struct RequestCoordinator {
    inner: Arc<Inner>,
}

impl fmt::Debug for RequestCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCoordinator").field("cache", &self.inner.cache).finish_non_exhaustive()
    }
}

impl RequestCoordinator {
    pub fn new(cache: PersistentCache, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { inner: Arc::new(Inner { cache, fetcher, in_flight: Mutex::new(HashMap::new()) }) }
    }

    pub fn cache(&self) -> &PersistentCache {
        &self.inner.cache
    }

    /// Text content for `url`: cached, joined, or freshly fetched.
    ///
    /// # Errors
    ///
    /// `Error::Fetch` when the network request fails or returns a non-success
    /// status; every caller joined on that request gets the same error.
    /// `Error::Database` when the cache lookup fails.
    pub async fn get(&self, url: &Url) -> Result<String, Error> {
        if let Some(cached) = self.inner.cache.get(url.as_str()).await? {
            tracing::debug!(%url, "using cache");
            return Ok(cached);
        }

        let pending = self.join_or_start(url).await?;
        pending.await.map_err(Error::from)
    }

    /// Number of fetches currently pending.
    pub async fn in_flight(&self) -> usize {
        self.inner.in_flight.lock().await.len()
    }

    async fn join_or_start(&self, url: &Url) -> Result<PendingFetch, Error> {
        let mut in_flight = self.inner.in_flight.lock().await;

        if let Some(pending) = in_flight.get(url.as_str()) {
            tracing::debug!(%url, "using inflight");
            return Ok(pending.clone());
        }

        // a fetch may have been stored and unregistered since the first lookup
        if let Some(cached) = self.inner.cache.get(url.as_str()).await? {
            tracing::debug!(%url, "using cache");
            return Ok(future::ready(Ok(cached)).boxed().shared());
        }

        tracing::debug!(%url, "inflight");
        let task = tokio::spawn(fetch_and_store(Arc::clone(&self.inner), url.clone()));
        let task_url = url.to_string();
        let pending = task
            .map(move |joined| joined.unwrap_or_else(|e| Err(FetchError::transport(task_url, e))))
            .boxed()
            .shared();
        in_flight.insert(url.as_str().to_string(), pending.clone());
        Ok(pending)
    }
}

async fn fetch_and_store(inner: Arc<Inner>, url: Url) -> Result<String, FetchError> {
    let result = inner.fetcher.fetch_text(&url).await;

    match &result {
        Ok(text) => {
            if let Err(e) = inner.cache.set_text(url.as_str(), text).await {
                tracing::warn!(%url, error = %e, "fetched but could not cache");
            }
        }
        Err(e) => tracing::debug!(%url, status = ?e.status, cause = %e.cause, "fetch failed"),
    }

    inner.in_flight.lock().await.remove(url.as_str());
    result
}
