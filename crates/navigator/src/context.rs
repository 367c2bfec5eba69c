//! Page-lifetime state shared by everything the navigator does.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

use preture_client::{FetchClient, FetchConfig, Fetcher, Prefetcher, RequestCoordinator};
use preture_core::{AppConfig, CacheDb, Error, KeyValueStore, PersistentCache};

/// Cache, coordinator and prefetcher for one page, plus its start guard.
///
/// Build one per page and hand it to the `Navigator`; injecting the
/// navigator script again reuses the same context, and the guard keeps it
/// from wiring the page twice.
#[derive(Debug)]
pub struct PageContext {
    config: AppConfig,
    coordinator: RequestCoordinator,
    prefetcher: Prefetcher,
    initialized: AtomicBool,
}

impl PageContext {
    pub fn new(config: AppConfig, store: Arc<dyn KeyValueStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        let cache = PersistentCache::new(store);
        let coordinator = RequestCoordinator::new(cache, fetcher);
        let prefetcher = Prefetcher::new(coordinator.clone());
        Self { config, coordinator, prefetcher, initialized: AtomicBool::new(false) }
    }

    /// `open` with configuration from `AppConfig::load`: defaults, then the
    /// TOML file named by `PRETURE_CONFIG_FILE`, then `PRETURE_*` variables.
    pub async fn from_env() -> Result<Self, Error> {
        let config = AppConfig::load()?;
        Self::open(config).await
    }

    /// Context backed by the SQLite store at `config.db_path` and a reqwest
    /// fetcher configured from `config`.
    pub async fn open(config: AppConfig) -> Result<Self, Error> {
        let store = CacheDb::open(&config.db_path).await?;
        let fetcher = FetchClient::new(FetchConfig::from(&config))?;
        Ok(Self::new(config, Arc::new(store), Arc::new(fetcher)))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &PersistentCache {
        self.coordinator.cache()
    }

    pub fn coordinator(&self) -> &RequestCoordinator {
        &self.coordinator
    }

    pub fn prefetcher(&self) -> &Prefetcher {
        &self.prefetcher
    }

    /// Claim the one-time initialization. True only for the first caller.
    pub fn mark_initialized(&self) -> bool {
        self.initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Clear the page cache when debug mode applies to `page`.
    ///
    /// Returns whether the cache was cleared.
    pub async fn reset_if_debug(&self, page: &Url) -> Result<bool, Error> {
        if !self.config.debug_for(page.as_str()) {
            return Ok(false);
        }

        self.cache().clear().await?;
        tracing::info!(%page, "debug: cache cleared");
        Ok(true)
    }
}
