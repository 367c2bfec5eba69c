//! Typed page cache over a `KeyValueStore`.

use std::fmt;
use std::sync::Arc;

use super::store::KeyValueStore;
use crate::Error;

/// URL to page content cache.
///
/// Values are whatever the last writer stored: raw fetched text for pages
/// and assets, inlined markup once a page has been prefetched. Cloning is
/// cheap and clones share the underlying store.
#[derive(Clone)]
pub struct PersistentCache {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for PersistentCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentCache").finish_non_exhaustive()
    }
}

impl PersistentCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Store `content` under `url`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// `Error::Type` when `content` is not valid UTF-8 text. Nothing is
    /// written in that case.
    pub async fn set(&self, url: &str, content: impl AsRef<[u8]>) -> Result<(), Error> {
        let bytes = content.as_ref();
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::Type(format!("want string, got {} bytes of binary data ({e})", bytes.len())))?;
        self.set_text(url, text).await
    }

    /// Store already-validated text under `url`.
    pub async fn set_text(&self, url: &str, content: &str) -> Result<(), Error> {
        self.store.set_item(url, content).await
    }

    /// Stored content for `url`, or `None` if nothing was ever stored.
    pub async fn get(&self, url: &str) -> Result<Option<String>, Error> {
        self.store.get_item(url).await
    }

    /// Drop every entry.
    pub async fn clear(&self) -> Result<(), Error> {
        self.store.clear().await
    }

    pub async fn len(&self) -> Result<usize, Error> {
        self.store.count().await
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }
}
