//! Host key-value storage capability.

use async_trait::async_trait;

use crate::Error;

/// Durable string key-value storage.
///
/// Mirrors the host storage contract: `set_item` overwrites, `get_item`
/// returns `None` for keys never stored, `clear` wipes everything.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Associate `key` with `value`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Fetch the value stored under `key`.
    async fn get_item(&self, key: &str) -> Result<Option<String>, Error>;

    /// Remove every entry.
    async fn clear(&self) -> Result<(), Error>;

    /// Number of stored entries.
    async fn count(&self) -> Result<usize, Error>;
}
