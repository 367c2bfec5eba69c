//! `KeyValueStore` implementation over the `entries` table.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

use super::connection::CacheDb;
use super::hash::compute_entry_key;
use super::store::KeyValueStore;
use crate::Error;

#[async_trait]
impl KeyValueStore for CacheDb {
    /// Upsert: a second write to the same key replaces value and timestamp.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let key_hash = compute_entry_key(key);
        let key = key.to_string();
        let value = value.to_string();
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (key_hash, key, value, stored_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(key_hash) DO UPDATE SET
                        value = excluded.value,
                        stored_at = excluded.stored_at",
                    params![key_hash, key, value, stored_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let key_hash = compute_entry_key(key);
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let value = conn
                    .query_row("SELECT value FROM entries WHERE key_hash = ?1", params![key_hash], |row| row.get(0))
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(Error::from)
    }

    async fn clear(&self) -> Result<(), Error> {
        self.conn
            .call(|conn| -> Result<(), Error> {
                let removed = conn.execute("DELETE FROM entries", [])?;
                tracing::debug!(removed, "cleared page store");
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn count(&self) -> Result<usize, Error> {
        self.conn
            .call(|conn| -> Result<usize, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(Error::from)
    }
}
