//! Durable URL to page content storage.
//!
//! - `KeyValueStore` models the host's string key-value storage
//! - `CacheDb` backs it with SQLite via tokio-rusqlite (WAL mode, migrations)
//! - `MemoryStore` keeps entries in a map for tests and throwaway pages
//! - `PersistentCache` is the typed page cache the rest of preture talks to
//!
//! There is no eviction, TTL or size bound. Entries only disappear on `clear`.

pub mod connection;
pub mod entries;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod page;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use memory::MemoryStore;
pub use page::PersistentCache;
pub use store::KeyValueStore;
