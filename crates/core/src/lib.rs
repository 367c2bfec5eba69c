//! Core types and shared functionality for preture.
//!
//! This crate provides:
//! - The page cache and its key-value store backends (SQLite, in-memory)
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, KeyValueStore, MemoryStore, PersistentCache};
pub use config::{AppConfig, ConfigError};
pub use error::{Error, FetchError};
