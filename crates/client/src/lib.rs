//! Fetching, deduplication and inlining for preture.
//!
//! This crate provides the network side of the page cache: the HTTP
//! fetcher, the single-flight request coordinator, the asset inliner and
//! the prefetcher, plus the markup queries the navigator relies on.

pub mod coordinator;
pub mod extract;
pub mod fetch;
pub mod inliner;
pub mod prefetch;

pub use coordinator::RequestCoordinator;
pub use extract::{Link, inline_scripts, same_site_links};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, Fetcher};
pub use inliner::{AssetInliner, AssetRefs, find_assets};
pub use prefetch::Prefetcher;
