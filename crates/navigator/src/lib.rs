//! In-page navigation for preture.
//!
//! The navigator intercepts same-site links, prefetches their targets into
//! the page cache, and on click swaps the document in place instead of
//! letting the browser reload. Everything the browser owns (the live DOM,
//! history, script evaluation) is reached through the `Page` trait.

pub mod context;
pub mod host;
pub mod navigator;
pub mod telemetry;

pub use context::PageContext;
pub use host::Page;
pub use navigator::Navigator;
