//! Read-only queries over page markup.
//!
//! - `links`: same-site anchors the navigator intercepts and prefetches
//! - `scripts`: inline script bodies to execute after a document swap

pub mod links;
pub mod scripts;

pub use links::{Link, same_site_links};
pub use scripts::inline_scripts;
