//! Same-site link discovery.

use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use crate::fetch::{resolve, same_host};

static ANCHOR: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("a[href]").ok());

/// An anchor pointing at another page of the same site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link text content
    pub text: String,
    /// Canonical absolute URL (fragment removed)
    pub href: Url,
}

/// Anchors in `html` whose host is exactly the host of `page`.
///
/// Relative hrefs are resolved against `page`. Non-http(s) hrefs, unparsable
/// hrefs and subdomains are skipped. Duplicates (after canonicalization)
/// keep their first occurrence.
pub fn same_site_links(html: &str, page: &Url) -> Vec<Link> {
    let Some(selector) = ANCHOR.as_ref() else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let resolved = match resolve(page, href) {
            Ok(u) => u,
            Err(e) => {
                tracing::trace!(href, error = %e, "skipping link");
                continue;
            }
        };

        if !same_host(page, &resolved) || !seen.insert(resolved.to_string()) {
            continue;
        }

        let text = element.text().collect::<Vec<_>>().join(" ").trim().to_string();
        links.push(Link { text, href: resolved });
    }

    links
}
