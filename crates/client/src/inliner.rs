//! Rewrites a fetched page so it no longer references external scripts or
//! stylesheets.
//!
//! Two passes over the markup with lol_html. The first records every
//! `script[src]` and `link[rel="stylesheet"][href]` in document order; the
//! assets are then fetched one after another through the coordinator; the
//! second pass applies the edits:
//!
//! - each script keeps its position, gains the fetched source as its text
//!   and loses `src`
//! - each stylesheet link is removed, its body appended (after a `\n`) to one
//!   `<style>` block that becomes the last child of `<head>`
//!
//! Everything else in the document passes through byte for byte, so running
//! the inliner on its own output changes nothing. For the same reason a page
//! without stylesheets gets no `<style>` block: an empty one added on every
//! pass would pile up.

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use url::Url;

use preture_core::Error;

use crate::coordinator::RequestCoordinator;
use crate::fetch::resolve;

const SCRIPT_SELECTOR: &str = "script[src]";
const STYLESHEET_SELECTOR: &str = r#"link[rel="stylesheet"][href]"#;

/// External references found in a document, in document order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssetRefs {
    pub scripts: Vec<String>,
    pub stylesheets: Vec<String>,
}

impl AssetRefs {
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.stylesheets.is_empty()
    }
}

/// Collect the raw `src`/`href` values the inliner would replace.
pub fn find_assets(html: &str) -> Result<AssetRefs, Error> {
    let mut scripts = Vec::new();
    let mut stylesheets = Vec::new();

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(SCRIPT_SELECTOR, |el| {
                    if let Some(src) = el.get_attribute("src") {
                        scripts.push(src);
                    }
                    Ok(())
                }),
                element!(STYLESHEET_SELECTOR, |el| {
                    if let Some(href) = el.get_attribute("href") {
                        stylesheets.push(href);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| Error::Rewrite(e.to_string()))?;

    Ok(AssetRefs { scripts, stylesheets })
}

/// Inlines scripts and stylesheets into fetched pages.
#[derive(Debug, Clone)]
pub struct AssetInliner {
    coordinator: RequestCoordinator,
}

impl AssetInliner {
    pub fn new(coordinator: RequestCoordinator) -> Self {
        Self { coordinator }
    }

    /// Produce a self-contained version of `html`.
    ///
    /// Relative asset references are resolved against `base`, the URL the
    /// page was fetched from.
    ///
    /// # Errors
    ///
    /// The first failing asset fetch is returned unchanged; nothing is
    /// cached for the page in that case. `Error::InvalidUrl` if a reference
    /// cannot be resolved.
    pub async fn inline(&self, html: &str, base: &Url) -> Result<String, Error> {
        let refs = find_assets(html)?;
        if refs.is_empty() {
            return Ok(html.to_string());
        }

        let mut script_bodies = Vec::with_capacity(refs.scripts.len());
        for src in &refs.scripts {
            let url = resolve(base, src).map_err(|e| Error::InvalidUrl(e.to_string()))?;
            tracing::debug!(%url, "prefetch script");
            script_bodies.push(self.coordinator.get(&url).await?);
        }

        let mut css = String::new();
        for href in &refs.stylesheets {
            let url = resolve(base, href).map_err(|e| Error::InvalidUrl(e.to_string()))?;
            tracing::debug!(%url, "prefetch stylesheet");
            css.push('\n');
            css.push_str(&self.coordinator.get(&url).await?);
        }

        let style = (!refs.stylesheets.is_empty()).then(|| format!("<style>{css}</style>"));
        apply(html, script_bodies, style.as_deref())
    }
}

fn apply(html: &str, script_bodies: Vec<String>, style: Option<&str>) -> Result<String, Error> {
    let mut bodies = script_bodies.into_iter();

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(SCRIPT_SELECTOR, |el| {
                    if let Some(body) = bodies.next() {
                        el.set_inner_content(&body, ContentType::Html);
                        el.remove_attribute("src");
                    }
                    Ok(())
                }),
                element!(STYLESHEET_SELECTOR, |el| {
                    el.remove();
                    Ok(())
                }),
                element!("head", |el| {
                    if let Some(style) = style {
                        el.append(style, ContentType::Html);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| Error::Rewrite(e.to_string()))?;

    // No <head>, or one without an end tag: lol_html had nowhere to append.
    match style {
        Some(style) if !output.contains(style) => Ok(format!("{style}{output}")),
        _ => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchClient, FetchConfig};
    use preture_core::{MemoryStore, PersistentCache};
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn inliner() -> AssetInliner {
        let cache = PersistentCache::new(Arc::new(MemoryStore::new()));
        let fetcher = FetchClient::new(FetchConfig::default()).unwrap();
        AssetInliner::new(RequestCoordinator::new(cache, Arc::new(fetcher)))
    }

    async fn serve(server: &MockServer, p: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn base(server: &MockServer) -> Url {
        Url::parse(&format!("{}/docs/page.html", server.uri())).unwrap()
    }

    #[test]
    fn test_find_assets_document_order() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="/b.css">
            <script src="/one.js"></script>
            <link rel="icon" href="/favicon.ico">
            <link rel="stylesheet" href="a.css">
            </head><body><script src="two.js"></script><script>inline()</script></body></html>"#;

        let refs = find_assets(html).unwrap();
        assert_eq!(refs.scripts, vec!["/one.js", "two.js"]);
        assert_eq!(refs.stylesheets, vec!["/b.css", "a.css"]);
    }

    #[tokio::test]
    async fn test_inline_script() {
        let server = MockServer::start().await;
        serve(&server, "/a.js", "console.log(1)").await;

        let html = r#"<html><head></head><body><script src="/a.js"></script></body></html>"#;
        let out = inliner().inline(html, &base(&server)).await.unwrap();

        assert!(out.starts_with("<html><head></head><body>"));
        assert!(out.contains("<script>console.log(1)</script>"));
        assert!(!out.contains("src="));
    }

    #[tokio::test]
    async fn test_inline_scripts_in_document_order() {
        let server = MockServer::start().await;
        serve(&server, "/first.js", "first()").await;
        serve(&server, "/docs/second.js", "second()").await;

        let html = concat!(
            r#"<html><head><script src="/first.js"></script></head>"#,
            r#"<body><p>between</p><script id="late" src="second.js"></script></body></html>"#,
        );
        let out = inliner().inline(html, &base(&server)).await.unwrap();

        assert!(out.starts_with("<html><head><script>first()</script></head>"));
        assert!(out.contains(r#"<p>between</p><script id="late">second()</script></body>"#));

        let requested: Vec<String> = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect();
        assert_eq!(requested, vec!["/first.js", "/docs/second.js"]);
    }

    #[tokio::test]
    async fn test_inline_keeps_other_script_attributes() {
        let server = MockServer::start().await;
        serve(&server, "/docs/app.js", "run()").await;

        let html = r#"<html><head><script type="module" src="app.js" defer></script></head><body></body></html>"#;
        let out = inliner().inline(html, &base(&server)).await.unwrap();

        assert!(out.contains(r#"type="module""#));
        assert!(out.contains("defer"));
        assert!(out.contains(">run()</script>"));
        assert!(!out.contains("src="));
    }

    #[tokio::test]
    async fn test_inline_stylesheets_into_one_block() {
        let server = MockServer::start().await;
        serve(&server, "/first.css", "body{color:red}").await;
        serve(&server, "/docs/second.css", "p{margin:0}").await;

        let html = concat!(
            r#"<html><head><link rel="stylesheet" href="/first.css"><title>t</title>"#,
            r#"<link rel="stylesheet" href="second.css"></head><body></body></html>"#,
        );
        let out = inliner().inline(html, &base(&server)).await.unwrap();

        assert_eq!(
            out,
            "<html><head><title>t</title><style>\nbody{color:red}\np{margin:0}</style></head><body></body></html>"
        );
        assert_eq!(out.matches("<style>").count(), 1);
        assert!(!out.contains("<link"));
    }

    #[tokio::test]
    async fn test_inline_is_idempotent() {
        let server = MockServer::start().await;
        serve(&server, "/a.js", "let a = 1 < 2;").await;
        serve(&server, "/s.css", "a{}").await;

        let html = r#"<html><head><link rel="stylesheet" href="/s.css"></head><body><script src="/a.js"></script></body></html>"#;
        let inliner = inliner();
        let once = inliner.inline(html, &base(&server)).await.unwrap();
        let twice = inliner.inline(&once, &base(&server)).await.unwrap();

        assert_eq!(once, twice);
        assert!(find_assets(&once).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_assets_returns_input() {
        let html = "<html><head></head><body><p>plain</p></body></html>";
        let server = MockServer::start().await;
        let out = inliner().inline(html, &base(&server)).await.unwrap();
        assert_eq!(out, html);
    }

    #[tokio::test]
    async fn test_missing_head_gets_style_prepended() {
        let server = MockServer::start().await;
        serve(&server, "/s.css", "a{}").await;

        let html = r#"<link rel="stylesheet" href="/s.css"><p>fragment</p>"#;
        let out = inliner().inline(html, &base(&server)).await.unwrap();
        assert_eq!(out, "<style>\na{}</style><p>fragment</p>");
    }

    #[tokio::test]
    async fn test_asset_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.js"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let html = r#"<html><head></head><body><script src="/gone.js"></script></body></html>"#;
        let result = inliner().inline(html, &base(&server)).await;
        assert!(matches!(result, Err(Error::Fetch(ref e)) if e.status == Some(404)));
    }

    #[tokio::test]
    async fn test_unresolvable_reference() {
        let server = MockServer::start().await;
        let html = r#"<html><head></head><body><script src="data:text/javascript,1"></script></body></html>"#;
        let result = inliner().inline(html, &base(&server)).await;
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
