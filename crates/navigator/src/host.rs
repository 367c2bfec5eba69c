//! Capabilities the navigator needs from the host page.

use preture_client::Link;
use preture_core::Error;
use url::Url;

/// The live document and its browsing context.
///
/// Implemented by whatever embeds preture: a wasm binding over the real DOM,
/// a webview bridge, or a recording fake in tests.
pub trait Page: Send + Sync {
    /// URL of the document currently shown.
    fn location(&self) -> Url;

    /// Serialized markup of the current document.
    fn document_html(&self) -> String;

    /// Route clicks on anchors pointing at `link` to `Navigator::route`
    /// and suppress the default navigation.
    fn intercept(&self, link: &Link);

    /// Replace the document's root element with `html`.
    fn replace_document(&self, html: &str);

    /// Push `url` onto session history without reloading.
    fn push_state(&self, url: &Url);

    /// Evaluate script source in the page's global scope.
    ///
    /// Return `Error::Script` when evaluation throws.
    fn eval_script(&self, source: &str) -> Result<(), Error>;
}
