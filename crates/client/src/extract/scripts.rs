//! Inline script bodies, for re-execution after a document swap.

use scraper::{Html, Selector};
use std::sync::LazyLock;

static SCRIPT: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("script:not([src])").ok());

/// Text of every script element without `src`, in document order.
///
/// Scripts whose text is only whitespace are skipped.
pub fn inline_scripts(html: &str) -> Vec<String> {
    let Some(selector) = SCRIPT.as_ref() else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(selector)
        .map(|el| el.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_scripts_in_order() {
        let html = r#"<html><head><script>first()</script><script src="/ext.js"></script></head>
            <body><script>if (1 < 2) { second() }</script><script>  </script></body></html>"#;

        assert_eq!(inline_scripts(html), vec!["first()", "if (1 < 2) { second() }"]);
    }

    #[test]
    fn test_inline_scripts_none() {
        assert!(inline_scripts("<p>text</p>").is_empty());
    }
}
