//! URL canonicalization so every component agrees on cache keys.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize an absolute URL string.
///
/// 1. Trim leading/trailing whitespace
/// 2. Require http or https
/// 3. Lowercase the host
/// 4. Remove fragment (#...), since it never reaches the server
/// 5. Keep query string intact
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    normalize(parsed)
}

/// Resolve `href` (relative or absolute) against `base` and canonicalize it.
///
/// This is how a document's `src`/`href` attributes become cache keys.
pub fn resolve(base: &url::Url, href: &str) -> Result<url::Url, UrlError> {
    let trimmed = href.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let joined = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(format!("{trimmed}: {e}")))?;
    normalize(joined)
}

/// Whether `link` points at the same host as `page`.
///
/// Exact hostname comparison: `blog.example.com` is a different site from
/// `example.com`.
pub fn same_host(page: &url::Url, link: &url::Url) -> bool {
    match (page.host_str(), link.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

fn normalize(mut parsed: url::Url) -> Result<url::Url, UrlError> {
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
