use url::Url;

/// Canonicalizes a raw anchor reference into an absolute URL with no query
/// string, fragment, or trailing slash.
///
/// Returns `None` for hrefs that cannot name a fetchable page: empty
/// strings, fragment-only links, and `mailto:`/`tel:`/`javascript:`
/// pseudo-links, plus anything that resolves to a non-http(s) scheme.
///
/// Idempotent: feeding the output back in yields the same string.
pub fn normalize(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("mailto:") || lower.starts_with("tel:") || lower.starts_with("javascript:")
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_query(None);
    resolved.set_fragment(None);

    Some(resolved.to_string().trim_end_matches('/').to_string())
}
