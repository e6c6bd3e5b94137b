use std::collections::HashSet;

/// Decides whether a candidate posting's inferred location is acceptable.
///
/// Matching is case-insensitive over the URL plus cleaned anchor text, in
/// three ordered steps:
///
/// 1. any allow keyword matches - keep (allow overrides deny);
/// 2. else any deny keyword matches - drop;
/// 3. else keep. Absence of evidence is not evidence of exclusion.
///
/// Keyword hits respect token boundaries so `la` cannot fire inside
/// `atlanta`. Deny entries that start with `/` are locale path prefixes
/// (`/fr-fr`) and match as plain substrings of the URL instead.
///
/// Both keyword sets are expected to be lower-case already.
pub fn is_location_allowed(
    url: &str,
    anchor_text: &str,
    allow: &HashSet<String>,
    deny: &HashSet<String>,
) -> bool {
    let haystack = build_haystack(url, anchor_text);

    if allow.iter().any(|kw| keyword_hit(&haystack, kw)) {
        return true;
    }

    let url_lower = url.to_lowercase();
    let denied = deny.iter().any(|kw| {
        if kw.starts_with('/') {
            url_lower.contains(kw.as_str())
        } else {
            keyword_hit(&haystack, kw)
        }
    });

    !denied
}

/// URL plus anchor text, lower-cased, with list punctuation in the text
/// turned into spaces so "Paris, France" splits into matchable tokens.
fn build_haystack(url: &str, anchor_text: &str) -> String {
    let mut haystack = url.to_lowercase();
    if !anchor_text.is_empty() {
        haystack.push(' ');
        for ch in anchor_text.to_lowercase().chars() {
            match ch {
                ',' | '(' | ')' | '/' | '|' => haystack.push(' '),
                _ => haystack.push(ch),
            }
        }
    }
    haystack
}

/// Substring search that only counts matches flanked by non-alphanumerics.
fn keyword_hit(haystack: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }
    for (idx, matched) in haystack.match_indices(keyword) {
        let before_ok = haystack[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[idx + matched.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
    }
    false
}
