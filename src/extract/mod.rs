//! Anchor harvesting from rendered HTML.

use scraper::{Html, Selector};

/// One `<a href>` as it appeared on the page. Ephemeral; consumed within a
/// single target's processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAnchor {
    pub href: String,
    pub text: String,
}

/// Collects every anchor with a non-empty `href`, in document order.
/// Anchor text is whitespace-collapsed so it can feed keyword matching.
pub fn anchors(html: &str) -> Vec<RawAnchor> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("anchor selector");

    document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let text = collapse_whitespace(&element.text().collect::<String>());
            Some(RawAnchor {
                href: href.to_string(),
                text,
            })
        })
        .collect()
}

fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim_end().to_string()
}
