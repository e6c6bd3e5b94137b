use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Fragments that disqualify a URL outright: auth pages, binary assets,
/// social networks. A posting never lives behind these.
const HARD_REJECTS: &[&str] = &[
    "login",
    "signin",
    "register",
    ".pdf",
    ".jpg",
    ".png",
    "facebook.com",
    "linkedin.com",
    "twitter.com",
    "instagram.com",
    "googleusercontent.com",
];

/// Fragments that usually mark listing or navigation pages rather than an
/// individual posting. A marker segment overrides them, because ATS sites
/// (Workday, Taleo) nest `/job/` and `/opp/` under paths like `/careers`.
const LISTING_HINTS: &[&str] = &[
    "/careers",
    "/jobs",
    "/jobboard",
    "/search",
    "/opportunities",
    "candidate/jobboard",
    "about",
    "contact",
    "privacy",
    "terms",
    "event",
];

/// A trailing run of five or more digits is an opaque requisition id.
static NUMERIC_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d{5,}(/|$)").expect("numeric id regex"));

/// Structural test for "does this URL point at one posting, not a listing".
///
/// Deliberately conservative: discarding a real posting costs one missed
/// row, while accepting a listing link pollutes the key space for every
/// later run.
pub fn is_likely_posting(url: &str, base: &Url, markers: &[String]) -> bool {
    let lower = url.to_ascii_lowercase();
    let base_lower = base.as_str().trim_end_matches('/').to_ascii_lowercase();

    // The target page itself is by definition a listing.
    if lower == base_lower {
        return false;
    }

    if HARD_REJECTS.iter().any(|hint| lower.contains(hint)) {
        return false;
    }

    let has_marker = has_marker_segment(&lower, markers);
    if !has_marker && LISTING_HINTS.iter().any(|hint| lower.contains(hint)) {
        return false;
    }

    has_marker || NUMERIC_ID_RE.is_match(&lower)
}

fn has_marker_segment(url: &str, markers: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    parsed.path_segments().is_some_and(|mut segments| {
        segments.any(|segment| markers.iter().any(|m| m.eq_ignore_ascii_case(segment)))
    })
}
