use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// A link that survived normalization, classification, and the location
/// filter, paired with its descriptive key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub link: String,
    pub key: String,
}

/// A newly discovered posting. Created once per first-seen key and immutable
/// afterwards; later sightings of the same key never touch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub link: String,
    pub key: String,
    pub first_seen: DateTime<Utc>,
}

/// Folds one page's candidates into the run's seen-key set.
///
/// Single pass in arrival order: a candidate whose key is already in `seen`
/// is dropped; otherwise a record is emitted and the key inserted
/// immediately, so a duplicate later on the same page (or on a later page,
/// since the scanner threads one set through the whole run) is caught.
///
/// `seen` only ever grows, and the returned records carry pairwise distinct
/// keys.
pub fn accumulate<I>(candidates: I, seen: &mut HashSet<String>, now: DateTime<Utc>) -> Vec<Record>
where
    I: IntoIterator<Item = Candidate>,
{
    let mut fresh = Vec::new();
    for candidate in candidates {
        if seen.contains(&candidate.key) {
            continue;
        }
        seen.insert(candidate.key.clone());
        fresh.push(Record {
            link: candidate.link,
            key: candidate.key,
            first_seen: now,
        });
    }
    fresh
}
