//! CSV-backed persistence: the target URL list we read and the posting
//! record sink we rewrite.
//!
//! The sink carries exactly two columns, `JobLink` and `DateFound`. The
//! descriptive key is never persisted; it is recomputed from each stored
//! link when a run starts. Failures here are the only fatal errors in a
//! run.

mod csv;

use crate::pipeline::{Record, descriptive_key};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

pub const LINK_COLUMN: &str = "JobLink";
pub const DATE_COLUMN: &str = "DateFound";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// A row read back from the output file. The date stays a string so rows
/// written by earlier runs survive a rewrite byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub link: String,
    pub date_found: String,
}

/// The posting record sink.
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads existing rows. A missing file is an empty store, not an error;
    /// the first run creates it.
    pub fn load(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(StoreError::Read {
                    path: self.path.display().to_string(),
                    source: err,
                });
            }
        };

        let mut records = Vec::new();
        for (idx, row) in csv::parse_rows(&text).into_iter().enumerate() {
            let link = row.first().map(|c| c.trim()).unwrap_or_default();
            if link.is_empty() || (idx == 0 && link == LINK_COLUMN) {
                continue;
            }
            records.push(StoredRecord {
                link: link.to_string(),
                date_found: row.get(1).cloned().unwrap_or_default(),
            });
        }
        Ok(records)
    }

    /// Rewrites the sink as the union of existing rows and this run's new
    /// records, keeping the first row per descriptive key. Existing rows
    /// win, so a posting's `DateFound` never moves once written.
    ///
    /// Returns the number of data rows written.
    pub fn write_merged(
        &self,
        existing: &[StoredRecord],
        new_records: &[Record],
        markers: &[String],
    ) -> Result<usize, StoreError> {
        let mut seen = HashSet::new();
        let mut rows: Vec<(String, String)> = Vec::new();

        for record in existing {
            match descriptive_key(&record.link, markers) {
                Some(key) => {
                    if seen.insert(key.value) {
                        rows.push((record.link.clone(), record.date_found.clone()));
                    }
                }
                None => {
                    warn!(link = %record.link, "dropping stored row with unkeyable link");
                }
            }
        }

        for record in new_records {
            if seen.insert(record.key.clone()) {
                rows.push((
                    record.link.clone(),
                    record.first_seen.format(DATE_FORMAT).to_string(),
                ));
            }
        }

        let write_err = |source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        };

        let file = File::create(&self.path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        csv::write_row(&mut writer, &[LINK_COLUMN, DATE_COLUMN]).map_err(write_err)?;
        for (link, date) in &rows {
            csv::write_row(&mut writer, &[link.as_str(), date.as_str()]).map_err(write_err)?;
        }
        writer.flush().map_err(write_err)?;

        Ok(rows.len())
    }
}

/// Recomputes the seen-key set from previously persisted rows.
pub fn seen_keys(records: &[StoredRecord], markers: &[String]) -> HashSet<String> {
    records
        .iter()
        .filter_map(|record| descriptive_key(&record.link, markers))
        .map(|key| key.value)
        .collect()
}

/// Reads the target URL list: first column, one URL per row. Rows whose
/// first cell is not an http(s) URL (headers, notes, blanks) are skipped.
pub fn load_targets(path: &str) -> Result<Vec<String>, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_string(),
        source,
    })?;

    let mut targets = Vec::new();
    for row in csv::parse_rows(&text) {
        let cell = row.first().map(|c| c.trim()).unwrap_or_default();
        if cell.starts_with("http://") || cell.starts_with("https://") {
            targets.push(cell.to_string());
        } else if !cell.is_empty() {
            debug!(cell, "skipping non-URL row in target list");
        }
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn markers() -> Vec<String> {
        vec!["opp".to_string(), "job".to_string()]
    }

    fn record(link: &str, key: &str) -> Record {
        Record {
            link: link.to_string(),
            key: key.to_string(),
            first_seen: Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap(),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("absent.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn write_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("found.csv"));

        let written = store
            .write_merged(&[], &[record("https://x.com/opp/1/eng", "x.com::opp/1/eng")], &markers())
            .unwrap();
        assert_eq!(written, 1);

        let loaded = store.load().unwrap();
        assert_eq!(
            loaded,
            vec![StoredRecord {
                link: "https://x.com/opp/1/eng".to_string(),
                date_found: "2025-03-04 05:06:07".to_string(),
            }]
        );
    }

    #[test]
    fn existing_rows_win_over_new_ones() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("found.csv"));

        let existing = vec![StoredRecord {
            link: "https://x.com/opp/1/eng".to_string(),
            date_found: "2024-01-01 00:00:00".to_string(),
        }];
        // Same key rediscovered via a www link; must not produce a second
        // row or move the date.
        store
            .write_merged(
                &existing,
                &[
                    record("https://www.x.com/opp/1/eng", "x.com::opp/1/eng"),
                    record("https://x.com/opp/2/qa", "x.com::opp/2/qa"),
                ],
                &markers(),
            )
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].link, "https://x.com/opp/1/eng");
        assert_eq!(loaded[0].date_found, "2024-01-01 00:00:00");
    }

    #[test]
    fn output_never_contains_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("found.csv");
        let store = RecordStore::new(&path);

        store
            .write_merged(&[], &[record("https://x.com/opp/1/eng", "x.com::opp/1/eng")], &markers())
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("::"), "key leaked into output: {text}");
        assert_eq!(text.lines().next(), Some("JobLink,DateFound"));
        for row in csv::parse_rows(&text) {
            assert_eq!(row.len(), 2);
        }
    }

    #[test]
    fn target_list_keeps_only_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.csv");
        fs::write(
            &path,
            "TargetURL\nhttps://acme.com/careers,acme\n\nnot-a-url\nhttp://beta.test/jobs\n",
        )
        .unwrap();

        let targets = load_targets(path.to_str().unwrap()).unwrap();
        assert_eq!(targets, vec!["https://acme.com/careers", "http://beta.test/jobs"]);
    }

    #[test]
    fn missing_target_list_is_fatal() {
        let err = load_targets("/definitely/absent/sites.csv").unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }
}
