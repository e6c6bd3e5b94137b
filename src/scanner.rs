//! Sequences the pipeline over each target URL.
//!
//! Targets are processed strictly one after another: the seen-key update
//! from target *i* must be visible to target *i+1*, because two career
//! pages can surface the same cross-posted listing and the run must emit it
//! once. Nothing here retries; a failed target is reported and skipped with
//! the seen set carried forward unchanged.

use crate::extract::{self, RawAnchor};
use crate::fetcher::PageFetcher;
use crate::pipeline::{Candidate, Record, ScanRules, accumulate, classify, descriptive_key, location, normalize};
use chrono::Utc;
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use url::Url;

/// Tallies for the run summary log line.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub new_records: Vec<Record>,
    pub targets_scanned: usize,
    pub targets_failed: usize,
    pub anchors_seen: usize,
}

pub struct Scanner<F> {
    fetcher: F,
    rules: ScanRules,
    pause: Duration,
}

impl<F: PageFetcher> Scanner<F> {
    pub fn new(fetcher: F, rules: ScanRules, pause: Duration) -> Self {
        Self {
            fetcher,
            rules,
            pause,
        }
    }

    /// Scans every target in order, threading `seen` through the whole run.
    ///
    /// Cancellation is observed between targets only, so an aborted run is
    /// still consistent as of the last fully-accumulated target.
    pub async fn run(
        &self,
        targets: &[String],
        seen: &mut HashSet<String>,
        cancel: &CancellationToken,
    ) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        for (idx, target) in targets.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(
                    scanned = outcome.targets_scanned,
                    remaining = targets.len() - idx,
                    "cancellation requested, stopping"
                );
                break;
            }
            if idx > 0 && !self.pause.is_zero() {
                sleep(jittered(self.pause)).await;
            }

            self.scan_target(target, seen, &mut outcome)
                .instrument(info_span!("target", url = %target))
                .await;
        }

        outcome
    }

    async fn scan_target(
        &self,
        target: &str,
        seen: &mut HashSet<String>,
        outcome: &mut ScanOutcome,
    ) {
        let base = match Url::parse(target) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                warn!("skipping target that is not a valid http(s) URL");
                outcome.targets_failed += 1;
                return;
            }
        };

        let html = match self.fetcher.rendered_html(target).await {
            Ok(html) => html,
            Err(err) => {
                warn!(error = %err, retriable = err.should_retry(), "fetch failed, skipping target");
                outcome.targets_failed += 1;
                return;
            }
        };

        let anchors = extract::anchors(&html);
        outcome.anchors_seen += anchors.len();
        let candidates = self.candidates(&base, anchors);
        let fresh = accumulate(candidates, seen, Utc::now());

        info!(new = fresh.len(), "target scanned");
        for record in &fresh {
            debug!(link = %record.link, key = %record.key, "new posting");
        }

        outcome.new_records.extend(fresh);
        outcome.targets_scanned += 1;
    }

    fn candidates(&self, base: &Url, anchors: Vec<RawAnchor>) -> Vec<Candidate> {
        let anchor_count = anchors.len();
        let mut kept = Vec::new();
        for anchor in anchors {
            let Some(link) = normalize::normalize(&anchor.href, base) else {
                continue;
            };
            if !classify::is_likely_posting(&link, base, &self.rules.markers) {
                continue;
            }
            if !location::is_location_allowed(
                &link,
                &anchor.text,
                &self.rules.allow_locations,
                &self.rules.deny_locations,
            ) {
                debug!(link = %link, "filtered by location");
                continue;
            }
            // Normalized links always parse, so a key always comes back.
            let Some(key) = descriptive_key(&link, &self.rules.markers) else {
                continue;
            };
            if !key.from_marker {
                warn!(link = %link, "no marker segment in path, keying on full path");
            }
            kept.push(Candidate {
                link,
                key: key.value,
            });
        }
        info!(anchors = anchor_count, candidates = kept.len(), "page processed");
        kept
    }
}

/// The configured pause with +-30% jitter, so a fleet of runs does not hit
/// every board on the same cadence.
fn jittered(base: Duration) -> Duration {
    let factor = rand::thread_rng().gen_range(0.7..1.3);
    Duration::from_millis((base.as_millis() as f64 * factor).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn rendered_html(&self, url: &str) -> Result<String, FetchError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Dns("no such host".to_string()))
        }
    }

    fn rules() -> ScanRules {
        ScanRules {
            allow_locations: ["hong kong".to_string()].into(),
            deny_locations: ["paris".to_string()].into(),
            markers: vec!["opp".to_string(), "job".to_string()],
        }
    }

    fn scanner(pages: &[(&str, &str)]) -> Scanner<StubFetcher> {
        let pages = pages
            .iter()
            .map(|(url, html)| (url.to_string(), html.to_string()))
            .collect();
        Scanner::new(StubFetcher { pages }, rules(), Duration::ZERO)
    }

    #[tokio::test]
    async fn discovers_and_filters_postings() {
        let scanner = scanner(&[(
            "https://acme.com/careers",
            r#"<a href="/opp/xf-1/engineer?ref=1">Engineer (Hong Kong)</a>
               <a href="/opp/xf-2/designer">Designer (Paris)</a>
               <a href="/about">About us</a>
               <a href="mailto:hr@acme.com">Mail</a>"#,
        )]);

        let mut seen = HashSet::new();
        let outcome = scanner
            .run(
                &["https://acme.com/careers".to_string()],
                &mut seen,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome.targets_scanned, 1);
        assert_eq!(outcome.new_records.len(), 1);
        assert_eq!(outcome.new_records[0].link, "https://acme.com/opp/xf-1/engineer");
        assert_eq!(outcome.new_records[0].key, "acme.com::opp/xf-1/engineer");
        assert!(seen.contains("acme.com::opp/xf-1/engineer"));
    }

    #[tokio::test]
    async fn cross_page_duplicates_emit_one_record() {
        let shared = r#"<a href="https://acme.com/opp/xf-7/analyst">Analyst (Hong Kong)</a>"#;
        let scanner = scanner(&[
            ("https://acme.com/careers", shared),
            ("https://agg.example.com/finance", shared),
        ]);

        let mut seen = HashSet::new();
        let outcome = scanner
            .run(
                &[
                    "https://acme.com/careers".to_string(),
                    "https://agg.example.com/finance".to_string(),
                ],
                &mut seen,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome.targets_scanned, 2);
        assert_eq!(outcome.new_records.len(), 1);
    }

    #[tokio::test]
    async fn failed_target_is_skipped_and_the_run_continues() {
        let scanner = scanner(&[(
            "https://beta.test/careers",
            r#"<a href="/job/42/trader">Trader (Hong Kong)</a>"#,
        )]);

        let mut seen = HashSet::new();
        let outcome = scanner
            .run(
                &[
                    "https://unreachable.test/careers".to_string(),
                    "not a url".to_string(),
                    "https://beta.test/careers".to_string(),
                ],
                &mut seen,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome.targets_failed, 2);
        assert_eq!(outcome.targets_scanned, 1);
        assert_eq!(outcome.new_records.len(), 1);
    }

    #[tokio::test]
    async fn prior_seen_keys_suppress_records() {
        let scanner = scanner(&[(
            "https://acme.com/careers",
            r#"<a href="/opp/xf-1/engineer">Engineer (Hong Kong)</a>"#,
        )]);

        let mut seen: HashSet<String> = ["acme.com::opp/xf-1/engineer".to_string()].into();
        let outcome = scanner
            .run(
                &["https://acme.com/careers".to_string()],
                &mut seen,
                &CancellationToken::new(),
            )
            .await;

        assert!(outcome.new_records.is_empty());
        assert_eq!(outcome.targets_scanned, 1);
    }

    #[tokio::test]
    async fn cancellation_stops_before_the_next_target() {
        let scanner = scanner(&[(
            "https://acme.com/careers",
            r#"<a href="/opp/xf-1/engineer">Engineer (Hong Kong)</a>"#,
        )]);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut seen = HashSet::new();
        let outcome = scanner
            .run(&["https://acme.com/careers".to_string()], &mut seen, &cancel)
            .await;

        assert_eq!(outcome.targets_scanned, 0);
        assert!(outcome.new_records.is_empty());
        assert!(seen.is_empty());
    }
}
