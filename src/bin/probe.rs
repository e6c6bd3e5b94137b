//! Diagnostic tool: run the pipeline against one career page and print each
//! surviving candidate as a JSON line, without touching the record store.
//! Handy for tuning keyword lists against a new board.

use anyhow::{Context, Result, bail};
use jobscout::{
    config::Config,
    extract,
    fetcher::{HttpFetcher, PageFetcher},
    pipeline::{Candidate, classify, descriptive_key, location, normalize},
};
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(target) = std::env::args().nth(1) else {
        bail!("usage: probe <career-page-url>");
    };

    let config = Config::from_env()?;
    let base = Url::parse(&target).context("target is not a valid URL")?;
    let rules = config.rules();

    let fetcher = HttpFetcher::new(
        config.fetch_timeout(),
        config.render_endpoint().map(str::to_owned),
    );
    let html = fetcher
        .rendered_html(&target)
        .await
        .context("failed to fetch target page")?;

    for anchor in extract::anchors(&html) {
        let Some(link) = normalize::normalize(&anchor.href, &base) else {
            continue;
        };
        if !classify::is_likely_posting(&link, &base, &rules.markers) {
            continue;
        }
        if !location::is_location_allowed(
            &link,
            &anchor.text,
            &rules.allow_locations,
            &rules.deny_locations,
        ) {
            continue;
        }
        let Some(key) = descriptive_key(&link, &rules.markers) else {
            continue;
        };
        let candidate = Candidate {
            link,
            key: key.value,
        };
        println!("{}", serde_json::to_string(&candidate)?);
    }

    Ok(())
}
