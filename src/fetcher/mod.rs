pub mod client;
pub mod errors;

pub use client::HttpFetcher;
pub use errors::FetchError;

use async_trait::async_trait;

/// Capability that turns a target URL into fully-rendered HTML.
///
/// The scanner only depends on this trait, so tests can substitute canned
/// pages and deployments can swap the plain HTTP fetcher for a headless
/// browser service without touching the pipeline.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn rendered_html(&self, url: &str) -> Result<String, FetchError>;
}
