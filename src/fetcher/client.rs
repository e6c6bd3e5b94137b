use crate::fetcher::{PageFetcher, errors::FetchError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str = "JobscoutBot/0.1 (career-page link scout)";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers({
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                    .parse()
                    .unwrap(),
            );
            headers
        })
        .build()
        .expect("Failed to build HTTP client")
});

/// Fetches career pages over plain HTTP, or through a Browserless-style
/// `/content` endpoint when one is configured. The render path matters for
/// boards that only materialize their posting list from JavaScript.
pub struct HttpFetcher {
    timeout: Duration,
    render_endpoint: Option<String>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, render_endpoint: Option<String>) -> Self {
        Self {
            timeout,
            render_endpoint,
        }
    }

    async fn fetch_direct(&self, url: &str) -> Result<String, FetchError> {
        let parsed_url = url::Url::parse(url)?;

        let response = HTTP_CLIENT
            .get(parsed_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status,
                retriable: status.is_server_error(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;

        if body.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body.len() as u64));
        }

        Ok(body)
    }

    /// Ask the rendering service for the page after dynamic content settles.
    async fn fetch_rendered(&self, endpoint: &str, url: &str) -> Result<String, FetchError> {
        let body = serde_json::json!({ "url": url });

        let response = HTTP_CLIENT
            .post(format!("{endpoint}/content"))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Render(format!("status {status}: {message}")));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn rendered_html(&self, url: &str) -> Result<String, FetchError> {
        let html = match &self.render_endpoint {
            Some(endpoint) => self.fetch_rendered(endpoint, url).await?,
            None => self.fetch_direct(url).await?,
        };
        debug!(bytes = html.len(), "page fetched");
        Ok(html)
    }
}
