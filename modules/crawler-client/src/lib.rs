pub mod error;

pub use error::{CrawlerError, Result};

use serde::Deserialize;
use std::time::Duration;

/// Client for the content-crawling service: takes a URL, returns the page
/// rendered to markdown. The service absorbs headless-browser concerns;
/// this client is just the wire call.
pub struct CrawlerClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
}

#[derive(Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
}

impl CrawlerClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(String::from),
        }
    }

    /// Fetch a URL rendered to markdown via the service's /v1/scrape endpoint.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let endpoint = format!("{}/v1/scrape", self.base_url);

        let body = serde_json::json!({
            "url": url,
            "formats": ["markdown"],
        });

        let mut request = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CrawlerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ScrapeResponse = resp.json().await?;
        match parsed.data.and_then(|d| d.markdown) {
            Some(markdown) if parsed.success && !markdown.trim().is_empty() => Ok(markdown),
            _ => Err(CrawlerError::EmptyContent(url.to_string())),
        }
    }
}
