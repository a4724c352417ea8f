use std::error::Error as StdError;
use std::future::Future;

use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; WeatherAggregator/1.0; +https://github.com/your-repo)";

/// Retrieves the HTML of one forecast page. One attempt per call.
pub trait PageFetcher: Send + Sync + 'static {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String, PageFetchError>> + Send;
}

#[derive(Debug, Error)]
pub enum PageFetchError {
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("invalid request: {0}")]
    Request(#[source] reqwest::Error),
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("connection failed: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(user_agent: &str) -> Result<Self, PageFetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store"),
        );
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(PageFetchError::Build)?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, PageFetchError> {
        let response = self.client.get(url).send().await.map_err(|error| {
            if error.is_builder() {
                PageFetchError::Request(error)
            } else {
                PageFetchError::Transport(Box::new(error))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageFetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        response.text().await.map_err(PageFetchError::Body)
    }
}
