//! HTTP feed source backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use photofeed_types::{FeedError, PageRequest, PhotoRecord};

use super::FeedSource;

/// The public Picsum list endpoint.
pub const DEFAULT_BASE_URL: &str = "https://picsum.photos/v2/list";

/// Bodies larger than this are rejected rather than decoded.
const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`FeedSource`] over HTTP.
///
/// Pages are requested as `?page=N&limit=S` query parameters and the
/// response body is a JSON array of photo records.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFeedSource {
    /// Create a source against the default public endpoint.
    pub fn new() -> Result<Self, FeedError> {
        let base_url = DEFAULT_BASE_URL
            .parse()
            .map_err(|e| FeedError::InvalidRequest(format!("bad base url: {e}")))?;
        Self::with_base_url(base_url)
    }

    /// Create a source against a custom endpoint.
    pub fn with_base_url(base_url: Url) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FeedError::Unknown(format!("http client: {e}")))?;
        Ok(Self { client, base_url })
    }

    fn page_url(&self, request: PageRequest) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &request.page().to_string())
            .append_pair("limit", &request.per_page().to_string());
        url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<PhotoRecord>, FeedError> {
        let url = self.page_url(request);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unknown server error")
                    .to_string(),
            });
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        if body.len() > MAX_RESPONSE_BYTES {
            return Err(FeedError::Http {
                status: 413,
                message: "response too large".to_string(),
            });
        }

        serde_json::from_slice(&body).map_err(|e| FeedError::Decode(e.to_string()))
    }
}

fn map_transport_error(error: reqwest::Error) -> FeedError {
    if error.is_timeout() || error.is_connect() || error.is_request() {
        FeedError::Network(error.to_string())
    } else {
        FeedError::Unknown(error.to_string())
    }
}
