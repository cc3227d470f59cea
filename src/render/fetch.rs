//! Remote image acquisition.
//!
//! The normalizer only needs bytes for a URL; [`ImageFetcher`] keeps it
//! independent of the HTTP stack so tests can swap in canned responses.

use async_trait::async_trait;
use std::time::Duration;

use super::preprocess::PreprocessError;
use crate::error::InkslipError;

/// Upper bound on a single image download.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of remote image bytes.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download `url`. Non-2xx responses and network failures are errors.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, PreprocessError>;
}

/// [`ImageFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, InkslipError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("inkslip/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| InkslipError::ImageUnavailable(format!("HTTP client error: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, PreprocessError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PreprocessError::Fetch(format!("failed to download {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(PreprocessError::Fetch(format!(
                "failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PreprocessError::Fetch(format!("failed to read image data: {}", e)))?;

        Ok(bytes.to_vec())
    }
}
