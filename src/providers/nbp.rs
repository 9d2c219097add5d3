use crate::core::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Retrieves the raw rate table document.
#[async_trait]
pub trait RateTableFetcher: Send + Sync {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError>;
}

// NbpTableFetcher implementation for RateTableFetcher
pub struct NbpTableFetcher {
    url: String,
    client: reqwest::Client,
}

impl NbpTableFetcher {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent("exch-rates/0.1")
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(NbpTableFetcher {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RateTableFetcher for NbpTableFetcher {
    #[instrument(name = "NbpTableFetch", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        debug!("Requesting rate table from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: response.status(),
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Body {
            url: self.url.clone(),
            source,
        })?;
        debug!(bytes = body.len(), "Received rate table");
        Ok(body.to_vec())
    }
}
