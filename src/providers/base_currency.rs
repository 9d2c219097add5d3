use crate::core::currency::{BaseCurrencyProvider, CurrencyCode};
use crate::core::error::ProviderError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Base currency fixed by configuration.
pub struct StaticBaseCurrency {
    code: CurrencyCode,
}

impl StaticBaseCurrency {
    pub fn new(code: CurrencyCode) -> Self {
        StaticBaseCurrency { code }
    }
}

#[async_trait]
impl BaseCurrencyProvider for StaticBaseCurrency {
    async fn currency_id(&self) -> Result<CurrencyCode, ProviderError> {
        Ok(self.code.clone())
    }
}

/// Base currency looked up from a remote endpoint that answers with the code as plain text.
pub struct RemoteBaseCurrency {
    url: String,
    client: reqwest::Client,
}

impl RemoteBaseCurrency {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent("exch-rates/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Lookup {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(RemoteBaseCurrency {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl BaseCurrencyProvider for RemoteBaseCurrency {
    #[instrument(name = "BaseCurrencyLookup", skip(self), fields(url = %self.url))]
    async fn currency_id(&self) -> Result<CurrencyCode, ProviderError> {
        let request_error = |source| ProviderError::Request {
            url: self.url.clone(),
            source,
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(ProviderError::Lookup {
                reason: format!("HTTP error: {} from {}", response.status(), self.url),
            });
        }

        let text = response.text().await.map_err(request_error)?;
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse {
                url: self.url.clone(),
            });
        }

        let code = CurrencyCode::new(&text);
        debug!(%code, "Resolved base currency");
        Ok(code)
    }
}
