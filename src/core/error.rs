//! Error taxonomy for base currency lookup, rate table retrieval and parsing

use thiserror::Error;

/// Base currency lookup failed. The `Display` text is the diagnostic returned to callers.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Base currency lookup failed: {reason}")]
    Lookup { reason: String },

    #[error("Base currency lookup failed: request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Base currency lookup failed: empty response from {url}")]
    EmptyResponse { url: String },
}

/// Rate table could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request error for rate table {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} for rate table {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read rate table body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Rate table document is malformed or carries an unreadable rate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed rate table: {0}")]
    Xml(String),

    #[error("Malformed rate table: document ended inside an element")]
    Truncated,

    #[error("Malformed rate table: no root element")]
    NoRootElement,

    #[error("Invalid rate '{text}' for currency {code}")]
    InvalidRate { code: String, text: String },
}

/// Either half of the fetch-then-parse pipeline failed.
#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
