//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod error;
pub mod log;

// Re-export main types for cleaner imports
pub use currency::{BaseCurrencyProvider, CurrencyCode, RateEntry, RateTable};
pub use error::{FetchError, ParseError, ProviderError, TableError};
