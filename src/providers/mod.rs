pub mod base_currency;
pub mod nbp;

// Re-export traits so callers can depend on the capability, not the provider
pub use crate::core::currency::BaseCurrencyProvider;
pub use nbp::RateTableFetcher;
