//! Currency abstractions and core types

use crate::core::error::ProviderError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

/// Currency identifier such as `USD` or `PLN`.
///
/// Codes compare case-insensitively: the value is stored upper-cased, so
/// `"usd"` and `"USD"` are the same key. Codes are not validated against ISO 4217.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Self {
        CurrencyCode(code.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive match against raw document text.
    pub fn matches(&self, text: &str) -> bool {
        self.0.eq_ignore_ascii_case(text.trim())
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CurrencyCode::new(s))
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        CurrencyCode::new(&code)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Mean rate of one currency, quoted in the table's local currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateEntry {
    pub code: CurrencyCode,
    pub rate: Decimal,
}

/// Rates extracted from a single table snapshot for at most two requested codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    entries: HashMap<CurrencyCode, RateEntry>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: CurrencyCode, rate: Decimal) {
        self.entries.insert(code.clone(), RateEntry { code, rate });
    }

    pub fn get(&self, code: &CurrencyCode) -> Option<&RateEntry> {
        self.entries.get(code)
    }

    pub fn rate(&self, code: &CurrencyCode) -> Option<Decimal> {
        self.get(code).map(|entry| entry.rate)
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.entries.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.entries.keys()
    }
}

/// Supplies the base currency the ratio is expressed against.
#[async_trait]
pub trait BaseCurrencyProvider: Send + Sync {
    async fn currency_id(&self) -> Result<CurrencyCode, ProviderError>;
}
