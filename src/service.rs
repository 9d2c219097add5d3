//! Per-request pipeline: base currency lookup, table fetch, parse, ratio.

use crate::core::currency::{BaseCurrencyProvider, CurrencyCode, RateTable};
use crate::core::error::{ProviderError, TableError};
use crate::providers::nbp::RateTableFetcher;
use crate::rates::{RateTableParser, format_ratio, rate_ratio, round_significant};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Terminal state of one rate query.
#[derive(Debug)]
pub enum RateOutcome {
    /// Both rates found; holds the rounded ratio.
    Ratio(Decimal),
    /// One or both rates are not in the table.
    Missing,
    /// The table could not be fetched or parsed.
    TableUnavailable(TableError),
    /// The base currency could not be determined; no table was fetched.
    ProviderFailed(ProviderError),
}

impl RateOutcome {
    /// Response body text. Only a ratio or a provider diagnostic produce content.
    pub fn body(&self) -> String {
        match self {
            RateOutcome::Ratio(ratio) => format_ratio(*ratio),
            RateOutcome::Missing | RateOutcome::TableUnavailable(_) => String::new(),
            RateOutcome::ProviderFailed(e) => e.to_string(),
        }
    }
}

pub struct RateQueryService {
    base_currency: Arc<dyn BaseCurrencyProvider>,
    fetcher: Arc<dyn RateTableFetcher>,
    parser: RateTableParser,
}

impl RateQueryService {
    pub fn new(
        base_currency: Arc<dyn BaseCurrencyProvider>,
        fetcher: Arc<dyn RateTableFetcher>,
        parser: RateTableParser,
    ) -> Self {
        RateQueryService {
            base_currency,
            fetcher,
            parser,
        }
    }

    /// Fetches a fresh table and extracts the rates of `base` and `target`.
    pub async fn find_rates(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<RateTable, TableError> {
        let document = self.fetcher.fetch().await?;
        Ok(self.parser.parse(document.as_slice(), base, target)?)
    }

    #[instrument(name = "RateQuery", skip(self, target), fields(target = %target))]
    pub async fn query(&self, target: &CurrencyCode) -> RateOutcome {
        let base = match self.base_currency.currency_id().await {
            Ok(code) => code,
            Err(e) => {
                warn!(error = %e, "Base currency lookup failed");
                return RateOutcome::ProviderFailed(e);
            }
        };
        debug!(%base, "Using base currency");

        let table = match self.find_rates(&base, target).await {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "Rate table unavailable");
                return RateOutcome::TableUnavailable(e);
            }
        };

        match rate_ratio(&table, &base, target) {
            Some(ratio) => RateOutcome::Ratio(round_significant(ratio)),
            None => {
                debug!(found = ?table.codes().collect::<Vec<_>>(), "Rates missing from table");
                RateOutcome::Missing
            }
        }
    }

    /// Body text for `GET /exchangeRate/{code}`.
    pub async fn get_ratio(&self, target: &CurrencyCode) -> String {
        self.query(target).await.body()
    }
}
