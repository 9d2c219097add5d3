pub mod api;
pub mod cli;
pub mod core;
pub mod providers;
pub mod rates;
pub mod service;

use crate::core::config::{AppConfig, BaseCurrencyConfig};
use crate::core::currency::{BaseCurrencyProvider, CurrencyCode};
use crate::providers::base_currency::{RemoteBaseCurrency, StaticBaseCurrency};
use crate::providers::nbp::NbpTableFetcher;
use crate::rates::RateTableParser;
use crate::service::RateQueryService;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Serve,
    Query { currency_code: String },
}

/// Wires the configured providers into a query service.
pub fn build_service(config: &AppConfig) -> Result<RateQueryService> {
    let timeout = config.rate_table.timeout();

    let base_currency: Arc<dyn BaseCurrencyProvider> = match &config.base_currency {
        BaseCurrencyConfig::Static(s) => Arc::new(StaticBaseCurrency::new(s.code.clone())),
        BaseCurrencyConfig::Remote(r) => Arc::new(
            RemoteBaseCurrency::new(&r.url, timeout)
                .context("Failed to create base currency provider")?,
        ),
    };

    let fetcher = NbpTableFetcher::new(&config.rate_table.url, timeout)
        .context("Failed to create rate table fetcher")?;
    let parser = RateTableParser::new(config.rate_table.local_currency.clone());

    Ok(RateQueryService::new(
        base_currency,
        Arc::new(fetcher),
        parser,
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let service = build_service(&config)?;

    match command {
        AppCommand::Serve => {
            info!("Exchange rate service starting...");
            api::serve(config.server.bind, Arc::new(service)).await
        }
        AppCommand::Query { currency_code } => {
            let body = service.get_ratio(&CurrencyCode::new(&currency_code)).await;
            println!("{body}");
            Ok(())
        }
    }
}
