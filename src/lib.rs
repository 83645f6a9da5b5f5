pub mod cli;
pub mod core;
pub mod providers;
pub mod web;

use crate::core::config::AppConfig;
use crate::core::{ConversionView, CurrencyCode, RateFetcher};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Serve { bind: Option<String> },
    Convert { currency: CurrencyCode, amount: f64 },
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub fn build_fetcher(config: &AppConfig) -> Result<RateFetcher> {
    let provider = providers::ExchangeRateHostProvider::from_config(&config.provider)?;
    Ok(RateFetcher::new(
        Arc::new(provider),
        config.fallback_rates.clone(),
    ))
}

/// Runs one terminal conversion with the given config and returns the finished view.
pub async fn convert_with_config(
    config_path: Option<&str>,
    currency: CurrencyCode,
    amount: f64,
) -> Result<ConversionView> {
    let config = load_config(config_path)?;
    let fetcher = build_fetcher(&config)?;
    cli::convert::run_convert(&fetcher, currency, amount).await
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    match command {
        AppCommand::Serve { bind } => {
            let config = load_config(config_path)?;
            let fetcher = build_fetcher(&config)?;
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            web::serve(web::AppState { fetcher }, &bind).await
        }
        AppCommand::Convert { currency, amount } => {
            convert_with_config(config_path, currency, amount).await?;
            Ok(())
        }
    }
}
