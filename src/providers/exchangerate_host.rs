use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::config::{ProviderConfig, TlsPolicy};
use crate::core::currency::CurrencyRateProvider;
use crate::core::error::RateLookupError;

// ExchangeRateHostProvider implementation for CurrencyRateProvider
pub struct ExchangeRateHostProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeRateHostProvider {
    pub fn new(base_url: &str, timeout: Duration, tls: TlsPolicy) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent("fxform/0.1")
            .timeout(timeout);
        if tls == TlsPolicy::AcceptInvalidCerts {
            warn!("TLS certificate verification is disabled for the rate provider");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(ExchangeRateHostProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout(), config.tls)
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateHostProvider {
    #[instrument(
        name = "ExchangeRateLookup",
        skip(self),
        fields(from = %from, to = %to)
    )]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let url = format!("{}/latest?base={from}&symbols={to}", self.base_url);
        debug!("Requesting exchange rate from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(RateLookupError::from)?;

        if !response.status().is_success() {
            return Err(RateLookupError::Status(response.status()).into());
        }

        let text = response.text().await.map_err(RateLookupError::from)?;
        let data: LatestRatesResponse =
            serde_json::from_str(&text).map_err(RateLookupError::from)?;

        let rate = data
            .rates
            .get(to)
            .copied()
            .ok_or_else(|| RateLookupError::MissingRate(to.to_string()))?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(RateLookupError::InvalidRate {
                currency: to.to_string(),
                rate,
            }
            .into());
        }

        debug!(rate, "Received exchange rate");
        Ok(rate)
    }
}
