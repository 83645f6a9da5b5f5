//! Live rate lookup with a fallback table for when the provider fails

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::currency::{BASE_CURRENCY, CurrencyCode, CurrencyRateProvider};
use super::error::InvalidFallbackRate;

/// Rate used for a currency that has no fallback entry.
pub const UNKNOWN_FALLBACK_RATE: f64 = 1.0;

/// Pre-configured rates, keyed by ISO code, used only when the live lookup fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HashMap<String, f64>", into = "HashMap<String, f64>")]
pub struct FallbackTable {
    rates: HashMap<String, f64>,
}

impl FallbackTable {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        let rates = rates
            .into_iter()
            .map(|(code, rate)| (code.to_uppercase(), rate))
            .collect();
        FallbackTable { rates }
    }

    pub fn rate_for(&self, code: &str) -> f64 {
        self.rates
            .get(&code.to_uppercase())
            .copied()
            .unwrap_or(UNKNOWN_FALLBACK_RATE)
    }
}

impl TryFrom<HashMap<String, f64>> for FallbackTable {
    type Error = InvalidFallbackRate;

    fn try_from(rates: HashMap<String, f64>) -> Result<Self, Self::Error> {
        if let Some((code, rate)) = rates
            .iter()
            .find(|(_, rate)| !rate.is_finite() || **rate <= 0.0)
        {
            return Err(InvalidFallbackRate {
                currency: code.to_uppercase(),
                rate: *rate,
            });
        }
        Ok(FallbackTable::new(rates))
    }
}

impl From<FallbackTable> for HashMap<String, f64> {
    fn from(table: FallbackTable) -> Self {
        table.rates
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        FallbackTable::new(HashMap::from([
            ("CNY".to_string(), 7.2),
            ("JPY".to_string(), 150.0),
        ]))
    }
}

/// Rate chosen for one conversion. `warning` is set when the fallback was used.
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    pub rate: f64,
    pub warning: Option<String>,
}

impl RateQuote {
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

/// Makes exactly one provider call per `fetch`; nothing is cached between calls.
#[derive(Clone)]
pub struct RateFetcher {
    provider: Arc<dyn CurrencyRateProvider>,
    fallback: FallbackTable,
}

impl RateFetcher {
    pub fn new(provider: Arc<dyn CurrencyRateProvider>, fallback: FallbackTable) -> Self {
        RateFetcher { provider, fallback }
    }

    pub async fn fetch(&self, target: CurrencyCode) -> RateQuote {
        match self.provider.get_rate(BASE_CURRENCY, target.code()).await {
            Ok(rate) => {
                debug!(%target, rate, "Using live rate");
                RateQuote {
                    rate,
                    warning: None,
                }
            }
            Err(e) => {
                let rate = self.fallback.rate_for(target.code());
                warn!(%target, error = %e, fallback = rate, "Rate lookup failed, using fallback");
                RateQuote {
                    rate,
                    warning: Some(format!(
                        "获取实时汇率失败：{e}（已使用默认汇率 {rate:?}，仅供参考）"
                    )),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;

    struct FixedProvider(f64);

    #[async_trait]
    impl CurrencyRateProvider for FixedProvider {
        async fn get_rate(&self, from: &str, _to: &str) -> Result<f64> {
            assert_eq!(from, "USD");
            Ok(self.0)
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl CurrencyRateProvider for FailingProvider {
        async fn get_rate(&self, _from: &str, _to: &str) -> Result<f64> {
            Err(anyhow!("connection refused"))
        }
    }

    #[test]
    fn test_default_fallback_table() {
        let table = FallbackTable::default();
        assert_eq!(table.rate_for("CNY"), 7.2);
        assert_eq!(table.rate_for("jpy"), 150.0);
        assert_eq!(table.rate_for("EUR"), UNKNOWN_FALLBACK_RATE);
    }

    #[test]
    fn test_non_positive_fallback_rates_are_rejected() {
        for rate in [0.0, -7.2, f64::NAN, f64::INFINITY] {
            let rates = HashMap::from([("CNY".to_string(), 7.2), ("jpy".to_string(), rate)]);
            let err = FallbackTable::try_from(rates).unwrap_err();
            assert_eq!(err.currency, "JPY");
        }

        let rates = HashMap::from([("cny".to_string(), 7.25)]);
        let table = FallbackTable::try_from(rates).unwrap();
        assert_eq!(table.rate_for("CNY"), 7.25);
    }

    #[tokio::test]
    async fn test_live_rate_has_no_warning() {
        let fetcher = RateFetcher::new(Arc::new(FixedProvider(7.1)), FallbackTable::default());
        let quote = fetcher.fetch(CurrencyCode::Cny).await;
        assert_eq!(quote.rate, 7.1);
        assert!(!quote.is_fallback());
    }

    #[tokio::test]
    async fn test_failure_uses_fallback_with_reason() {
        let fetcher = RateFetcher::new(Arc::new(FailingProvider), FallbackTable::default());
        let quote = fetcher.fetch(CurrencyCode::Jpy).await;
        assert_eq!(quote.rate, 150.0);
        let warning = quote.warning.expect("fallback should carry a warning");
        assert!(warning.contains("connection refused"));
        assert!(warning.contains("150.0"));
    }

    #[tokio::test]
    async fn test_currency_missing_from_table_falls_back_to_one() {
        let table = FallbackTable::new(HashMap::from([("cny".to_string(), 7.3)]));
        let fetcher = RateFetcher::new(Arc::new(FailingProvider), table);

        assert_eq!(fetcher.fetch(CurrencyCode::Cny).await.rate, 7.3);
        let quote = fetcher.fetch(CurrencyCode::Jpy).await;
        assert_eq!(quote.rate, UNKNOWN_FALLBACK_RATE);
        assert!(quote.warning.unwrap().contains("1.0"));
    }
}
