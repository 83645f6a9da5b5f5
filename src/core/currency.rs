//! Currency codes and the rate provider abstraction

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Currency every conversion starts from.
pub const BASE_CURRENCY: &str = "USD";

/// Target currencies offered by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurrencyCode {
    #[default]
    #[serde(rename = "CNY", alias = "cny")]
    Cny,
    #[serde(rename = "JPY", alias = "jpy")]
    Jpy,
}

impl CurrencyCode {
    /// Selector options, in display order.
    pub const ALL: [CurrencyCode; 2] = [CurrencyCode::Cny, CurrencyCode::Jpy];

    pub fn code(&self) -> &'static str {
        match self {
            CurrencyCode::Cny => "CNY",
            CurrencyCode::Jpy => "JPY",
        }
    }

    /// Both currencies share the yen/yuan sign; `name` tells them apart.
    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyCode::Cny | CurrencyCode::Jpy => "¥",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CurrencyCode::Cny => "人民币",
            CurrencyCode::Jpy => "日元",
        }
    }

    /// Label shown in the currency selector, e.g. `人民币 (CNY)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name(), self.code())
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CNY" => Ok(CurrencyCode::Cny),
            "JPY" => Ok(CurrencyCode::Jpy),
            _ => Err(anyhow::anyhow!("Unsupported target currency: {}", s)),
        }
    }
}

/// Source of live exchange rates. `get_rate` returns units of `to` per one unit of `from`.
#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64>;
}
