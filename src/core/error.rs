//! Error kinds surfaced by the conversion flow

use thiserror::Error;

/// Rejections raised before any rate lookup happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("错误：不能输入负数！请输入大于等于 0 的金额。")]
    NegativeAmount,
    #[error("错误：请输入有效的数字金额。")]
    InvalidAmount,
}

/// Ways a live rate lookup can fail. All of them end in the fallback rate.
#[derive(Debug, Error)]
pub enum RateLookupError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to parse rate response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no rate for {0} in response")]
    MissingRate(String),
    #[error("invalid rate {rate} for {currency}")]
    InvalidRate { currency: String, rate: f64 },
}

/// Configured fallback rate that is not a positive number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid fallback rate {rate} for {currency}: must be a positive number")]
pub struct InvalidFallbackRate {
    pub currency: String,
    pub rate: f64,
}
