//! Conversion view-model
//!
//! A `ConversionView` holds the form inputs and moves through
//! `Input -> Validating -> Result`. Editing any input returns it to `Input`.
//! Surfaces (terminal, web) only feed it events and render what it exposes.

use tracing::debug;

use super::currency::{BASE_CURRENCY, CurrencyCode};
use super::error::ValidationError;
use super::format::group_thousands;
use super::rate::{RateFetcher, RateQuote};

pub const DEFAULT_AMOUNT: f64 = 100.0;
pub const AMOUNT_STEP: f64 = 1.0;
pub const SUCCESS_TEXT: &str = "转换完成！";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Message {
            kind,
            text: text.into(),
        }
    }
}

/// A completed conversion of `usd_amount` at `rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub currency: CurrencyCode,
    pub usd_amount: f64,
    pub rate: f64,
    pub converted: f64,
}

impl Conversion {
    pub fn new(currency: CurrencyCode, usd_amount: f64, rate: f64) -> Self {
        Conversion {
            currency,
            usd_amount,
            rate,
            converted: usd_amount * rate,
        }
    }

    pub fn amount_text(&self) -> String {
        format!("${:.2}", self.usd_amount)
    }

    pub fn rate_text(&self) -> String {
        format!("1 {BASE_CURRENCY} = {:.4} {}", self.rate, self.currency.code())
    }

    pub fn converted_text(&self) -> String {
        format!(
            "{}{}",
            self.currency.symbol(),
            group_thousands(self.converted, 2)
        )
    }

    /// Label/value pairs in display order.
    pub fn lines(&self) -> Vec<(String, String)> {
        vec![
            ("美元金额".to_string(), self.amount_text()),
            ("当前汇率".to_string(), self.rate_text()),
            (format!("{}金额", self.currency.name()), self.converted_text()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Converted {
        conversion: Conversion,
        warning: Option<String>,
    },
    Rejected(ValidationError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Input,
    Validating,
    Result(Outcome),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    SelectCurrency(CurrencyCode),
    EnterAmount(f64),
    Reset,
}

pub fn validate_amount(amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() {
        Err(ValidationError::InvalidAmount)
    } else if amount < 0.0 {
        Err(ValidationError::NegativeAmount)
    } else {
        Ok(amount)
    }
}

/// Parses the amount field. Unparseable text becomes NaN so validation rejects it.
pub fn parse_amount(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionView {
    currency: CurrencyCode,
    amount: f64,
    state: ViewState,
}

impl Default for ConversionView {
    fn default() -> Self {
        ConversionView::new(CurrencyCode::default(), DEFAULT_AMOUNT)
    }
}

impl ConversionView {
    pub fn new(currency: CurrencyCode, amount: f64) -> Self {
        ConversionView {
            currency,
            amount,
            state: ViewState::Input,
        }
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == ViewState::Validating
    }

    /// Whether the conversion trigger should be offered for the current input.
    pub fn can_convert(&self) -> bool {
        validate_amount(self.amount).is_ok()
    }

    pub fn dispatch(&mut self, event: ViewEvent) {
        debug!(?event, "View event");
        match event {
            ViewEvent::SelectCurrency(currency) => self.currency = currency,
            ViewEvent::EnterAmount(amount) => self.amount = amount,
            ViewEvent::Reset => {
                self.currency = CurrencyCode::default();
                self.amount = DEFAULT_AMOUNT;
            }
        }
        self.state = ViewState::Input;
    }

    /// Handles the conversion trigger. On success the view is `Validating` and
    /// the caller must look up a rate for the returned currency.
    pub fn begin(&mut self) -> Result<CurrencyCode, ValidationError> {
        self.state = ViewState::Validating;
        match validate_amount(self.amount) {
            Ok(_) => Ok(self.currency),
            Err(e) => {
                debug!(amount = self.amount, error = %e, "Amount rejected");
                self.state = ViewState::Result(Outcome::Rejected(e.clone()));
                Err(e)
            }
        }
    }

    /// Completes a conversion started with `begin`.
    pub fn finish(&mut self, quote: RateQuote) {
        if !self.is_pending() {
            debug!(state = ?self.state, "Ignoring rate quote outside of validation");
            return;
        }
        let conversion = Conversion::new(self.currency, self.amount, quote.rate);
        debug!(?conversion, "Conversion complete");
        self.state = ViewState::Result(Outcome::Converted {
            conversion,
            warning: quote.warning,
        });
    }

    /// Runs the whole trigger: validate, fetch, convert.
    pub async fn submit(&mut self, fetcher: &RateFetcher) -> &ViewState {
        if let Ok(currency) = self.begin() {
            let quote = fetcher.fetch(currency).await;
            self.finish(quote);
        }
        &self.state
    }

    pub fn conversion(&self) -> Option<&Conversion> {
        match &self.state {
            ViewState::Result(Outcome::Converted { conversion, .. }) => Some(conversion),
            _ => None,
        }
    }

    /// Messages to show for the current state, in display order.
    pub fn messages(&self) -> Vec<Message> {
        match &self.state {
            ViewState::Input => validate_amount(self.amount)
                .err()
                .map(|e| vec![Message::new(MessageKind::Error, e.to_string())])
                .unwrap_or_default(),
            ViewState::Validating => Vec::new(),
            ViewState::Result(Outcome::Rejected(e)) => {
                vec![Message::new(MessageKind::Error, e.to_string())]
            }
            ViewState::Result(Outcome::Converted { warning, .. }) => {
                let mut messages = Vec::new();
                if let Some(warning) = warning {
                    messages.push(Message::new(MessageKind::Warning, warning.clone()));
                }
                messages.push(Message::new(MessageKind::Success, SUCCESS_TEXT));
                messages
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyRateProvider;
    use crate::core::rate::FallbackTable;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        rate: Option<f64>,
        call_count: AtomicUsize,
    }

    impl MockProvider {
        fn new(rate: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                rate,
                call_count: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CurrencyRateProvider for MockProvider {
        async fn get_rate(&self, _from: &str, _to: &str) -> Result<f64> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.rate.ok_or_else(|| anyhow!("request timed out"))
        }
    }

    fn fetcher(provider: &Arc<MockProvider>) -> RateFetcher {
        RateFetcher::new(provider.clone(), FallbackTable::default())
    }

    #[tokio::test]
    async fn test_live_rate_conversion() {
        let provider = MockProvider::new(Some(7.1));
        let mut view = ConversionView::new(CurrencyCode::Cny, 100.0);

        view.submit(&fetcher(&provider)).await;

        let conversion = view.conversion().expect("conversion should be present");
        assert_eq!(conversion.rate_text(), "1 USD = 7.1000 CNY");
        assert_eq!(conversion.converted_text(), "¥710.00");
        assert_eq!(conversion.amount_text(), "$100.00");
        assert_eq!(
            view.messages(),
            vec![Message::new(MessageKind::Success, SUCCESS_TEXT)]
        );
    }

    #[tokio::test]
    async fn test_failed_lookup_uses_fallback_and_warns() {
        let provider = MockProvider::new(None);
        let mut view = ConversionView::new(CurrencyCode::Jpy, 100.0);

        view.submit(&fetcher(&provider)).await;

        let conversion = view.conversion().unwrap();
        assert_eq!(conversion.rate, 150.0);
        assert_eq!(conversion.converted_text(), "¥15,000.00");
        assert_eq!(conversion.lines()[2].0, "日元金额");

        let messages = view.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].kind, MessageKind::Warning);
        assert!(messages[0].text.contains("request timed out"));
        assert_eq!(messages[1].kind, MessageKind::Success);
    }

    #[tokio::test]
    async fn test_negative_amount_never_fetches() {
        let provider = MockProvider::new(Some(7.1));
        let mut view = ConversionView::new(CurrencyCode::Cny, -5.0);
        assert!(!view.can_convert());
        assert_eq!(view.messages()[0].kind, MessageKind::Error);

        let state = view.submit(&fetcher(&provider)).await.clone();

        assert_eq!(
            state,
            ViewState::Result(Outcome::Rejected(ValidationError::NegativeAmount))
        );
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 0);
        assert!(view.conversion().is_none());
        let messages = view.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.contains("不能输入负数"));
    }

    #[tokio::test]
    async fn test_zero_amount_converts_to_zero() {
        let provider = MockProvider::new(Some(7.2));
        let mut view = ConversionView::new(CurrencyCode::Cny, 0.0);

        view.submit(&fetcher(&provider)).await;

        assert_eq!(view.conversion().unwrap().converted_text(), "¥0.00");
    }

    #[tokio::test]
    async fn test_unparseable_amount_is_rejected() {
        let provider = MockProvider::new(Some(7.2));
        let mut view = ConversionView::default();
        view.dispatch(ViewEvent::EnterAmount(parse_amount("abc")));

        view.submit(&fetcher(&provider)).await;

        assert_eq!(
            view.state(),
            &ViewState::Result(Outcome::Rejected(ValidationError::InvalidAmount))
        );
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_repeated_submissions_are_identical() {
        let provider = MockProvider::new(Some(151.25));
        let fetcher = fetcher(&provider);
        let mut view = ConversionView::new(CurrencyCode::Jpy, 42.5);

        let first = view.submit(&fetcher).await.clone();
        let first_messages = view.messages();
        for _ in 0..3 {
            assert_eq!(view.submit(&fetcher).await, &first);
            assert_eq!(view.messages(), first_messages);
        }
        // every trigger is a fresh lookup
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_converted_matches_product() {
        for (amount, rate) in [(0.0, 7.2), (1.0, 0.0071), (123.45, 151.37), (1e9, 7.0)] {
            let conversion = Conversion::new(CurrencyCode::Cny, amount, rate);
            let expected: f64 = amount * rate;
            assert!((conversion.converted - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn test_state_transitions() {
        let mut view = ConversionView::default();
        assert_eq!(view.state(), &ViewState::Input);
        assert_eq!(view.amount(), DEFAULT_AMOUNT);

        assert_eq!(view.begin(), Ok(CurrencyCode::Cny));
        assert!(view.is_pending());
        assert!(view.messages().is_empty());

        view.finish(RateQuote {
            rate: 7.2,
            warning: None,
        });
        assert!(matches!(view.state(), ViewState::Result(_)));

        // a late quote does not overwrite the result
        view.finish(RateQuote {
            rate: 1.0,
            warning: None,
        });
        assert_eq!(view.conversion().unwrap().rate, 7.2);

        view.dispatch(ViewEvent::SelectCurrency(CurrencyCode::Jpy));
        assert_eq!(view.state(), &ViewState::Input);
        assert_eq!(view.currency(), CurrencyCode::Jpy);
        assert!(view.conversion().is_none());

        view.dispatch(ViewEvent::EnterAmount(-1.0));
        view.dispatch(ViewEvent::Reset);
        assert_eq!(view, ConversionView::default());
    }
}
