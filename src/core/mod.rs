//! Core conversion logic, independent of any UI surface

pub mod config;
pub mod conversion;
pub mod currency;
pub mod error;
pub mod format;
pub mod log;
pub mod rate;

// Re-export main types for cleaner imports
pub use conversion::{Conversion, ConversionView, Message, MessageKind, ViewEvent, ViewState};
pub use currency::{BASE_CURRENCY, CurrencyCode, CurrencyRateProvider};
pub use error::{RateLookupError, ValidationError};
pub use rate::{FallbackTable, RateFetcher, RateQuote};
