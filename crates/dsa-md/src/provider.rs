//! Provider boundary for dividend-scalping market data.
//!
//! This module defines **only** the raw history types, the fetch request and
//! the provider trait. Concrete providers live in `yahoo.rs` and
//! `csv_source.rs`; calendar normalization lives in `normalizer.rs`.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};

// ---------------------------------------------------------------------------
// Raw history
// ---------------------------------------------------------------------------

/// A single session close exactly as reported upstream.
///
/// `at` keeps the provider's own offset annotation; the normalizer decides
/// which civil date it belongs to. `close` is `None` when the provider
/// reported a null for that session.
#[derive(Debug, Clone, PartialEq)]
pub struct RawClose {
    pub at: DateTime<FixedOffset>,
    pub close: Option<f64>,
}

/// A single dividend payment exactly as reported upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDividend {
    pub at: DateTime<FixedOffset>,
    pub amount: f64,
}

/// Everything one fetch returns for one ticker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawHistory {
    pub ticker: String,
    pub closes: Vec<RawClose>,
    pub dividends: Vec<RawDividend>,
}

// ---------------------------------------------------------------------------
// Fetch request
// ---------------------------------------------------------------------------

/// Which close column a provider should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceField {
    /// Raw (split-adjusted only) close.
    Close,
    /// Close adjusted for splits and distributions.
    #[default]
    AdjClose,
}

impl PriceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Close => "close",
            PriceField::AdjClose => "adj_close",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ProviderError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "close" => Ok(PriceField::Close),
            "adj_close" | "adjclose" | "adj-close" => Ok(PriceField::AdjClose),
            other => Err(ProviderError::Config(format!(
                "invalid price field '{other}'. expected one of: close | adj_close"
            ))),
        }
    }
}

/// Parameters for a history fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Opaque ticker identifier; validity is the provider's concern.
    pub ticker: String,
    /// Inclusive start date.
    pub start: NaiveDate,
    /// Inclusive end date.
    pub end: NaiveDate,
    pub price_field: PriceField,
}

/// Fixed lookback window ending at a caller-supplied date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub years: u32,
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self { years: 5 }
    }
}

impl LookbackWindow {
    pub fn new(years: u32) -> Self {
        Self { years }
    }

    /// Build the request covering `[end - years, end]`.
    ///
    /// Feb 29 anchors clamp to Feb 28 in non-leap start years.
    pub fn request(
        &self,
        ticker: impl Into<String>,
        end: NaiveDate,
        price_field: PriceField,
    ) -> FetchRequest {
        let start_year = end.year() - self.years as i32;
        let start = end
            .with_year(start_year)
            .or_else(|| NaiveDate::from_ymd_opt(start_year, end.month(), 28))
            .unwrap_or(end);
        FetchRequest {
            ticker: ticker.into(),
            start,
            end,
            price_field,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that a [`HistoryProvider`] implementation may return.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Network or transport failure.
    Transport(String),
    /// The upstream API returned an application-level error.
    Api { code: Option<String>, message: String },
    /// The upstream API has no data for the ticker.
    NotFound(String),
    /// A response payload could not be decoded.
    Decode(String),
    /// A required configuration value is missing or invalid.
    Config(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Transport(msg) => write!(f, "transport error: {msg}"),
            ProviderError::Api {
                code: Some(c),
                message,
            } => write!(f, "provider api error code={c}: {message}"),
            ProviderError::Api {
                code: None,
                message,
            } => write!(f, "provider api error: {message}"),
            ProviderError::NotFound(ticker) => write!(f, "no history for ticker '{ticker}'"),
            ProviderError::Decode(msg) => write!(f, "decode error: {msg}"),
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Upstream market-data provider contract.
///
/// Object-safe so callers can hold a `Box<dyn HistoryProvider>`; `Send + Sync`
/// so it can cross task boundaries.
#[async_trait::async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Short name identifying this provider (e.g. `"yahoo"`).
    fn name(&self) -> &'static str;

    /// Fetch session closes and dividend payments for `req`.
    ///
    /// Items are returned in upstream order; sorting and deduplication happen
    /// during normalization.
    async fn fetch_history(&self, req: &FetchRequest) -> Result<RawHistory, ProviderError>;
}
