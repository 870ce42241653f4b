//! dsa-md
//!
//! Market data for the dividend scalping backtest.
//!
//! This crate owns the provider abstraction, the concrete providers (Yahoo
//! chart endpoint, local CSV) and calendar normalization. It does **not** run
//! any backtest logic; callers hand the normalized series to `dsa-backtest`.
//!
//! Pipeline: provider -> [`RawHistory`] -> [`normalize_history`] -> [`NormalizedHistory`]

pub mod csv_source;
pub mod normalizer;
pub mod provider;
pub mod series;
pub mod yahoo;

pub use csv_source::{CsvHistoryError, CsvHistoryProvider};
pub use normalizer::{normalize_history, HistoryQuality, NormalizedHistory};
pub use provider::{
    FetchRequest, HistoryProvider, LookbackWindow, PriceField, ProviderError, RawClose,
    RawDividend, RawHistory,
};
pub use series::{DividendEvent, PricePoint, PriceSeries};
pub use yahoo::{YahooChartProvider, YAHOO_BASE_URL};
