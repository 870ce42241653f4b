//! Calendar normalization for raw provider history.
//!
//! Converts a [`RawHistory`] into a [`NormalizedHistory`] whose prices and
//! dividends share one calendar: civil dates, no time of day, no offset.
//!
//! Each instant is mapped to the local date of its **own** offset annotation
//! (the wall-clock date the provider meant), then the offset is discarded.
//! Converting to UTC first would move an exchange-local midnight onto the
//! previous day for any venue east of UTC, and ex-dates would silently stop
//! matching sessions.
//!
//! It does **not**:
//! - fetch data (see `yahoo.rs`, `csv_source.rs`)
//! - filter zero/negative dividend amounts (the engine processes them)

use serde::Serialize;

use crate::provider::RawHistory;
use crate::series::{DividendEvent, PricePoint, PriceSeries};

/// Counters describing what normalization dropped or collapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryQuality {
    /// Close rows received from the provider.
    pub raw_closes: usize,
    /// Rows dropped because the close was null or not finite.
    pub null_closes_dropped: usize,
    /// Rows merged into an earlier row with the same civil date.
    pub duplicate_sessions_collapsed: usize,
    /// Dividend rows received (all are kept).
    pub raw_dividends: usize,
}

/// Series ready for the backtest engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedHistory {
    pub ticker: String,
    pub prices: PriceSeries,
    /// Ascending by ex-date; same-date events keep upstream order.
    pub dividends: Vec<DividendEvent>,
    pub quality: HistoryQuality,
}

/// Normalize raw provider output onto a single civil-date calendar.
pub fn normalize_history(raw: &RawHistory) -> NormalizedHistory {
    let mut quality = HistoryQuality {
        raw_closes: raw.closes.len(),
        raw_dividends: raw.dividends.len(),
        ..HistoryQuality::default()
    };

    let mut points: Vec<PricePoint> = Vec::with_capacity(raw.closes.len());
    for c in &raw.closes {
        match c.close {
            Some(v) if v.is_finite() => points.push(PricePoint::new(c.at.date_naive(), v)),
            _ => quality.null_closes_dropped += 1,
        }
    }

    let kept = points.len();
    let prices = PriceSeries::from_points(points);
    quality.duplicate_sessions_collapsed = kept - prices.len();

    let mut dividends: Vec<DividendEvent> = raw
        .dividends
        .iter()
        .map(|d| DividendEvent::new(d.at.date_naive(), d.amount))
        .collect();
    dividends.sort_by_key(|d| d.ex_date);

    if quality.null_closes_dropped > 0 || quality.duplicate_sessions_collapsed > 0 {
        tracing::debug!(
            ticker = %raw.ticker,
            null_closes_dropped = quality.null_closes_dropped,
            duplicate_sessions_collapsed = quality.duplicate_sessions_collapsed,
            "price history normalized with drops"
        );
    }

    NormalizedHistory {
        ticker: raw.ticker.clone(),
        prices,
        dividends,
        quality,
    }
}
