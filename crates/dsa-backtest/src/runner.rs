//! Fetch-then-run pipeline.
//!
//! The only suspension point is the provider fetch. A provider failure is
//! folded into [`DataUnavailable::Fetch`] and an empty report; it is never
//! returned as an error. The engine itself stays pure (see `engine.rs`).

use chrono::NaiveDate;
use dsa_md::{normalize_history, HistoryProvider, HistoryQuality, LookbackWindow, PriceField};
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::{run_scalp, BacktestError};
use crate::types::{DataUnavailable, ScalpConfig, ScalpReport};

/// What to fetch for one analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalpRequest {
    pub ticker: String,
    /// Last date of the lookback window.
    pub as_of: NaiveDate,
    pub window: LookbackWindow,
    pub price_field: PriceField,
}

impl ScalpRequest {
    pub fn new(ticker: impl Into<String>, as_of: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            as_of,
            window: LookbackWindow::default(),
            price_field: PriceField::default(),
        }
    }
}

/// A report plus the provenance of the data it was computed from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScalpRun {
    pub ticker: String,
    pub source: &'static str,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Absent when the fetch failed.
    pub quality: Option<HistoryQuality>,
    pub report: ScalpReport,
}

/// Fetch history for `req.ticker` and run the backtest on it.
///
/// Only an invalid `config` is returned as `Err`, and it is checked before
/// any fetch happens.
pub async fn run(
    provider: &dyn HistoryProvider,
    req: &ScalpRequest,
    config: &ScalpConfig,
) -> Result<ScalpRun, BacktestError> {
    config.validate()?;

    let fetch = req
        .window
        .request(req.ticker.clone(), req.as_of, req.price_field);
    info!(
        ticker = %fetch.ticker,
        source = provider.name(),
        start = %fetch.start,
        end = %fetch.end,
        "fetching history"
    );

    let mut out = ScalpRun {
        ticker: req.ticker.clone(),
        source: provider.name(),
        window_start: fetch.start,
        window_end: fetch.end,
        quality: None,
        report: ScalpReport::default(),
    };

    let raw = match provider.fetch_history(&fetch).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(ticker = %req.ticker, source = provider.name(), error = %e, "history fetch failed");
            out.report = ScalpReport::unavailable(DataUnavailable::Fetch(e.to_string()));
            return Ok(out);
        }
    };

    let history = normalize_history(&raw);
    out.quality = Some(history.quality);
    out.report = run_scalp(&history.prices, &history.dividends, config)?;

    if let Some(reason) = &out.report.data_unavailable {
        info!(ticker = %req.ticker, %reason, "no analyzable history");
    }

    Ok(out)
}
