use dsa_md::{DividendEvent, PriceSeries};
use tracing::{debug, info};

use crate::types::{DataUnavailable, ScalpConfig, ScalpReport, TradeRecord};

/// Backtest error variants.
///
/// Missing data is not an error (see [`DataUnavailable`]); only a config
/// that cannot describe any trade is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BacktestError {
    /// `max_days` must be at least 1.
    InvalidMaxDays { max_days: u32 },
}

impl core::fmt::Display for BacktestError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BacktestError::InvalidMaxDays { max_days } => {
                write!(f, "invalid max_days: {} (must be >= 1)", max_days)
            }
        }
    }
}

impl std::error::Error for BacktestError {}

impl ScalpConfig {
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.max_days == 0 {
            return Err(BacktestError::InvalidMaxDays {
                max_days: self.max_days,
            });
        }
        Ok(())
    }
}

/// Run the dividend scalping backtest over injected series.
///
/// Pure: no IO, no clock, no shared state. Identical inputs give identical
/// output, record for record.
///
/// Per dividend event, in ex-date order (same-date events keep input order):
/// 1. Align the ex-date to a session under `config.alignment`; skip on failure
/// 2. Buy at the close of the session before the ex session
/// 3. For holding period k = 1..=max_days, sell at the close of session
///    `ex + (k - 1)`; stop early when history runs out
pub fn run_scalp(
    prices: &PriceSeries,
    dividends: &[DividendEvent],
    config: &ScalpConfig,
) -> Result<ScalpReport, BacktestError> {
    config.validate()?;

    if prices.is_empty() {
        return Ok(ScalpReport::unavailable(DataUnavailable::EmptyPrices));
    }
    if dividends.is_empty() {
        return Ok(ScalpReport::unavailable(DataUnavailable::EmptyDividends));
    }

    let max_days = config.max_days as usize;
    let points = prices.points();
    let mut report = ScalpReport {
        records: Vec::with_capacity(dividends.len() * max_days),
        ..ScalpReport::default()
    };
    let diag = &mut report.diagnostics;

    let mut order: Vec<usize> = (0..dividends.len()).collect();
    order.sort_by_key(|&i| dividends[i].ex_date);

    for event in order.iter().map(|&i| &dividends[i]) {
        diag.events_seen += 1;

        let anchor = match config.alignment.locate(prices, event.ex_date) {
            Ok(a) => a,
            Err(reason) => {
                debug!(ex_date = %event.ex_date, amount = event.amount, %reason, "dividend event skipped");
                diag.record_skip(reason);
                continue;
            }
        };

        diag.events_aligned += 1;
        if anchor.rolled {
            diag.rolled_forward += 1;
        }

        let buy = &points[anchor.buy_idx];
        let sells = points[anchor.ex_idx..].iter().take(max_days);
        let mut emitted = 0usize;
        for (n, sell) in sells.enumerate() {
            report
                .records
                .push(TradeRecord::compute(event, buy, sell, n as u32 + 1));
            emitted += 1;
        }

        if emitted < max_days {
            diag.truncated_events += 1;
        }
    }

    info!(
        events_seen = diag.events_seen,
        events_aligned = diag.events_aligned,
        skipped = diag.skipped(),
        rows = report.records.len(),
        alignment = %config.alignment,
        "scalp backtest complete"
    );

    Ok(report)
}
