use chrono::NaiveDate;
use dsa_md::{DividendEvent, PricePoint};
use serde::{Deserialize, Serialize};

use crate::alignment::{AlignmentPolicy, SkipReason};

/// Default number of holding periods simulated per event.
pub const DEFAULT_MAX_DAYS: u32 = 14;

/// Scalping backtest configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalpConfig {
    /// Longest holding period simulated, in sessions counted from the ex session.
    /// Must be >= 1.
    pub max_days: u32,
    /// Handling of ex-dates that are not sessions.
    pub alignment: AlignmentPolicy,
}

impl Default for ScalpConfig {
    fn default() -> Self {
        Self {
            max_days: DEFAULT_MAX_DAYS,
            alignment: AlignmentPolicy::Strict,
        }
    }
}

/// One simulated trade: buy before the ex-date, sell `days_held_after_ex_div`
/// sessions later (1 = sell on the ex session).
///
/// Prices are drawn from the series, never interpolated. Percentages are
/// unrounded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub ex_date: NaiveDate,
    pub dividend: f64,
    pub buy_date: NaiveDate,
    pub buy_price: f64,
    pub days_held_after_ex_div: u32,
    pub sell_date: NaiveDate,
    pub sell_price: f64,
    pub net_gain_pct: f64,
    pub dividend_gain_pct: f64,
}

impl TradeRecord {
    /// Build a record from an event and the buy/sell sessions.
    ///
    /// A non-positive buy price is not guarded: the percentages come out
    /// infinite or NaN.
    pub fn compute(
        event: &DividendEvent,
        buy: &PricePoint,
        sell: &PricePoint,
        days_held_after_ex_div: u32,
    ) -> Self {
        let net_gain_pct = ((sell.close + event.amount - buy.close) / buy.close) * 100.0;
        let dividend_gain_pct = (event.amount / buy.close) * 100.0;
        Self {
            ex_date: event.ex_date,
            dividend: event.amount,
            buy_date: buy.date,
            buy_price: buy.close,
            days_held_after_ex_div,
            sell_date: sell.date,
            sell_price: sell.close,
            net_gain_pct,
            dividend_gain_pct,
        }
    }
}

/// Per-run counters for events the engine could not fully use.
///
/// Skips are routine (calendar edges, data gaps) and never fail the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentDiagnostics {
    pub events_seen: usize,
    pub events_aligned: usize,
    /// Aligned events whose ex-date was rolled to a later session.
    pub rolled_forward: usize,
    pub skipped_not_in_calendar: usize,
    pub skipped_no_prior_session: usize,
    /// Aligned events that ran out of history before `max_days`.
    pub truncated_events: usize,
}

impl AlignmentDiagnostics {
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NotInCalendar => self.skipped_not_in_calendar += 1,
            SkipReason::NoPriorSession => self.skipped_no_prior_session += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_not_in_calendar + self.skipped_no_prior_session
    }
}

/// Why a run produced no analyzable history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum DataUnavailable {
    /// The provider failed; the message is the provider error.
    Fetch(String),
    EmptyPrices,
    EmptyDividends,
}

impl std::fmt::Display for DataUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataUnavailable::Fetch(msg) => write!(f, "fetch failed: {}", msg),
            DataUnavailable::EmptyPrices => write!(f, "empty price history"),
            DataUnavailable::EmptyDividends => write!(f, "empty dividend history"),
        }
    }
}

/// Output of one engine invocation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScalpReport {
    /// Grouped by event in ex-date order, then by increasing holding period.
    pub records: Vec<TradeRecord>,
    pub diagnostics: AlignmentDiagnostics,
    /// Set when the inputs were missing; `records` is empty in that case.
    pub data_unavailable: Option<DataUnavailable>,
}

impl ScalpReport {
    pub fn unavailable(reason: DataUnavailable) -> Self {
        Self {
            data_unavailable: Some(reason),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
