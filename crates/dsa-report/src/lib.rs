//! dsa-report
//!
//! Presentation-layer aggregation over the engine's flat trade table.
//!
//! - Per-holding-period mean / median / count and cumulative net gain
//! - Swappable ranking rule for the "optimal" holding period
//! - Year x holding-period pivot of summed net gain
//! - Transaction log export (CSV, JSON) and a plain-text rendering
//!
//! It does **not**:
//! - touch prices or dividends (only `TradeRecord`s)
//! - round anything it hands back as numbers; formatting is export-only

mod analysis;
mod annual;
mod export;
mod ranking;
mod summary;

pub use analysis::Analysis;
pub use annual::{annual_net_gains, AnnualRow, AnnualTable};
pub use export::{
    render_text, write_analysis, write_json, write_transactions_csv, ExportError, ExportFormat,
    NO_ALIGNED_EVENTS_MESSAGE, UNAVAILABLE_MESSAGE,
};
pub use ranking::{
    select_optimal, years_spanned, CumulativeNetGain, MeanNetGain, MedianNetGain,
    OptimalStrategy, RankingKind, RankingRule, DEFAULT_FALLBACK_YEARS,
};
pub use summary::{summarize, HoldingPeriodStats};
