//! dsa-backtest
//!
//! Dividend scalping backtest engine.
//!
//! Pipeline: PROVIDER -> NORMALIZE -> ALIGN -> SIMULATE
//!
//! - Buy at the close before the ex-dividend session
//! - Sell 1..=max_days sessions from the ex session (1 = on the ex session)
//! - Net gain includes the captured dividend
//! - Deterministic: same series + config => identical records, same order
//! - Ex-date alignment is an explicit policy (strict skip vs forward roll)
//! - Missing data yields an empty report tagged `DataUnavailable`, never an error

pub mod alignment;
mod engine;
mod runner;
pub mod types;

pub use alignment::{AlignmentPolicy, ExAnchor, SkipReason};
pub use engine::{run_scalp, BacktestError};
pub use runner::{run, ScalpRequest, ScalpRun};
pub use types::{
    AlignmentDiagnostics, DataUnavailable, ScalpConfig, ScalpReport, TradeRecord,
    DEFAULT_MAX_DAYS,
};
