//! Command handlers for the `dsa` binary.
//!
//! Shared parsing helpers live here; command logic lives in the submodules.

pub mod analyze;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dsa_backtest::AlignmentPolicy;
use dsa_report::{ExportFormat, RankingKind};

/// Parse `--as-of`, defaulting to today's UTC date.
pub fn parse_as_of(as_of: Option<&str>) -> Result<NaiveDate> {
    match as_of {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid --as-of '{}'. expected YYYY-MM-DD", s)),
        None => Ok(chrono::Utc::now().date_naive()),
    }
}

pub fn parse_alignment(s: &str) -> Result<AlignmentPolicy> {
    AlignmentPolicy::parse(s).with_context(|| {
        format!(
            "invalid --alignment '{}'. expected one of: strict | forward-roll",
            s
        )
    })
}

pub fn parse_ranking(s: &str) -> Result<RankingKind> {
    RankingKind::parse(s).with_context(|| {
        format!(
            "invalid --ranking '{}'. expected one of: mean_net_gain | median_net_gain | cumulative_net_gain",
            s
        )
    })
}

pub fn parse_format(s: &str) -> Result<ExportFormat> {
    ExportFormat::parse(s)
        .with_context(|| format!("invalid --format '{}'. expected one of: text | json | csv", s))
}
