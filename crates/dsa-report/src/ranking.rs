//! Optimal holding-period selection.
//!
//! The rule that scores a holding period is a trait object so callers can
//! swap it without touching the summary or the engine.

use std::collections::BTreeSet;

use chrono::Datelike;
use dsa_backtest::TradeRecord;
use serde::{Deserialize, Serialize};

use crate::summary::HoldingPeriodStats;

/// Years assumed when the trade table is empty.
pub const DEFAULT_FALLBACK_YEARS: u32 = 5;

pub trait RankingRule {
    fn name(&self) -> &'static str;
    /// Higher is better. NaN never wins.
    fn score(&self, stats: &HoldingPeriodStats) -> f64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MeanNetGain;

impl RankingRule for MeanNetGain {
    fn name(&self) -> &'static str {
        "mean_net_gain"
    }
    fn score(&self, stats: &HoldingPeriodStats) -> f64 {
        stats.mean_net_gain_pct
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MedianNetGain;

impl RankingRule for MedianNetGain {
    fn name(&self) -> &'static str {
        "median_net_gain"
    }
    fn score(&self, stats: &HoldingPeriodStats) -> f64 {
        stats.median_net_gain_pct
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CumulativeNetGain;

impl RankingRule for CumulativeNetGain {
    fn name(&self) -> &'static str {
        "cumulative_net_gain"
    }
    fn score(&self, stats: &HoldingPeriodStats) -> f64 {
        stats.cumulative_net_gain_pct
    }
}

/// Config-facing selector for the built-in rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingKind {
    #[default]
    MeanNetGain,
    MedianNetGain,
    CumulativeNetGain,
}

impl RankingKind {
    pub fn as_str(&self) -> &'static str {
        self.rule().name()
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "mean_net_gain" | "mean" => Some(RankingKind::MeanNetGain),
            "median_net_gain" | "median" => Some(RankingKind::MedianNetGain),
            "cumulative_net_gain" | "cumulative" => Some(RankingKind::CumulativeNetGain),
            _ => None,
        }
    }

    pub fn rule(&self) -> &'static dyn RankingRule {
        match self {
            RankingKind::MeanNetGain => &MeanNetGain,
            RankingKind::MedianNetGain => &MedianNetGain,
            RankingKind::CumulativeNetGain => &CumulativeNetGain,
        }
    }
}

/// The winning holding period and its annualized figure.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimalStrategy {
    pub days_held: u32,
    pub ranking: &'static str,
    pub mean_net_gain_pct: f64,
    pub cumulative_net_gain_pct: f64,
    pub years_spanned: u32,
    /// `cumulative_net_gain_pct / years_spanned`.
    pub avg_annual_gain_pct: f64,
}

/// Distinct calendar years among the records' ex-dates, or `fallback_years`
/// for an empty table.
pub fn years_spanned(records: &[TradeRecord], fallback_years: u32) -> u32 {
    if records.is_empty() {
        return fallback_years;
    }
    let years: BTreeSet<i32> = records.iter().map(|r| r.ex_date.year()).collect();
    years.len() as u32
}

/// Pick the best holding period under `rule`.
///
/// Ties go to the lowest holding period. Returns `None` when `stats` is empty
/// or every score is NaN.
pub fn select_optimal(
    stats: &[HoldingPeriodStats],
    records: &[TradeRecord],
    rule: &dyn RankingRule,
    fallback_years: u32,
) -> Option<OptimalStrategy> {
    let mut best: Option<(&HoldingPeriodStats, f64)> = None;
    for s in stats {
        let score = rule.score(s);
        if score.is_nan() {
            continue;
        }
        let better = match best {
            None => true,
            Some((b, b_score)) => {
                score > b_score || (score == b_score && s.days_held < b.days_held)
            }
        };
        if better {
            best = Some((s, score));
        }
    }

    let (winner, _) = best?;
    let years = years_spanned(records, fallback_years);
    Some(OptimalStrategy {
        days_held: winner.days_held,
        ranking: rule.name(),
        mean_net_gain_pct: winner.mean_net_gain_pct,
        cumulative_net_gain_pct: winner.cumulative_net_gain_pct,
        years_spanned: years,
        avg_annual_gain_pct: winner.cumulative_net_gain_pct / f64::from(years),
    })
}
