use dsa_backtest::{AlignmentDiagnostics, DataUnavailable, ScalpReport, TradeRecord};
use serde::Serialize;

use crate::annual::{annual_net_gains, AnnualTable};
use crate::ranking::{select_optimal, OptimalStrategy, RankingRule};
use crate::summary::{summarize, HoldingPeriodStats};

/// Everything the presentation layer derives from one engine run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Analysis {
    pub ticker: String,
    pub ranking: &'static str,
    pub data_unavailable: Option<DataUnavailable>,
    pub diagnostics: AlignmentDiagnostics,
    pub summary: Vec<HoldingPeriodStats>,
    pub optimal: Option<OptimalStrategy>,
    pub annual: AnnualTable,
    pub records: Vec<TradeRecord>,
}

impl Analysis {
    pub fn build(
        ticker: impl Into<String>,
        report: &ScalpReport,
        rule: &dyn RankingRule,
        fallback_years: u32,
    ) -> Self {
        let summary = summarize(&report.records);
        let optimal = select_optimal(&summary, &report.records, rule, fallback_years);
        let annual = annual_net_gains(&report.records);

        let ticker = ticker.into();
        match &optimal {
            Some(best) => tracing::info!(
                %ticker,
                ranking = rule.name(),
                days_held = best.days_held,
                avg_annual_gain_pct = best.avg_annual_gain_pct,
                "optimal holding period selected"
            ),
            None => tracing::debug!(%ticker, "no holding period to rank"),
        }

        Self {
            ticker,
            ranking: rule.name(),
            data_unavailable: report.data_unavailable.clone(),
            diagnostics: report.diagnostics,
            summary,
            optimal,
            annual,
            records: report.records.clone(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.data_unavailable.is_some()
    }
}
