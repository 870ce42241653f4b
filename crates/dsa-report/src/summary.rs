use std::collections::BTreeMap;

use dsa_backtest::TradeRecord;
use serde::Serialize;

/// Aggregate outcome of one holding period across all events.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HoldingPeriodStats {
    pub days_held: u32,
    /// Trades in this holding period, including degenerate ones.
    pub count: usize,
    pub mean_net_gain_pct: f64,
    pub median_net_gain_pct: f64,
    pub mean_dividend_gain_pct: f64,
    pub median_dividend_gain_pct: f64,
    /// Sum of net gain over every event for this holding period.
    pub cumulative_net_gain_pct: f64,
}

/// Group records by holding period, ascending.
///
/// Holding periods with no records are absent from the output. Non-finite
/// percentages are left out of the mean, median and cumulative values; a
/// period with no finite value reports NaN mean/median and zero cumulative.
pub fn summarize(records: &[TradeRecord]) -> Vec<HoldingPeriodStats> {
    let mut groups: BTreeMap<u32, Group> = BTreeMap::new();
    for r in records {
        let g = groups.entry(r.days_held_after_ex_div).or_default();
        g.count += 1;
        if r.net_gain_pct.is_finite() {
            g.net.push(r.net_gain_pct);
        }
        if r.dividend_gain_pct.is_finite() {
            g.div.push(r.dividend_gain_pct);
        }
    }

    groups
        .into_iter()
        .map(|(days_held, mut g)| {
            // Sums are taken in record order, before the median sorts in place.
            let cumulative = g.net.iter().sum::<f64>();
            let mean_net = mean(cumulative, g.net.len());
            let mean_div = mean(g.div.iter().sum::<f64>(), g.div.len());
            HoldingPeriodStats {
                days_held,
                count: g.count,
                mean_net_gain_pct: mean_net,
                median_net_gain_pct: median_in_place(&mut g.net),
                mean_dividend_gain_pct: mean_div,
                median_dividend_gain_pct: median_in_place(&mut g.div),
                cumulative_net_gain_pct: cumulative,
            }
        })
        .collect()
}

#[derive(Default)]
struct Group {
    count: usize,
    net: Vec<f64>,
    div: Vec<f64>,
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        return f64::NAN;
    }
    sum / n as f64
}

fn median_in_place(v: &mut [f64]) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    if v.len() % 2 == 0 {
        (v[mid - 1] + v[mid]) / 2.0
    } else {
        v[mid]
    }
}
