use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use dsa_backtest::TradeRecord;
use serde::Serialize;

/// Summed net gain per (ex-date year, holding period).
///
/// `days_held` lists the column keys; each row's `net_gain_pct` is aligned to
/// it. A year with no trade for some holding period holds 0.0 there.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnnualTable {
    pub days_held: Vec<u32>,
    pub rows: Vec<AnnualRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnualRow {
    pub year: i32,
    pub net_gain_pct: Vec<f64>,
}

impl AnnualTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, year: i32, days_held: u32) -> Option<f64> {
        let col = self.days_held.iter().position(|&d| d == days_held)?;
        let row = self.rows.iter().find(|r| r.year == year)?;
        row.net_gain_pct.get(col).copied()
    }
}

pub fn annual_net_gains(records: &[TradeRecord]) -> AnnualTable {
    let mut cells: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    let mut days: BTreeSet<u32> = BTreeSet::new();
    let mut years: BTreeSet<i32> = BTreeSet::new();

    for r in records {
        let year = r.ex_date.year();
        days.insert(r.days_held_after_ex_div);
        years.insert(year);
        *cells.entry((year, r.days_held_after_ex_div)).or_insert(0.0) += r.net_gain_pct;
    }

    let days_held: Vec<u32> = days.into_iter().collect();
    let rows = years
        .into_iter()
        .map(|year| AnnualRow {
            year,
            net_gain_pct: days_held
                .iter()
                .map(|d| cells.get(&(year, *d)).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect();

    AnnualTable { days_held, rows }
}
