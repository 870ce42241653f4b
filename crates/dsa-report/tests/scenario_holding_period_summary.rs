//! Holding-period aggregation over an engine run.
//!
//! Validates that:
//! - stats are grouped per holding period, ascending, with count per group
//! - mean / median / cumulative match hand-computed values
//! - the optimal day follows mean net gain, annualized over distinct years
//! - the annual pivot zero-fills missing (year, day) cells
//! - a degenerate (non-finite) trade is counted but left out of the stats

use chrono::NaiveDate;
use dsa_backtest::{run_scalp, ScalpConfig, TradeRecord};
use dsa_md::{DividendEvent, PricePoint, PriceSeries};
use dsa_report::{
    annual_net_gains, select_optimal, summarize, years_spanned, Analysis, MeanNetGain,
    RankingKind,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn record(ex: NaiveDate, days_held: u32, net: f64, div: f64) -> TradeRecord {
    TradeRecord {
        ex_date: ex,
        dividend: 0.5,
        buy_date: ex.pred_opt().unwrap(),
        buy_price: 50.0,
        days_held_after_ex_div: days_held,
        sell_date: ex,
        sell_price: 50.0,
        net_gain_pct: net,
        dividend_gain_pct: div,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn stats_per_holding_period() {
    let records = vec![
        record(d(2022, 3, 15), 1, 1.0, 1.0),
        record(d(2022, 3, 15), 2, 2.0, 1.0),
        record(d(2023, 3, 15), 1, 3.0, 0.9),
        record(d(2023, 3, 15), 2, -1.0, 0.9),
        record(d(2024, 3, 15), 1, 8.0, 0.8),
    ];

    let stats = summarize(&records);
    assert_eq!(stats.len(), 2);

    let day1 = &stats[0];
    assert_eq!(day1.days_held, 1);
    assert_eq!(day1.count, 3);
    assert!(approx(day1.mean_net_gain_pct, 4.0));
    assert_eq!(day1.median_net_gain_pct, 3.0);
    assert!(approx(day1.cumulative_net_gain_pct, 12.0));
    assert!(approx(day1.mean_dividend_gain_pct, 0.9));
    assert_eq!(day1.median_dividend_gain_pct, 0.9);

    let day2 = &stats[1];
    assert_eq!(day2.days_held, 2);
    assert_eq!(day2.count, 2);
    assert!(approx(day2.mean_net_gain_pct, 0.5));
    assert!(approx(day2.median_net_gain_pct, 0.5));
    assert!(approx(day2.cumulative_net_gain_pct, 1.0));

    let best = select_optimal(&stats, &records, &MeanNetGain, 5).unwrap();
    assert_eq!(best.days_held, 1);
    assert_eq!(best.years_spanned, 3);
    assert!(approx(best.avg_annual_gain_pct, 4.0));
    assert_eq!(years_spanned(&records, 5), 3);
}

#[test]
fn annual_pivot_zero_fills() {
    let records = vec![
        record(d(2022, 3, 15), 1, 1.0, 1.0),
        record(d(2022, 9, 15), 1, 2.5, 1.0),
        record(d(2022, 9, 15), 2, 2.0, 1.0),
        record(d(2023, 3, 15), 1, 3.0, 0.9),
    ];

    let table = annual_net_gains(&records);
    assert_eq!(table.days_held, vec![1, 2]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.get(2022, 1), Some(3.5));
    assert_eq!(table.get(2022, 2), Some(2.0));
    assert_eq!(table.get(2023, 1), Some(3.0));
    assert_eq!(table.get(2023, 2), Some(0.0));
    assert_eq!(table.get(2021, 1), None);
}

#[test]
fn analysis_over_engine_output() {
    let prices = PriceSeries::from_points(vec![
        PricePoint::new(d(2024, 1, 1), 100.0),
        PricePoint::new(d(2024, 1, 2), 102.0),
        PricePoint::new(d(2024, 1, 3), 101.0),
        PricePoint::new(d(2024, 1, 4), 105.0),
    ]);
    let divs = vec![DividendEvent::new(d(2024, 1, 3), 1.0)];
    let cfg = ScalpConfig {
        max_days: 2,
        ..ScalpConfig::default()
    };
    let report = run_scalp(&prices, &divs, &cfg).unwrap();

    let analysis = Analysis::build("KO", &report, RankingKind::MeanNetGain.rule(), 5);
    assert!(!analysis.is_unavailable());
    assert_eq!(analysis.summary.len(), 2);

    let best = analysis.optimal.as_ref().unwrap();
    assert_eq!(best.days_held, 2);
    assert_eq!(best.ranking, "mean_net_gain");
    assert_eq!(best.years_spanned, 1);
    assert!(approx(best.avg_annual_gain_pct, 400.0 / 102.0));
    assert_eq!(analysis.annual.rows.len(), 1);
}

#[test]
fn empty_report_has_no_optimal_strategy() {
    let report = run_scalp(&PriceSeries::default(), &[], &ScalpConfig::default()).unwrap();
    let analysis = Analysis::build("ZZZZ", &report, &MeanNetGain, 5);

    assert!(analysis.is_unavailable());
    assert!(analysis.summary.is_empty());
    assert!(analysis.optimal.is_none());
    assert!(analysis.annual.is_empty());
}

#[test]
fn non_finite_gains_do_not_poison_stats() {
    let records = vec![
        record(d(2022, 3, 10), 1, 2.0, 1.0),
        record(d(2023, 3, 10), 1, f64::NAN, f64::INFINITY),
        record(d(2024, 3, 10), 1, 4.0, 3.0),
    ];

    let stats = summarize(&records);
    assert_eq!(stats.len(), 1);
    let s = &stats[0];
    assert_eq!(s.count, 3);
    assert!(approx(s.mean_net_gain_pct, 3.0));
    assert!(approx(s.median_net_gain_pct, 3.0));
    assert!(approx(s.cumulative_net_gain_pct, 6.0));
    assert!(approx(s.mean_dividend_gain_pct, 2.0));
    assert!(approx(s.median_dividend_gain_pct, 2.0));

    let only_nan = summarize(&[record(d(2024, 3, 10), 2, f64::NAN, f64::NAN)]);
    assert_eq!(only_nan[0].count, 1);
    assert!(only_nan[0].mean_net_gain_pct.is_nan());
    assert_eq!(only_nan[0].cumulative_net_gain_pct, 0.0);
}
