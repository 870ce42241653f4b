//! Empty inputs are reported, not raised.
//!
//! Validates that:
//! - an empty price series yields zero records tagged EmptyPrices
//! - an empty dividend list yields zero records tagged EmptyDividends
//! - empty prices are reported first when both inputs are empty
//! - a non-empty run whose events all skip is NOT tagged unavailable

use chrono::NaiveDate;
use dsa_backtest::{run_scalp, DataUnavailable, ScalpConfig};
use dsa_md::{DividendEvent, PricePoint, PriceSeries};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn empty_prices_is_data_unavailable() {
    let divs = vec![DividendEvent::new(d(2024, 3, 14), 0.485)];
    let report = run_scalp(&PriceSeries::default(), &divs, &ScalpConfig::default()).unwrap();

    assert!(report.is_empty());
    assert_eq!(report.data_unavailable, Some(DataUnavailable::EmptyPrices));
    assert_eq!(report.diagnostics.events_seen, 0);
}

#[test]
fn empty_dividends_is_data_unavailable() {
    let prices = PriceSeries::from_points(vec![
        PricePoint::new(d(2024, 3, 13), 60.1),
        PricePoint::new(d(2024, 3, 14), 59.7),
    ]);
    let report = run_scalp(&prices, &[], &ScalpConfig::default()).unwrap();

    assert!(report.is_empty());
    assert_eq!(
        report.data_unavailable,
        Some(DataUnavailable::EmptyDividends)
    );
}

#[test]
fn both_empty_reports_prices_first() {
    let report = run_scalp(&PriceSeries::default(), &[], &ScalpConfig::default()).unwrap();
    assert_eq!(report.data_unavailable, Some(DataUnavailable::EmptyPrices));
}

#[test]
fn all_events_skipped_is_an_ordinary_empty_report() {
    let prices = PriceSeries::from_points(vec![
        PricePoint::new(d(2024, 3, 13), 60.1),
        PricePoint::new(d(2024, 3, 14), 59.7),
    ]);
    // Before the first session and after the last one.
    let divs = vec![
        DividendEvent::new(d(2023, 11, 30), 0.46),
        DividendEvent::new(d(2024, 6, 13), 0.485),
    ];
    let report = run_scalp(&prices, &divs, &ScalpConfig::default()).unwrap();

    assert!(report.is_empty());
    assert!(report.data_unavailable.is_none());
    assert_eq!(report.diagnostics.events_seen, 2);
    assert_eq!(report.diagnostics.skipped(), 2);
}

#[test]
fn unavailable_reason_serializes_with_kind_tag() {
    let v = serde_json::to_value(DataUnavailable::Fetch("boom".to_string())).unwrap();
    assert_eq!(v["kind"], "fetch");
    assert_eq!(v["detail"], "boom");

    let v = serde_json::to_value(DataUnavailable::EmptyDividends).unwrap();
    assert_eq!(v["kind"], "empty_dividends");
}
