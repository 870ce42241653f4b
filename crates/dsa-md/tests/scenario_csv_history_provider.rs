//! CSV history provider scenarios.
//!
//! Validates that:
//! - rows outside the request window are dropped
//! - yfinance-style offset timestamps and plain dates align after normalization
//! - a missing file is a transport error, a bad cell is a decode error

use std::io::Write;

use chrono::NaiveDate;
use dsa_md::{
    normalize_history, CsvHistoryProvider, FetchRequest, HistoryProvider, PriceField,
    ProviderError,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

fn request(start: NaiveDate, end: NaiveDate) -> FetchRequest {
    FetchRequest {
        ticker: "KO".to_string(),
        start,
        end,
        price_field: PriceField::AdjClose,
    }
}

#[tokio::test]
async fn window_filter_and_mixed_date_shapes_align() {
    let dir = tempfile::tempdir().unwrap();
    let prices = write_file(
        &dir,
        "prices.csv",
        "date,close\n\
         2023-12-29,58.9\n\
         2024-01-02,59.5\n\
         2024-01-03,59.8\n\
         2024-01-04,60.1\n",
    );
    let divs = write_file(
        &dir,
        "dividends.csv",
        "Date,Amount\n\
         2023-11-30 00:00:00-05:00,0.46\n\
         2024-01-03 00:00:00-05:00,0.485\n",
    );

    let p = CsvHistoryProvider::new(prices, divs);
    let raw = p
        .fetch_history(&request(d(2024, 1, 1), d(2024, 12, 31)))
        .await
        .unwrap();

    assert_eq!(raw.ticker, "KO");
    assert_eq!(raw.closes.len(), 3, "2023-12-29 is outside the window");
    assert_eq!(raw.dividends.len(), 1, "2023-11-30 is outside the window");

    let n = normalize_history(&raw);
    assert_eq!(n.prices.position(d(2024, 1, 3)), Some(1));
    assert_eq!(n.dividends[0].ex_date, d(2024, 1, 3));
}

#[tokio::test]
async fn missing_file_is_transport_error() {
    let dir = tempfile::tempdir().unwrap();
    let divs = write_file(&dir, "dividends.csv", "date,amount\n");
    let p = CsvHistoryProvider::new(dir.path().join("nope.csv"), divs);

    let err = p
        .fetch_history(&request(d(2024, 1, 1), d(2024, 12, 31)))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn bad_close_cell_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let prices = write_file(&dir, "prices.csv", "date,close\n2024-01-02,n/a\n");
    let divs = write_file(&dir, "dividends.csv", "date,amount\n");
    let p = CsvHistoryProvider::new(prices, divs);

    let err = p
        .fetch_history(&request(d(2024, 1, 1), d(2024, 12, 31)))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn empty_files_yield_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let prices = write_file(&dir, "prices.csv", "date,close\n");
    let divs = write_file(&dir, "dividends.csv", "date,amount\n");
    let p = CsvHistoryProvider::new(prices, divs);

    let raw = p
        .fetch_history(&request(d(2024, 1, 1), d(2024, 12, 31)))
        .await
        .unwrap();
    assert!(raw.closes.is_empty());
    assert!(raw.dividends.is_empty());
}
