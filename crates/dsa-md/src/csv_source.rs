//! Offline provider backed by two CSV files.
//!
//! ## Column contract (header names case-insensitive, order-independent)
//!
//! | File      | Columns          | Example                                   |
//! |-----------|------------------|-------------------------------------------|
//! | prices    | `date`, `close`  | `2024-03-14,60.10`                        |
//! | dividends | `date`, `amount` | `2024-03-14 00:00:00-04:00,0.485`         |
//!
//! `date` accepts `YYYY-MM-DD` (read as midnight, offset +00:00),
//! `YYYY-MM-DD HH:MM:SS±HH:MM` and RFC 3339. An empty `close` is a null
//! session. Rows whose civil date falls outside the request window are dropped.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

use crate::provider::{
    FetchRequest, HistoryProvider, ProviderError, RawClose, RawDividend, RawHistory,
};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced while reading history CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvHistoryError {
    /// An I/O or CSV-library error.
    Io(String),
    /// The header row is missing a required column.
    MissingHeader(&'static str),
    /// A record field could not be parsed into the expected type.
    ParseField {
        row: usize,
        field: &'static str,
        raw: String,
    },
}

impl fmt::Display for CsvHistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvHistoryError::Io(msg) => write!(f, "csv io error: {msg}"),
            CsvHistoryError::MissingHeader(col) => {
                write!(f, "csv missing required header column: '{col}'")
            }
            CsvHistoryError::ParseField { row, field, raw } => {
                write!(
                    f,
                    "csv row {row}: cannot parse field '{field}' from value '{raw}'"
                )
            }
        }
    }
}

impl std::error::Error for CsvHistoryError {}

impl From<CsvHistoryError> for ProviderError {
    fn from(e: CsvHistoryError) -> Self {
        match e {
            CsvHistoryError::Io(msg) => ProviderError::Transport(msg),
            other => ProviderError::Decode(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a price CSV (`date,close`) from any reader.
pub fn parse_closes<R: Read>(rdr: R) -> Result<Vec<RawClose>, CsvHistoryError> {
    let mut out = Vec::new();
    for_each_row(rdr, "close", |row, at, raw| {
        let close = if raw.is_empty() {
            None
        } else {
            Some(raw.parse::<f64>().map_err(|_| CsvHistoryError::ParseField {
                row,
                field: "close",
                raw: raw.to_string(),
            })?)
        };
        out.push(RawClose { at, close });
        Ok(())
    })?;
    Ok(out)
}

/// Parse a dividend CSV (`date,amount`) from any reader.
pub fn parse_dividends<R: Read>(rdr: R) -> Result<Vec<RawDividend>, CsvHistoryError> {
    let mut out = Vec::new();
    for_each_row(rdr, "amount", |row, at, raw| {
        let amount = raw.parse::<f64>().map_err(|_| CsvHistoryError::ParseField {
            row,
            field: "amount",
            raw: raw.to_string(),
        })?;
        out.push(RawDividend { at, amount });
        Ok(())
    })?;
    Ok(out)
}

fn for_each_row<R, F>(rdr: R, value_col: &'static str, mut f: F) -> Result<(), CsvHistoryError>
where
    R: Read,
    F: FnMut(usize, DateTime<FixedOffset>, &str) -> Result<(), CsvHistoryError>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(rdr);

    let headers = reader
        .headers()
        .map_err(|e| CsvHistoryError::Io(e.to_string()))?
        .clone();
    let idx: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim_start_matches('\u{feff}').to_ascii_lowercase(), i))
        .collect();

    let col_date = *idx
        .get("date")
        .ok_or(CsvHistoryError::MissingHeader("date"))?;
    let col_value = *idx
        .get(value_col)
        .ok_or(CsvHistoryError::MissingHeader(value_col))?;

    for (i, rec) in reader.records().enumerate() {
        let row = i + 2; // 1-based, header is row 1
        let rec = rec.map_err(|e| CsvHistoryError::Io(e.to_string()))?;

        let date_raw = rec.get(col_date).unwrap_or("");
        if date_raw.is_empty() {
            continue;
        }
        let at = parse_stamp(date_raw).ok_or_else(|| CsvHistoryError::ParseField {
            row,
            field: "date",
            raw: date_raw.to_string(),
        })?;

        f(row, at, rec.get(col_value).unwrap_or(""))?;
    }
    Ok(())
}

/// Parse a date cell, keeping whatever offset it was written with.
pub fn parse_stamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc().fixed_offset())
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// [`HistoryProvider`] reading `date,close` and `date,amount` files from disk.
#[derive(Debug, Clone)]
pub struct CsvHistoryProvider {
    prices_path: PathBuf,
    dividends_path: PathBuf,
}

impl CsvHistoryProvider {
    pub fn new(prices_path: impl Into<PathBuf>, dividends_path: impl Into<PathBuf>) -> Self {
        Self {
            prices_path: prices_path.into(),
            dividends_path: dividends_path.into(),
        }
    }

    fn open(path: &Path) -> Result<std::fs::File, CsvHistoryError> {
        std::fs::File::open(path)
            .map_err(|e| CsvHistoryError::Io(format!("open '{}': {e}", path.display())))
    }
}

#[async_trait::async_trait]
impl HistoryProvider for CsvHistoryProvider {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_history(&self, req: &FetchRequest) -> Result<RawHistory, ProviderError> {
        let in_window = |at: &DateTime<FixedOffset>| {
            let d = at.date_naive();
            d >= req.start && d <= req.end
        };

        let closes = parse_closes(Self::open(&self.prices_path)?)?
            .into_iter()
            .filter(|c| in_window(&c.at))
            .collect();
        let dividends = parse_dividends(Self::open(&self.dividends_path)?)?
            .into_iter()
            .filter(|d| in_window(&d.at))
            .collect();

        Ok(RawHistory {
            ticker: req.ticker.clone(),
            closes,
            dividends,
        })
    }
}
