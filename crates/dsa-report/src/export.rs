//! Rendering and export of an [`Analysis`].
//!
//! All rounding lives here: prices and net gain at 2 dp, dividend amount at
//! 4 dp. JSON output keeps the unrounded values.

use std::fmt::Write as _;
use std::io::{self, Write};

use chrono::NaiveDate;
use dsa_backtest::TradeRecord;
use serde::Serialize;

use crate::analysis::Analysis;

/// Shown instead of tables when the run had no analyzable history.
pub const UNAVAILABLE_MESSAGE: &str = "No data found or no dividends in the lookback window.";

/// Shown when data was available but no dividend event aligned to a session.
pub const NO_ALIGNED_EVENTS_MESSAGE: &str = "No dividend event aligned to a trading session.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(ExportFormat::Text),
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "export io error: {}", e),
            ExportError::Csv(e) => write!(f, "csv export error: {}", e),
            ExportError::Json(e) => write!(f, "json export error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            ExportError::Csv(e) => Some(e),
            ExportError::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(e: io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::Csv(e)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Json(e)
    }
}

// ---------------------------------------------------------------------------
// Transaction log (CSV)
// ---------------------------------------------------------------------------

const TRANSACTION_HEADER: [&str; 9] = [
    "ex_date",
    "dividend",
    "buy_date",
    "buy_price",
    "days_held_after_ex_div",
    "sell_date",
    "sell_price",
    "net_gain_pct",
    "dividend_gain_pct",
];

#[derive(Serialize)]
struct TransactionRow {
    ex_date: NaiveDate,
    dividend: String,
    buy_date: NaiveDate,
    buy_price: String,
    days_held_after_ex_div: u32,
    sell_date: NaiveDate,
    sell_price: String,
    net_gain_pct: String,
    dividend_gain_pct: String,
}

impl From<&TradeRecord> for TransactionRow {
    fn from(r: &TradeRecord) -> Self {
        Self {
            ex_date: r.ex_date,
            dividend: format!("{:.4}", r.dividend),
            buy_date: r.buy_date,
            buy_price: format!("{:.2}", r.buy_price),
            days_held_after_ex_div: r.days_held_after_ex_div,
            sell_date: r.sell_date,
            sell_price: format!("{:.2}", r.sell_price),
            net_gain_pct: format!("{:.2}", r.net_gain_pct),
            dividend_gain_pct: format!("{:.2}", r.dividend_gain_pct),
        }
    }
}

/// Write the transaction log. The header is written even with no records.
pub fn write_transactions_csv<W: Write>(records: &[TradeRecord], w: W) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(w);
    wtr.write_record(TRANSACTION_HEADER)?;
    for r in records {
        wtr.serialize(TransactionRow::from(r))?;
    }
    wtr.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

pub fn write_json<W: Write>(analysis: &Analysis, mut w: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut w, analysis)?;
    writeln!(w)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub fn render_text(analysis: &Analysis) -> String {
    let mut out = String::new();
    let _ = render_text_into(analysis, &mut out);
    out
}

fn render_text_into(a: &Analysis, out: &mut String) -> std::fmt::Result {
    writeln!(out, "Dividend scalping analysis: {}", a.ticker)?;

    if a.is_unavailable() {
        writeln!(out, "{}", UNAVAILABLE_MESSAGE)?;
        return Ok(());
    }
    if a.records.is_empty() {
        let diag = &a.diagnostics;
        writeln!(out, "{}", NO_ALIGNED_EVENTS_MESSAGE)?;
        writeln!(
            out,
            "events_seen={} skipped_not_in_calendar={} skipped_no_prior_session={}",
            diag.events_seen, diag.skipped_not_in_calendar, diag.skipped_no_prior_session
        )?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Holding period summary")?;
    writeln!(
        out,
        "{:>4}  {:>5}  {:>10}  {:>12}  {:>10}  {:>12}  {:>10}",
        "days", "count", "mean_net%", "median_net%", "mean_div%", "median_div%", "cum_net%"
    )?;
    for s in &a.summary {
        writeln!(
            out,
            "{:>4}  {:>5}  {:>10.2}  {:>12.2}  {:>10.2}  {:>12.2}  {:>10.2}",
            s.days_held,
            s.count,
            s.mean_net_gain_pct,
            s.median_net_gain_pct,
            s.mean_dividend_gain_pct,
            s.median_dividend_gain_pct,
            s.cumulative_net_gain_pct
        )?;
    }

    if let Some(best) = &a.optimal {
        writeln!(out)?;
        writeln!(out, "Optimal strategy (ranking={})", best.ranking)?;
        writeln!(out, "best_selling_day=Day {}", best.days_held)?;
        writeln!(out, "avg_net_gain_per_trade={:.2}%", best.mean_net_gain_pct)?;
        writeln!(
            out,
            "avg_annual_gain={:.2}% ({} years)",
            best.avg_annual_gain_pct, best.years_spanned
        )?;
    }

    if !a.annual.is_empty() {
        writeln!(out)?;
        writeln!(out, "Annual net gains (sum of net gain %)")?;
        write!(out, "{:>4}", "year")?;
        for d in &a.annual.days_held {
            write!(out, "  {:>8}", format!("day{}", d))?;
        }
        writeln!(out)?;
        for row in &a.annual.rows {
            write!(out, "{:>4}", row.year)?;
            for v in &row.net_gain_pct {
                write!(out, "  {:>8.2}", v)?;
            }
            writeln!(out)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Transaction log")?;
    writeln!(
        out,
        "{:<10}  {:>8}  {:<10}  {:>9}  {:>4}  {:<10}  {:>10}  {:>9}  {:>9}",
        "ex_date", "dividend", "buy_date", "buy", "days", "sell_date", "sell", "net%", "div%"
    )?;
    for r in &a.records {
        let row = TransactionRow::from(r);
        writeln!(
            out,
            "{:<10}  {:>8}  {:<10}  {:>9}  {:>4}  {:<10}  {:>10}  {:>9}  {:>9}",
            row.ex_date.to_string(),
            row.dividend,
            row.buy_date.to_string(),
            row.buy_price,
            row.days_held_after_ex_div,
            row.sell_date.to_string(),
            row.sell_price,
            row.net_gain_pct,
            row.dividend_gain_pct
        )?;
    }

    Ok(())
}

/// Write `analysis` in `format`.
///
/// An unavailable analysis still produces a well-formed document: the CSV
/// header only, the JSON with `data_unavailable` set, or the text message.
pub fn write_analysis<W: Write>(
    analysis: &Analysis,
    format: ExportFormat,
    mut w: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Text => {
            w.write_all(render_text(analysis).as_bytes())?;
            w.flush()?;
        }
        ExportFormat::Json => write_json(analysis, w)?,
        ExportFormat::Csv => write_transactions_csv(&analysis.records, w)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parse() {
        assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("txt"), Some(ExportFormat::Text));
        assert_eq!(ExportFormat::parse("xml"), None);
    }

    #[test]
    fn empty_log_still_has_header() {
        let mut buf = Vec::new();
        write_transactions_csv(&[], &mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(s.lines().count(), 1);
        assert!(s.starts_with("ex_date,dividend,buy_date"));
    }
}
