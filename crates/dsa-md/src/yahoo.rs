//! Yahoo Finance chart-endpoint provider.
//!
//! One request per ticker: `GET {base}/v8/finance/chart/{ticker}` with daily
//! interval and dividend events enabled. Timestamps are epoch seconds; they
//! are annotated with the exchange timezone from `meta` so the normalizer sees
//! exchange-local dates.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveTime, Offset, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::provider::{
    FetchRequest, HistoryProvider, PriceField, ProviderError, RawClose, RawDividend, RawHistory,
};

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) dsa/0.1";

/// Yahoo chart-endpoint provider.
#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new() -> Result<Self, ProviderError> {
        Self::new_with_base_url(YAHOO_BASE_URL.to_string(), Duration::from_secs(30))
    }

    pub fn new_with_base_url(base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Config(format!("http client build failed: {e}")))?;
        Ok(Self { http, base_url })
    }

    fn build_chart_url(&self, ticker: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            ticker
        )
    }
}

#[async_trait::async_trait]
impl HistoryProvider for YahooChartProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_history(&self, req: &FetchRequest) -> Result<RawHistory, ProviderError> {
        let period1 = req.start.and_time(NaiveTime::MIN).and_utc().timestamp();
        // Inclusive end: ask for everything up to the start of the following day.
        let period2 = req.end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_400;

        let resp = self
            .http
            .get(self.build_chart_url(&req.ticker))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("yahoo request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("yahoo body read failed: {e}")))?;

        // Yahoo reports errors inside the same envelope, often with a 4xx status.
        let envelope: ChartEnvelope = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) if status.is_success() => {
                return Err(ProviderError::Decode(format!("yahoo chart json: {e}")))
            }
            Err(_) => {
                return Err(ProviderError::Api {
                    code: Some(status.as_u16().to_string()),
                    message: "http error with undecodable body".to_string(),
                })
            }
        };

        decode_chart(&req.ticker, req.price_field, envelope)
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn decode_chart(
    ticker: &str,
    price_field: PriceField,
    envelope: ChartEnvelope,
) -> Result<RawHistory, ProviderError> {
    if let Some(err) = envelope.chart.error {
        return Err(ProviderError::Api {
            code: err.code,
            message: err.description.unwrap_or_else(|| "unknown".to_string()),
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| ProviderError::NotFound(ticker.to_string()))?;

    let offset_at = exchange_offset(&result.meta);

    let closes_col: Vec<Option<f64>> = match price_field {
        PriceField::AdjClose => result
            .indicators
            .adjclose
            .and_then(|mut v| if v.is_empty() { None } else { Some(v.swap_remove(0).adjclose) })
            .ok_or_else(|| ProviderError::Decode("missing adjclose indicator".to_string()))?,
        PriceField::Close => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .ok_or_else(|| ProviderError::Decode("missing quote indicator".to_string()))?,
    };

    if closes_col.len() != result.timestamp.len() {
        return Err(ProviderError::Decode(format!(
            "close column length {} != timestamp length {}",
            closes_col.len(),
            result.timestamp.len()
        )));
    }

    let mut closes = Vec::with_capacity(result.timestamp.len());
    for (ts, close) in result.timestamp.iter().zip(closes_col) {
        closes.push(RawClose {
            at: annotate(*ts, &offset_at)?,
            close,
        });
    }

    let mut dividends = Vec::new();
    if let Some(events) = result.events {
        // Keys are epoch-second strings; BTreeMap order is lexical, normalizer sorts by date.
        for payload in events.dividends.into_values() {
            dividends.push(RawDividend {
                at: annotate(payload.date, &offset_at)?,
                amount: payload.amount,
            });
        }
    }

    Ok(RawHistory {
        ticker: ticker.to_string(),
        closes,
        dividends,
    })
}

/// Offset resolver for the exchange: named zone if known, else fixed gmtoffset, else UTC.
enum ExchangeOffset {
    Named(Tz),
    Fixed(FixedOffset),
}

fn exchange_offset(meta: &ChartMeta) -> ExchangeOffset {
    if let Some(tz) = meta
        .exchange_timezone_name
        .as_deref()
        .and_then(|n| n.parse::<Tz>().ok())
    {
        return ExchangeOffset::Named(tz);
    }
    let fixed = meta
        .gmtoffset
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    ExchangeOffset::Fixed(fixed)
}

fn annotate(ts: i64, offset: &ExchangeOffset) -> Result<DateTime<FixedOffset>, ProviderError> {
    let utc = DateTime::<Utc>::from_timestamp(ts, 0)
        .ok_or_else(|| ProviderError::Decode(format!("timestamp out of range: {ts}")))?;
    Ok(match offset {
        ExchangeOffset::Named(tz) => utc.with_timezone(tz).fixed_offset(),
        ExchangeOffset::Fixed(f) => utc.with_timezone(f),
    })
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    events: Option<ChartEvents>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(rename = "exchangeTimezoneName")]
    exchange_timezone_name: Option<String>,
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: BTreeMap<String, DividendPayload>,
}

#[derive(Debug, Deserialize)]
struct DividendPayload {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
    adjclose: Option<Vec<AdjCloseBlock>>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str, field: PriceField) -> Result<RawHistory, ProviderError> {
        let env: ChartEnvelope = serde_json::from_str(json).unwrap();
        decode_chart("KO", field, env)
    }

    const SAMPLE: &str = r#"{
      "chart": {
        "result": [{
          "meta": { "exchangeTimezoneName": "America/New_York", "gmtoffset": -14400 },
          "timestamp": [1710423000, 1710509400],
          "events": { "dividends": { "1710423000": { "amount": 0.485, "date": 1710423000 } } },
          "indicators": {
            "quote": [{ "close": [60.10, null] }],
            "adjclose": [{ "adjclose": [58.90, 59.40] }]
          }
        }],
        "error": null
      }
    }"#;

    #[test]
    fn decodes_closes_in_exchange_timezone() {
        let h = decode(SAMPLE, PriceField::Close).unwrap();
        assert_eq!(h.closes.len(), 2);
        // 2024-03-14 13:30 UTC is 09:30 in New York (EDT).
        assert_eq!(h.closes[0].at.to_rfc3339(), "2024-03-14T09:30:00-04:00");
        assert_eq!(h.closes[0].close, Some(60.10));
        assert_eq!(h.closes[1].close, None);
        assert_eq!(h.dividends.len(), 1);
        assert_eq!(h.dividends[0].amount, 0.485);
    }

    #[test]
    fn adj_close_column_selected() {
        let h = decode(SAMPLE, PriceField::AdjClose).unwrap();
        assert_eq!(h.closes[1].close, Some(59.40));
    }

    #[test]
    fn chart_error_maps_to_api_error() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        match decode(json, PriceField::Close) {
            Err(ProviderError::Api { code, .. }) => assert_eq!(code.as_deref(), Some("Not Found")),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn empty_result_is_not_found() {
        let json = r#"{"chart":{"result":[],"error":null}}"#;
        assert_eq!(
            decode(json, PriceField::Close),
            Err(ProviderError::NotFound("KO".to_string()))
        );
    }

    #[test]
    fn unknown_zone_falls_back_to_gmtoffset() {
        let json = r#"{"chart":{"result":[{
            "meta": { "exchangeTimezoneName": "Not/AZone", "gmtoffset": 3600 },
            "timestamp": [1710403200],
            "indicators": { "quote": [{ "close": [10.0] }] }
        }],"error":null}}"#;
        let h = decode(json, PriceField::Close).unwrap();
        assert_eq!(h.closes[0].at.offset().local_minus_utc(), 3600);
        assert!(h.dividends.is_empty());
    }

    #[test]
    fn column_length_mismatch_is_decode_error() {
        let json = r#"{"chart":{"result":[{
            "meta": {},
            "timestamp": [1710403200, 1710489600],
            "indicators": { "quote": [{ "close": [10.0] }] }
        }],"error":null}}"#;
        assert!(matches!(
            decode(json, PriceField::Close),
            Err(ProviderError::Decode(_))
        ));
    }
}
