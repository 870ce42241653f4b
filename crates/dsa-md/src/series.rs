//! Normalized series consumed by the backtest engine.
//!
//! Both types are keyed by civil date (no time of day, no offset). Getting an
//! instant onto that calendar is the normalizer's job; nothing here knows about
//! timezones.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Price series
// ---------------------------------------------------------------------------

/// One close price for one trading session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Trading-day close series, ascending by date with unique dates.
///
/// Weekends and holidays are absent by construction: a date is a session
/// if and only if it has a point here. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from points in any order.
    ///
    /// Points are sorted by date; when a date appears more than once the
    /// last occurrence in input order wins.
    pub fn from_points(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points.into_iter().collect();
        // Stable sort keeps input order within a date, so "last wins" is well defined.
        points.sort_by_key(|p| p.date);

        let mut out: Vec<PricePoint> = Vec::with_capacity(points.len());
        for p in points {
            match out.last_mut() {
                Some(prev) if prev.date == p.date => *prev = p,
                _ => out.push(p),
            }
        }
        Self { points: out }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn get(&self, idx: usize) -> Option<&PricePoint> {
        self.points.get(idx)
    }

    /// Index of the session on `date`, if `date` is a session.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.points.binary_search_by_key(&date, |p| p.date).ok()
    }

    /// Index of the first session on or after `date`.
    pub fn first_at_or_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.points.partition_point(|p| p.date < date);
        (idx < self.points.len()).then_some(idx)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

// ---------------------------------------------------------------------------
// Dividend events
// ---------------------------------------------------------------------------

/// A dividend payment keyed by its ex-dividend date.
///
/// `amount` is passed through as reported. Zero or negative values are not
/// filtered here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    pub ex_date: NaiveDate,
    pub amount: f64,
}

impl DividendEvent {
    pub fn new(ex_date: NaiveDate, amount: f64) -> Self {
        Self { ex_date, amount }
    }
}
