//! Ex-date alignment policy.
//!
//! Maps a dividend's ex-date onto positions in the trading-day series.
//!
//! # Policy variants
//!
//! - [`AlignmentPolicy::Strict`]: the ex-date must itself be a session. An
//!   event dated on a weekend, holiday or outside the fetched window is
//!   skipped entirely. No partial record, no shift.
//! - [`AlignmentPolicy::ForwardRoll`]: an ex-date that is not a session is
//!   moved to the first session after it. The buy session is still the one
//!   immediately before the (rolled) ex session.
//!
//! Under both policies the buy session must exist: an ex session at position 0
//! cannot be bought into and is skipped.

use std::fmt;

use chrono::NaiveDate;
use dsa_md::PriceSeries;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// How an ex-date that is not a trading session is handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Skip the event.
    #[default]
    Strict,
    /// Use the next session on or after the ex-date.
    #[serde(alias = "forward-roll")]
    ForwardRoll,
}

impl AlignmentPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignmentPolicy::Strict => "strict",
            AlignmentPolicy::ForwardRoll => "forward_roll",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(AlignmentPolicy::Strict),
            "forward_roll" | "forward-roll" | "roll" => Some(AlignmentPolicy::ForwardRoll),
            _ => None,
        }
    }

    /// Resolve `ex_date` to an [`ExAnchor`] in `prices`, or the reason it cannot be.
    pub fn locate(&self, prices: &PriceSeries, ex_date: NaiveDate) -> Result<ExAnchor, SkipReason> {
        let (ex_idx, rolled) = match (prices.position(ex_date), self) {
            (Some(i), _) => (i, false),
            (None, AlignmentPolicy::Strict) => return Err(SkipReason::NotInCalendar),
            (None, AlignmentPolicy::ForwardRoll) => match prices.first_at_or_after(ex_date) {
                Some(i) => (i, true),
                None => return Err(SkipReason::NotInCalendar),
            },
        };

        if ex_idx == 0 {
            return Err(SkipReason::NoPriorSession);
        }

        Ok(ExAnchor {
            ex_idx,
            buy_idx: ex_idx - 1,
            rolled,
        })
    }
}

impl fmt::Display for AlignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Anchor / skip reason
// ---------------------------------------------------------------------------

/// Positions of an aligned event in the price series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExAnchor {
    /// Position of the ex session (sell position for holding period 1).
    pub ex_idx: usize,
    /// Position of the buy session, always `ex_idx - 1`.
    pub buy_idx: usize,
    /// `true` when the ex-date itself was not a session and was rolled forward.
    pub rolled: bool,
}

/// Why an event produced no records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The ex-date could not be mapped to a session.
    NotInCalendar,
    /// The ex session is the first session in the series; there is nothing to buy on.
    NoPriorSession,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotInCalendar => f.write_str("ex-date is not a trading session"),
            SkipReason::NoPriorSession => f.write_str("no session before the ex session"),
        }
    }
}
