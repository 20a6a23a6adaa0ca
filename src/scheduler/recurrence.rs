//! Recurring-series date expansion.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Error for a missing or out-of-order `repeat_until` on a non-single
/// cadence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid recurrence: {reason}")]
pub struct InvalidRecurrence {
    pub reason: String,
}

impl InvalidRecurrence {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Recurrence pattern used to expand one scheduling request into session
/// dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// Exactly one date.
    Single,
    /// Every date from start to `repeat_until`, inclusive.
    Daily,
    /// Every 7th date from start to `repeat_until`, inclusive.
    Weekly,
}

impl Cadence {
    fn step_days(&self) -> u64 {
        match self {
            Cadence::Single => 0,
            Cadence::Daily => 1,
            Cadence::Weekly => 7,
        }
    }
}

impl FromStr for Cadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "once" => Ok(Self::Single),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            _ => Err(format!("Unknown cadence: {}", s)),
        }
    }
}

/// Expand a start date and cadence into the ordered, finite sequence of
/// candidate dates.
///
/// The start date is always the first element. For `Single` the
/// `repeat_until` bound is ignored; for `Daily`/`Weekly` it is required,
/// must not precede the start, and is itself included when the step lands
/// on it.
pub fn expand(
    start: NaiveDate,
    cadence: Cadence,
    repeat_until: Option<NaiveDate>,
) -> Result<Vec<NaiveDate>, InvalidRecurrence> {
    if cadence == Cadence::Single {
        return Ok(vec![start]);
    }

    let until = repeat_until.ok_or_else(|| {
        InvalidRecurrence::new("repeat_until is required for a recurring cadence")
    })?;
    if until < start {
        return Err(InvalidRecurrence::new(format!(
            "repeat_until {} precedes start date {}",
            until, start
        )));
    }

    let step = Days::new(cadence.step_days());
    let mut dates = Vec::new();
    let mut current = start;
    while current <= until {
        dates.push(current);
        current = match current.checked_add_days(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(dates)
}
