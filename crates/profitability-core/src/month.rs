//! Calendar months as they appear in the `Mes` column.
//!
//! The input sheets use Portuguese three-letter abbreviations (`Jan`, `Fev`,
//! ..., `Dez`). Declaration order is calendar order, so the derived `Ord`
//! is the canonical month ordering used for sorting.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Fev,
    Mar,
    Abr,
    Mai,
    Jun,
    Jul,
    Ago,
    Set,
    Out,
    Nov,
    Dez,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Fev,
        Month::Mar,
        Month::Abr,
        Month::Mai,
        Month::Jun,
        Month::Jul,
        Month::Ago,
        Month::Set,
        Month::Out,
        Month::Nov,
        Month::Dez,
    ];

    /// Calendar number, Jan = 1 through Dez = 12.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(n: u32) -> Option<Month> {
        n.checked_sub(1)
            .and_then(|idx| Month::ALL.get(idx as usize).copied())
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Fev => "Fev",
            Month::Mar => "Mar",
            Month::Abr => "Abr",
            Month::Mai => "Mai",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Ago => "Ago",
            Month::Set => "Set",
            Month::Out => "Out",
            Month::Nov => "Nov",
            Month::Dez => "Dez",
        }
    }

    /// Month of any chrono date-like value.
    pub fn of<D: Datelike>(date: &D) -> Month {
        // month0() is always 0..=11
        Month::ALL[date.month0() as usize]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Unrecognised month label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthError(pub String);

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown month '{}'", self.0)
    }
}

impl std::error::Error for ParseMonthError {}

impl FromStr for Month {
    type Err = ParseMonthError;

    /// Exact abbreviation match after trimming. Case is not folded: the
    /// source sheets are generated with a fixed label set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Month::ALL
            .iter()
            .copied()
            .find(|m| m.abbreviation() == label)
            .ok_or_else(|| ParseMonthError(label.to_string()))
    }
}
