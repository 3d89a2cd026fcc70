use chrono::{Days, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::services::AccountError;

/// How long an account stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Number of days from today. The account stays usable through the
    /// last day, so the stored expiration is `today + days + 1`.
    Days(u32),

    /// Explicit expiration date.
    Until(NaiveDate),
}

impl Lifetime {
    /// Parses a day count (`"30"`) or an ISO-8601 date (`"2025-06-30"`).
    pub fn parse(input: &str) -> Result<Self, AccountError> {
        let input = input.trim();

        if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
            return input
                .parse::<u32>()
                .map(Self::Days)
                .map_err(|e| AccountError::InvalidLifetime(format!("{input}: {e}")));
        }

        Self::from_date_str(input)
    }

    /// Parses an ISO-8601 date. The string must pass [`check_date_format`]
    /// and name a real calendar day.
    pub fn from_date_str(input: &str) -> Result<Self, AccountError> {
        if !check_date_format(input) {
            return Err(AccountError::MalformedDate(input.to_string()));
        }

        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map(Self::Until)
            .map_err(|_| AccountError::MalformedDate(input.to_string()))
    }

    /// A zero day count carries no lifetime at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Days(0))
    }

    pub fn expiration_date(&self, today: NaiveDate) -> Result<NaiveDate, AccountError> {
        match *self {
            Self::Days(days) => today
                .checked_add_days(Days::new(u64::from(days) + 1))
                .ok_or_else(|| AccountError::InvalidLifetime(format!("{days} days is out of range"))),
            Self::Until(date) => Ok(date),
        }
    }
}

impl FromStr for Lifetime {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(days) => write!(f, "{days} days"),
            Self::Until(date) => write!(f, "until {date}"),
        }
    }
}

/// Shape check for `YYYY-MM-DD`: ten characters with dashes at offsets 4 and 7.
///
/// Does not look at the digits, so `"2024-13-40"` passes. Calendar validity is
/// enforced separately by [`Lifetime::from_date_str`].
#[must_use]
pub fn check_date_format(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-'
}
