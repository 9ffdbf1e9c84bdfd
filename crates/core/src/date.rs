//! Date-only calendar value.
//!
//! `CalendarDate` is a year/month/day triple with no time-of-day and no
//! timezone. Two dates subtract as whole calendar days regardless of the
//! machine's local timezone, which is what every expiry computation relies on.
//!
//! The only way to get a `CalendarDate` out of a timestamp is
//! [`CalendarDate::from_datetime`] / [`CalendarDate::today_in`], both of which
//! resolve the timestamp in an explicit offset and then drop the time part.

use core::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const WIRE_FORMAT: &str = "%Y-%m-%d";

/// A pure calendar date (no time, no offset).
///
/// Serialized as `YYYY-MM-DD`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build a date from a `(year, month, day)` triple.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DomainError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "{year:04}-{month:02}-{day:02} is not a valid calendar date"
                ))
            })
    }

    /// The calendar day of `at` as observed in `at`'s own offset.
    pub fn from_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Self(at.date_naive())
    }

    /// Today's calendar day as observed at `offset`, read from the wall clock.
    ///
    /// Domain code never calls this; it is meant for the outermost caller that
    /// has to decide what "today" is for a request.
    pub fn today_in(offset: FixedOffset) -> Self {
        Self::from_datetime(&Utc::now().with_timezone(&offset))
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Plain day arithmetic. Saturates at the representable range instead of
    /// overflowing.
    pub fn add_days(self, days: i64) -> Self {
        let shifted = Duration::try_days(days).and_then(|d| self.0.checked_add_signed(d));
        match shifted {
            Some(date) => Self(date),
            None if days >= 0 => Self(NaiveDate::MAX),
            None => Self(NaiveDate::MIN),
        }
    }

    /// Signed number of whole calendar days from `self` to `other`.
    ///
    /// Positive when `other` is later than `self`.
    pub fn days_until(self, other: CalendarDate) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }
}

impl core::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.format(WIRE_FORMAT))
    }
}

impl FromStr for CalendarDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), WIRE_FORMAT)
            .map(Self)
            .map_err(|e| DomainError::validation(format!("invalid date {s:?} (expected YYYY-MM-DD): {e}")))
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalendarDate> for String {
    fn from(value: CalendarDate) -> Self {
        value.to_string()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl From<CalendarDate> for NaiveDate {
    fn from(value: CalendarDate) -> Self {
        value.0
    }
}
