//! Calendar month used to scope the category breakdown.

use core::str::FromStr;

use chrono::{DateTime, Datelike as _, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, Result};

/// A calendar month (`year` + `month` in `1..=12`), evaluated in UTC.
///
/// Decoding validates the month like [`ReferenceMonth::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMonth")]
pub struct ReferenceMonth {
    /// Calendar year.
    year: i32,
    /// Month number, `1..=12`.
    month: u32,
}

/// Unvalidated wire form of [`ReferenceMonth`].
#[derive(Debug, Deserialize)]
struct RawMonth {
    /// Calendar year.
    year: i32,
    /// Month number as stored.
    month: u32,
}

impl TryFrom<RawMonth> for ReferenceMonth {
    type Error = FinanceError;

    #[inline]
    fn try_from(raw: RawMonth) -> Result<Self> {
        Self::new(raw.year, raw.month)
    }
}

impl ReferenceMonth {
    /// Creates a reference month.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::InvalidMonth`] if `month` is not in `1..=12`.
    #[inline]
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(FinanceError::InvalidMonth(format!("{year}-{month}")));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given date.
    #[inline]
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month in UTC.
    #[inline]
    #[must_use]
    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    /// Calendar year.
    #[inline]
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month number, `1..=12`.
    #[inline]
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// The following month, rolling over into the next year.
    ///
    /// December of [`i32::MAX`] has no successor and is returned unchanged.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month < 12 {
            return Self {
                year: self.year,
                month: self.month + 1,
            };
        }
        match self.year.checked_add(1) {
            Some(year) => Self { year, month: 1 },
            None => self,
        }
    }

    /// The preceding month, rolling back into the previous year.
    ///
    /// January of [`i32::MIN`] has no predecessor and is returned unchanged.
    #[inline]
    #[must_use]
    pub const fn prev(self) -> Self {
        if self.month > 1 {
            return Self {
                year: self.year,
                month: self.month - 1,
            };
        }
        match self.year.checked_sub(1) {
            Some(year) => Self { year, month: 12 },
            None => self,
        }
    }

    /// Returns `true` if the timestamp falls within this month (UTC).
    #[inline]
    #[must_use]
    pub fn contains(self, timestamp: &DateTime<Utc>) -> bool {
        timestamp.year() == self.year && timestamp.month() == self.month
    }
}

impl FromStr for ReferenceMonth {
    type Err = FinanceError;

    /// Parses `YYYY-MM`.
    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FinanceError::InvalidMonth(s.to_owned());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_err| invalid())?;
        let month: u32 = month.parse().map_err(|_err| invalid())?;
        Self::new(year, month).map_err(|_err| invalid())
    }
}

impl core::fmt::Display for ReferenceMonth {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
