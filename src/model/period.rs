//! Calendar-month reporting periods.

use anyhow::Context;
use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month expressed as the half-open date range `[start, end)`, where `end` is the
/// first day of the following month.
///
/// ```
/// # use erp_finance::model::Period;
/// # use std::str::FromStr;
/// let period = Period::from_str("2026-12").unwrap();
/// assert_eq!(period.start().to_string(), "2026-12-01");
/// assert_eq!(period.end().to_string(), "2027-01-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// The month that contains `date`.
    pub fn month_containing(date: NaiveDate) -> crate::Result<Self> {
        let start = date - Days::new(u64::from(date.day0()));
        let end = start
            .checked_add_months(Months::new(1))
            .with_context(|| format!("No month follows {start}"))?;
        Ok(Self { start, end })
    }

    /// The month that contains today's date in the local timezone.
    pub fn current() -> crate::Result<Self> {
        Self::month_containing(Local::now().date_naive())
    }

    /// The first day of the month.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The first day of the following month (exclusive bound).
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start.format("%Y-%m"))
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let first = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .with_context(|| format!("'{trimmed}' is not a month, expected YYYY-MM"))?;
        Self::month_containing(first)
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_containing_mid_month() {
        let period = Period::month_containing(date(2026, 10, 19)).unwrap();
        assert_eq!(period.start(), date(2026, 10, 1));
        assert_eq!(period.end(), date(2026, 11, 1));
        assert_eq!(period.to_string(), "2026-10");
    }

    #[test]
    fn test_month_containing_first_and_last_day() {
        let first = Period::month_containing(date(2024, 2, 1)).unwrap();
        let last = Period::month_containing(date(2024, 2, 29)).unwrap();
        assert_eq!(first, last);
        assert_eq!(first.end(), date(2024, 3, 1));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let period = Period::month_containing(date(2025, 12, 31)).unwrap();
        assert_eq!(period.end(), date(2026, 1, 1));
    }

    #[test]
    fn test_contains_excludes_adjacent_months() {
        let period = Period::from_str("2026-10").unwrap();
        assert!(period.contains(date(2026, 10, 1)));
        assert!(period.contains(date(2026, 10, 31)));
        assert!(!period.contains(date(2026, 9, 30)));
        assert!(!period.contains(date(2026, 11, 1)));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Period::from_str("2026-13").is_err());
        assert!(Period::from_str("october").is_err());
        assert!(Period::from_str("").is_err());
    }

    #[test]
    fn test_serialize_as_label() {
        let period = Period::from_str("2026-03").unwrap();
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"2026-03\"");
    }
}
