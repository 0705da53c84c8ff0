//! Holding periods and date parsing/formatting helpers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::classifier::BusinessDayClassifier;
use crate::error::{CalcError, Result};

/// Canonical date key format (rate store, API payloads)
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Format used by the central bank rate feed ("dataCotacao")
pub const BR_FORMAT: &str = "%d/%m/%Y";

/// Calendar days from `start` to `end` (negative when `end < start`)
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Parse a date written either as `YYYY-MM-DD` or `DD/MM/YYYY`
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, ISO_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, BR_FORMAT))
        .map_err(|_| CalcError::Parse {
            input: input.to_string(),
            reason: "expected YYYY-MM-DD or DD/MM/YYYY".to_string(),
        })
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

pub fn format_br(date: NaiveDate) -> String {
    date.format(BR_FORMAT).to_string()
}

/// Investment holding period.
///
/// Accrual runs day-over-day: the start date is excluded and the end date
/// included, so a period of `n` calendar days accrues over exactly `n` dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl HoldingPeriod {
    /// Build a period, rejecting `end_date < start_date`
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if end_date < start_date {
            return Err(CalcError::invalid_range(
                "end_date",
                format!("end date {} is before start date {}", end_date, start_date),
            ));
        }
        Ok(Self { start_date, end_date })
    }

    pub fn total_calendar_days(&self) -> u32 {
        days_between(self.start_date, self.end_date) as u32
    }

    /// Business days in `(start_date, end_date]` according to `classifier`
    pub fn total_business_days<C: BusinessDayClassifier + ?Sized>(&self, classifier: &C) -> u32 {
        self.accrual_days()
            .filter(|&d| classifier.is_business_day(d))
            .count() as u32
    }

    /// Dates that accrue interest, in ascending order
    pub fn accrual_days(&self) -> AccrualDays {
        AccrualDays {
            next: self.start_date.succ_opt(),
            end: self.end_date,
        }
    }
}

/// Iterator over the half-open interval `(start, end]`
#[derive(Debug, Clone)]
pub struct AccrualDays {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for AccrualDays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|d| *d <= self.end)?;
        self.next = current.succ_opt();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekendCalendar;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_both_formats() {
        assert_eq!(parse_date("2023-07-03").unwrap(), d(2023, 7, 3));
        assert_eq!(parse_date("03/07/2023").unwrap(), d(2023, 7, 3));
        assert_eq!(parse_date(" 2023-07-03 ").unwrap(), d(2023, 7, 3));

        let err = parse_date("2023/07/03").unwrap_err();
        assert!(err.to_string().contains("2023/07/03"));
    }

    #[test]
    fn test_format_round_trip() {
        assert_eq!(format_br(d(2023, 1, 5)), "05/01/2023");
        assert_eq!(format_iso(d(2023, 1, 5)), "2023-01-05");
    }

    #[test]
    fn test_accrual_days_excludes_start() {
        let period = HoldingPeriod::new(d(2023, 7, 3), d(2023, 7, 6)).unwrap();
        let days: Vec<_> = period.accrual_days().collect();
        assert_eq!(days, vec![d(2023, 7, 4), d(2023, 7, 5), d(2023, 7, 6)]);
        assert_eq!(period.total_calendar_days(), 3);
    }

    #[test]
    fn test_empty_period() {
        let period = HoldingPeriod::new(d(2023, 7, 3), d(2023, 7, 3)).unwrap();
        assert_eq!(period.accrual_days().count(), 0);
        assert_eq!(period.total_calendar_days(), 0);
    }

    #[test]
    fn test_reversed_period_rejected() {
        let err = HoldingPeriod::new(d(2023, 7, 6), d(2023, 7, 3)).unwrap_err();
        assert!(matches!(err, CalcError::InvalidRange { .. }));
    }

    #[test]
    fn test_business_days_over_weekend() {
        // Mon 2023-07-03 to Sun 2023-07-09: Tue..Fri accrue
        let period = HoldingPeriod::new(d(2023, 7, 3), d(2023, 7, 9)).unwrap();
        assert_eq!(period.total_business_days(&WeekendCalendar), 4);
        assert_eq!(period.total_calendar_days(), 6);
    }
}
