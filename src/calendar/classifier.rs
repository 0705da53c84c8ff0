//! Business-day classification

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Why a date does or does not accrue interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    /// Trading day; accrues the daily rate
    Business,
    /// Saturday or Sunday
    Weekend,
    /// National or market holiday falling on a weekday
    Holiday,
    /// Weekday the calendar has no data for
    Unknown,
}

impl DayKind {
    pub fn is_business_day(&self) -> bool {
        matches!(self, DayKind::Business)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayKind::Business => "business",
            DayKind::Weekend => "weekend",
            DayKind::Holiday => "holiday",
            DayKind::Unknown => "unknown",
        }
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Classifies calendar dates into business and non-business days.
///
/// Rate sources consult a classifier when a date has no recorded rate, which
/// is how "zero because holiday" is told apart from "missing data".
pub trait BusinessDayClassifier {
    fn classify(&self, date: NaiveDate) -> DayKind;

    fn is_business_day(&self, date: NaiveDate) -> bool {
        self.classify(date).is_business_day()
    }
}

impl<T: BusinessDayClassifier + ?Sized> BusinessDayClassifier for &T {
    fn classify(&self, date: NaiveDate) -> DayKind {
        (**self).classify(date)
    }
}

impl<T: BusinessDayClassifier + ?Sized> BusinessDayClassifier for Box<T> {
    fn classify(&self, date: NaiveDate) -> DayKind {
        (**self).classify(date)
    }
}

/// Saturday/Sunday weekends, no holidays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekendCalendar;

impl BusinessDayClassifier for WeekendCalendar {
    fn classify(&self, date: NaiveDate) -> DayKind {
        if is_weekend(date) {
            DayKind::Weekend
        } else {
            DayKind::Business
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekend_calendar() {
        let sat = NaiveDate::from_ymd_opt(2023, 7, 8).unwrap();
        let mon = NaiveDate::from_ymd_opt(2023, 7, 10).unwrap();
        assert_eq!(WeekendCalendar.classify(sat), DayKind::Weekend);
        assert!(WeekendCalendar.is_business_day(mon));
    }

    #[test]
    fn test_only_business_accrues() {
        assert!(DayKind::Business.is_business_day());
        assert!(!DayKind::Weekend.is_business_day());
        assert!(!DayKind::Holiday.is_business_day());
        assert!(!DayKind::Unknown.is_business_day());
    }

    #[test]
    fn test_classifier_through_reference() {
        let boxed: Box<dyn BusinessDayClassifier> = Box::new(WeekendCalendar);
        let sun = NaiveDate::from_ymd_opt(2023, 7, 9).unwrap();
        assert_eq!((&boxed).classify(sun), DayKind::Weekend);
    }
}
