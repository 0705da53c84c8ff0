//! Holiday calendars: rule-based national calendar and explicit holiday lists

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use log::debug;
use serde::Deserialize;

use super::classifier::{is_weekend, BusinessDayClassifier, DayKind};
use super::dates::ISO_FORMAT;
use crate::error::{CalcError, Result};

/// Year the Black Consciousness Day became a national holiday
const BLACK_CONSCIOUSNESS_FROM: i32 = 2024;

/// Brazilian national (market) holidays derived from calendar rules.
///
/// Fixed-date holidays plus the Easter-relative ones observed by the
/// interbank market: Carnival Monday and Tuesday, Good Friday, Corpus Christi.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NationalCalendar;

impl NationalCalendar {
    /// Name of the holiday falling on `date`, if any
    pub fn holiday_name(&self, date: NaiveDate) -> Option<&'static str> {
        let year = date.year();
        let fixed = match (date.month(), date.day()) {
            (1, 1) => Some("New Year's Day"),
            (4, 21) => Some("Tiradentes"),
            (5, 1) => Some("Labour Day"),
            (9, 7) => Some("Independence Day"),
            (10, 12) => Some("Our Lady of Aparecida"),
            (11, 2) => Some("All Souls' Day"),
            (11, 15) => Some("Proclamation of the Republic"),
            (11, 20) if year >= BLACK_CONSCIOUSNESS_FROM => Some("Black Consciousness Day"),
            (12, 25) => Some("Christmas Day"),
            _ => None,
        };
        if fixed.is_some() {
            return fixed;
        }

        let easter = easter_sunday(year);
        if date == easter - Duration::days(48) {
            Some("Carnival Monday")
        } else if date == easter - Duration::days(47) {
            Some("Carnival Tuesday")
        } else if date == easter - Duration::days(2) {
            Some("Good Friday")
        } else if date == easter + Duration::days(60) {
            Some("Corpus Christi")
        } else {
            None
        }
    }
}

impl BusinessDayClassifier for NationalCalendar {
    fn classify(&self, date: NaiveDate) -> DayKind {
        if is_weekend(date) {
            DayKind::Weekend
        } else if self.holiday_name(date).is_some() {
            DayKind::Holiday
        } else {
            DayKind::Business
        }
    }
}

/// Gregorian Easter Sunday (Meeus/Jones/Butcher)
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = ((h + l - 7 * m + 114) % 31) + 1;
    // month is always 3 or 4 and day within range for any Gregorian year
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).unwrap_or_default()
}

/// Holiday entry in the per-year holiday cache file
#[derive(Debug, Deserialize)]
struct HolidayEntry {
    date: String,
    name: String,
    #[serde(rename = "type", default)]
    _kind: Option<String>,
}

/// Explicit holiday list covering a known set of years.
///
/// Weekdays in years the list does not cover classify as [`DayKind::Unknown`]
/// rather than silently counting as business days.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    holidays: BTreeMap<NaiveDate, String>,
    covered_years: BTreeSet<i32>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a year as covered even if it has no holidays listed
    pub fn cover_year(&mut self, year: i32) {
        self.covered_years.insert(year);
    }

    pub fn add_holiday(&mut self, date: NaiveDate, name: impl Into<String>) {
        self.covered_years.insert(date.year());
        self.holidays.insert(date, name.into());
    }

    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.holidays.get(&date).map(String::as_str)
    }

    pub fn covers_year(&self, year: i32) -> bool {
        self.covered_years.contains(&year)
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    /// Load from a JSON file shaped `{"2023": [{"date": "2023-01-01", "name": ..., "type": ...}]}`
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(file)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let by_year: HashMap<String, Vec<HolidayEntry>> = serde_json::from_reader(reader)?;
        let mut calendar = Self::new();

        for (year_key, entries) in by_year {
            let year: i32 = year_key.trim().parse().map_err(|_| CalcError::Parse {
                input: year_key.clone(),
                reason: "holiday cache keys must be years".to_string(),
            })?;
            calendar.cover_year(year);

            for entry in entries {
                let date = NaiveDate::parse_from_str(&entry.date, ISO_FORMAT).map_err(|_| {
                    CalcError::Parse {
                        input: entry.date.clone(),
                        reason: "holiday dates must be YYYY-MM-DD".to_string(),
                    }
                })?;
                calendar.add_holiday(date, entry.name);
            }
        }

        debug!(
            "Loaded {} holidays covering {} years",
            calendar.len(),
            calendar.covered_years.len()
        );
        Ok(calendar)
    }
}

impl BusinessDayClassifier for HolidayCalendar {
    fn classify(&self, date: NaiveDate) -> DayKind {
        if is_weekend(date) {
            DayKind::Weekend
        } else if self.holidays.contains_key(&date) {
            DayKind::Holiday
        } else if self.covers_year(date.year()) {
            DayKind::Business
        } else {
            DayKind::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::HoldingPeriod;
    use std::io::Cursor;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_easter_dates() {
        assert_eq!(easter_sunday(2023), d(2023, 4, 9));
        assert_eq!(easter_sunday(2024), d(2024, 3, 31));
        assert_eq!(easter_sunday(2025), d(2025, 4, 20));
    }

    #[test]
    fn test_moveable_holidays_2023() {
        let cal = NationalCalendar;
        assert_eq!(cal.holiday_name(d(2023, 2, 20)), Some("Carnival Monday"));
        assert_eq!(cal.holiday_name(d(2023, 2, 21)), Some("Carnival Tuesday"));
        assert_eq!(cal.holiday_name(d(2023, 4, 7)), Some("Good Friday"));
        assert_eq!(cal.holiday_name(d(2023, 6, 8)), Some("Corpus Christi"));
        assert_eq!(cal.classify(d(2023, 2, 22)), DayKind::Business);
    }

    #[test]
    fn test_black_consciousness_from_2024() {
        let cal = NationalCalendar;
        assert_eq!(cal.classify(d(2023, 11, 20)), DayKind::Business);
        assert_eq!(cal.classify(d(2024, 11, 20)), DayKind::Holiday);
    }

    #[test]
    fn test_business_days_in_2023() {
        // 260 weekdays minus 11 weekday holidays
        let period = HoldingPeriod::new(d(2023, 1, 1), d(2023, 12, 31)).unwrap();
        assert_eq!(period.total_business_days(&NationalCalendar), 249);
    }

    #[test]
    fn test_holiday_calendar_from_json() {
        let json = r#"{
            "2023": [
                {"date": "2023-01-01", "name": "Confraternização mundial", "type": "national"},
                {"date": "2023-04-07", "name": "Sexta-feira Santa", "type": "national"}
            ]
        }"#;
        let cal = HolidayCalendar::from_json_reader(Cursor::new(json)).unwrap();

        assert_eq!(cal.len(), 2);
        assert_eq!(cal.classify(d(2023, 4, 7)), DayKind::Holiday);
        assert_eq!(cal.holiday_name(d(2023, 4, 7)), Some("Sexta-feira Santa"));
        assert_eq!(cal.classify(d(2023, 4, 6)), DayKind::Business);
        assert_eq!(cal.classify(d(2023, 4, 8)), DayKind::Weekend);
        // 2024 not covered by the file
        assert_eq!(cal.classify(d(2024, 4, 3)), DayKind::Unknown);
    }

    #[test]
    fn test_holiday_calendar_rejects_bad_year_key() {
        let json = r#"{"twenty": []}"#;
        let err = HolidayCalendar::from_json_reader(Cursor::new(json)).unwrap_err();
        assert!(err.to_string().contains("twenty"));
    }
}
