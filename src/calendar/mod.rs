//! Calendar utilities: holding periods, business-day classification, holidays

mod classifier;
mod dates;
mod holidays;

pub use classifier::{is_weekend, BusinessDayClassifier, DayKind, WeekendCalendar};
pub use dates::{
    days_between, format_br, format_iso, parse_date, AccrualDays, HoldingPeriod, BR_FORMAT,
    ISO_FORMAT,
};
pub use holidays::{easter_sunday, HolidayCalendar, NationalCalendar};
