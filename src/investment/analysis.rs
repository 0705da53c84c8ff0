//! Day-by-day breakdown of an investment period

use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use super::result::round_money;
use crate::calendar::{BusinessDayClassifier, DayKind, HoldingPeriod};
use crate::error::{CalcError, Result};
use crate::rates::RateSource;

/// One accrual date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    /// English weekday name, e.g. "Monday"
    pub weekday: String,
    pub kind: DayKind,
    pub daily_rate_factor: f64,
    /// Whether the day contributed to growth
    pub accrued: bool,
}

/// Period statistics plus the per-day breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentAnalysis {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub principal: f64,
    pub final_value: f64,
    pub gross_profit: f64,
    pub gross_return_pct: f64,

    pub total_days: u32,
    pub business_days: u32,
    pub weekend_days: u32,
    pub holiday_days: u32,
    pub compound_factor: f64,

    /// Gross return percent spread over calendar days
    pub avg_daily_return_pct: f64,
    /// Gross return percent spread over business days
    pub avg_business_day_return_pct: f64,

    pub days: Vec<DayDetail>,
}

/// Analyze `principal` invested over `(start_date, end_date]`.
///
/// Days the source reports as non-business are labelled through `classifier`;
/// a calendar business day without a session is counted as a holiday.
pub fn analyze<S, C>(
    principal: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    rates: &S,
    classifier: &C,
) -> Result<InvestmentAnalysis>
where
    S: RateSource + ?Sized,
    C: BusinessDayClassifier + ?Sized,
{
    if !principal.is_finite() || principal <= 0.0 {
        return Err(CalcError::invalid_range(
            "principal",
            format!("must be a positive amount, got {}", principal),
        ));
    }
    let period = HoldingPeriod::new(start_date, end_date)?;

    let mut compound_factor = 1.0;
    let mut business_days = 0;
    let mut weekend_days = 0;
    let mut holiday_days = 0;
    let mut days = Vec::with_capacity(period.total_calendar_days() as usize);

    for date in period.accrual_days() {
        let rate = rates.lookup(date)?;
        let kind = if rate.is_business_day() {
            compound_factor *= rate.growth();
            business_days += 1;
            DayKind::Business
        } else {
            match classifier.classify(date) {
                DayKind::Weekend => {
                    weekend_days += 1;
                    DayKind::Weekend
                }
                _ => {
                    holiday_days += 1;
                    DayKind::Holiday
                }
            }
        };

        days.push(DayDetail {
            date,
            weekday: date.format("%A").to_string(),
            kind,
            daily_rate_factor: rate.daily_rate_factor(),
            accrued: rate.is_business_day(),
        });
    }

    let total_days = period.total_calendar_days();
    let final_value = principal * compound_factor;
    let gross_profit = final_value - principal;
    let gross_return_pct = gross_profit / principal * 100.0;

    let avg_daily_return_pct = if total_days > 0 {
        gross_return_pct / total_days as f64
    } else {
        0.0
    };
    let avg_business_day_return_pct = if business_days > 0 {
        gross_return_pct / business_days as f64
    } else {
        0.0
    };

    info!(
        "Analysis {} to {}: {} business, {} weekend, {} holiday days",
        start_date, end_date, business_days, weekend_days, holiday_days
    );

    Ok(InvestmentAnalysis {
        start_date,
        end_date,
        principal,
        final_value: round_money(final_value),
        gross_profit: round_money(gross_profit),
        gross_return_pct: round_money(gross_return_pct),
        total_days,
        business_days,
        weekend_days,
        holiday_days,
        compound_factor,
        avg_daily_return_pct,
        avg_business_day_return_pct,
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{NationalCalendar, WeekendCalendar};
    use crate::rates::DailyRate;
    use approx::assert_relative_eq;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, day).unwrap()
    }

    #[test]
    fn test_day_counts_add_up() {
        let rates = |date: NaiveDate| {
            if NationalCalendar.is_business_day(date) {
                DailyRate::business(date, 0.0005)
            } else {
                Ok(DailyRate::non_business(date))
            }
        };
        // Thu 2023-04-06 .. Mon 2023-04-24: Good Friday and Tiradentes inside
        let analysis = analyze(1_000.0, d(4, 6), d(4, 24), &rates, &NationalCalendar).unwrap();

        assert_eq!(analysis.total_days, 18);
        assert_eq!(analysis.days.len(), 18);
        assert_eq!(analysis.holiday_days, 2);
        assert_eq!(analysis.weekend_days, 6);
        assert_eq!(analysis.business_days, 10);
        assert_eq!(analysis.days[0].weekday, "Friday");
        assert_eq!(analysis.days[0].kind, DayKind::Holiday);
        assert_relative_eq!(analysis.compound_factor, 1.0005_f64.powi(10), max_relative = 1e-14);
        assert_relative_eq!(
            analysis.avg_business_day_return_pct * 10.0,
            analysis.avg_daily_return_pct * 18.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_unlisted_holiday_detected() {
        // Wednesday recorded without a session; weekend-only calendar says business
        let rates = |date: NaiveDate| {
            if date == d(7, 5) || !WeekendCalendar.is_business_day(date) {
                Ok(DailyRate::non_business(date))
            } else {
                DailyRate::business(date, 0.0004)
            }
        };
        let analysis = analyze(1_000.0, d(7, 3), d(7, 9), &rates, &WeekendCalendar).unwrap();

        let wednesday = &analysis.days[1];
        assert_eq!(wednesday.date, d(7, 5));
        assert_eq!(wednesday.kind, DayKind::Holiday);
        assert!(!wednesday.accrued);
        assert_eq!(analysis.business_days, 3);
        assert_eq!(analysis.holiday_days, 1);
        assert_eq!(analysis.weekend_days, 2);
    }

    #[test]
    fn test_empty_period() {
        let rates = |date: NaiveDate| DailyRate::business(date, 0.001);
        let analysis = analyze(500.0, d(7, 3), d(7, 3), &rates, &WeekendCalendar).unwrap();
        assert!(analysis.days.is_empty());
        assert_eq!(analysis.final_value, 500.0);
        assert_eq!(analysis.avg_daily_return_pct, 0.0);
    }
}
