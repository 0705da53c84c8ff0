//! Daily-rate compounding over a holding period

use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

use crate::calendar::HoldingPeriod;
use crate::error::Result;
use crate::rates::RateSource;

/// Growth over a holding period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompoundingOutcome {
    /// Product of `(1 + daily rate)` over every accrual date
    pub compound_factor: f64,
    /// Calendar days, `end - start`
    pub total_days: u32,
    /// Accrual dates the source reported as business days
    pub business_days: u32,
}

impl CompoundingOutcome {
    /// Outcome of an empty period
    pub fn identity() -> Self {
        Self {
            compound_factor: 1.0,
            total_days: 0,
            business_days: 0,
        }
    }
}

/// Compound the daily rates of `(start_date, end_date]`.
///
/// Each date is looked up exactly once; non-business days contribute a factor
/// of one. Fails with `InvalidRange` when `end_date < start_date` and
/// propagates the first lookup error.
pub fn compound<S>(start_date: NaiveDate, end_date: NaiveDate, rates: &S) -> Result<CompoundingOutcome>
where
    S: RateSource + ?Sized,
{
    let period = HoldingPeriod::new(start_date, end_date)?;
    compound_period(&period, rates)
}

pub fn compound_period<S>(period: &HoldingPeriod, rates: &S) -> Result<CompoundingOutcome>
where
    S: RateSource + ?Sized,
{
    let mut outcome = CompoundingOutcome::identity();
    outcome.total_days = period.total_calendar_days();

    for date in period.accrual_days() {
        let rate = rates.lookup(date)?;
        if rate.is_business_day() {
            outcome.compound_factor *= rate.growth();
            outcome.business_days += 1;
        }
        debug!(
            "{} rate={:.8} business={} factor={:.10}",
            date,
            rate.daily_rate_factor(),
            rate.is_business_day(),
            outcome.compound_factor
        );
    }

    Ok(outcome)
}
