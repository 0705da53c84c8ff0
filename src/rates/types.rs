//! Daily reference-rate record

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{CalcError, Result};

/// Rate of one calendar day.
///
/// Non-business days always carry a zero rate; the constructors are the only
/// way to build a value, so the invariant cannot be broken downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyRate {
    date: NaiveDate,
    daily_rate_factor: f64,
    is_business_day: bool,
}

impl DailyRate {
    /// Business day accruing `daily_rate_factor` (fraction, e.g. 0.0004)
    pub fn business(date: NaiveDate, daily_rate_factor: f64) -> Result<Self> {
        if !daily_rate_factor.is_finite() || daily_rate_factor <= -1.0 {
            return Err(CalcError::invalid_parameter(
                "daily_rate_factor",
                format!("{} on {} is not a usable daily rate", daily_rate_factor, date),
            ));
        }
        Ok(Self {
            date,
            daily_rate_factor,
            is_business_day: true,
        })
    }

    /// Weekend or holiday; accrues nothing
    pub fn non_business(date: NaiveDate) -> Self {
        Self {
            date,
            daily_rate_factor: 0.0,
            is_business_day: false,
        }
    }

    /// Build from the central bank's cumulative daily factor (e.g. 1.00049037).
    ///
    /// The feed publishes `0` for days without a session.
    pub fn from_feed_factor(date: NaiveDate, factor: f64) -> Result<Self> {
        if factor == 0.0 {
            Ok(Self::non_business(date))
        } else {
            Self::business(date, factor - 1.0)
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn daily_rate_factor(&self) -> f64 {
        self.daily_rate_factor
    }

    pub fn is_business_day(&self) -> bool {
        self.is_business_day
    }

    /// Multiplicative growth contributed by this day
    pub fn growth(&self) -> f64 {
        1.0 + self.daily_rate_factor
    }
}
