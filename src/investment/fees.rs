//! Administrative and custody fees, pro-rated over a 365-day year

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};

pub const DAYS_PER_YEAR: f64 = 365.0;

/// `principal × (annual_rate_pct / 100) × (total_days / 365)`
pub fn compute_fee(principal: f64, annual_rate_pct: f64, total_days: u32) -> f64 {
    principal * (annual_rate_pct / 100.0) * (total_days as f64 / DAYS_PER_YEAR)
}

/// Fee amounts charged over one holding period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeeAmounts {
    pub admin: f64,
    pub custody: f64,
}

impl FeeAmounts {
    pub fn total(&self) -> f64 {
        self.admin + self.custody
    }
}

/// Annual fee percentages (0.5 means 0.5% a year)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub admin_rate_pct: f64,
    pub custody_rate_pct: f64,
}

impl FeeSchedule {
    pub fn new(admin_rate_pct: f64, custody_rate_pct: f64) -> Result<Self> {
        let schedule = Self { admin_rate_pct, custody_rate_pct };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<()> {
        check_rate("admin_rate_pct", self.admin_rate_pct)?;
        check_rate("custody_rate_pct", self.custody_rate_pct)
    }

    pub fn compute(&self, principal: f64, total_days: u32) -> FeeAmounts {
        FeeAmounts {
            admin: compute_fee(principal, self.admin_rate_pct, total_days),
            custody: compute_fee(principal, self.custody_rate_pct, total_days),
        }
    }
}

fn check_rate(parameter: &str, rate_pct: f64) -> Result<()> {
    if !rate_pct.is_finite() || rate_pct < 0.0 {
        return Err(CalcError::invalid_parameter(
            parameter,
            format!("must be a non-negative percentage, got {}", rate_pct),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fee_formula() {
        assert_relative_eq!(compute_fee(10_000.0, 0.5, 365), 50.0);
        assert_relative_eq!(compute_fee(10_000.0, 0.5, 364), 49.863_013_698_630_14, max_relative = 1e-12);
        assert_eq!(compute_fee(10_000.0, 0.0, 365), 0.0);
        assert_eq!(compute_fee(10_000.0, 1.0, 0), 0.0);
    }

    #[test]
    fn test_schedule_computes_independently() {
        let fees = FeeSchedule::new(1.0, 0.2).unwrap().compute(36_500.0, 10);
        assert_relative_eq!(fees.admin, 10.0);
        assert_relative_eq!(fees.custody, 2.0);
        assert_relative_eq!(fees.total(), 12.0);
    }

    #[test]
    fn test_negative_rate_rejected() {
        let err = FeeSchedule::new(-0.1, 0.0).unwrap_err();
        assert!(err.to_string().contains("admin_rate_pct"));
        assert!(FeeSchedule::new(0.0, f64::NAN).is_err());
    }
}
