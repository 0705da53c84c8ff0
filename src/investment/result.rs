//! Investment result record

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Round a money amount to cents, half away from zero
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Outcome of one SELIC-indexed investment over a holding period.
///
/// Money fields are rounded to cents and `net_value` is derived from the
/// rounded components, so
/// `net_value == gross_value - income_tax_amount - transaction_tax_amount - admin_fee_amount - custody_fee_amount`
/// holds exactly on the emitted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentResult {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    // Amounts
    pub principal: f64,
    pub gross_value: f64,
    pub net_value: f64,
    pub gross_profit: f64,
    pub net_profit: f64,

    // Taxes
    pub taxes_applied: bool,
    pub income_tax_amount: f64,
    pub income_tax_rate_pct: f64,
    pub transaction_tax_amount: f64,

    // Fees
    pub admin_rate_pct: f64,
    pub admin_fee_amount: f64,
    pub custody_rate_pct: f64,
    pub custody_fee_amount: f64,

    // Period
    pub total_days: u32,
    pub business_days: u32,
    /// Unrounded cumulative growth factor
    pub compound_factor: f64,

    /// Gross profit over principal, in percent
    pub gross_return_pct: f64,
    /// Net profit over principal, in percent
    pub net_return_pct: f64,
}

impl InvestmentResult {
    /// Sum of every deduction from the gross value
    pub fn total_deductions(&self) -> f64 {
        self.income_tax_amount + self.transaction_tax_amount + self.admin_fee_amount + self.custody_fee_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(1065.404), 1065.4);
        assert_eq!(round_money(49.863_013), 49.86);
        assert_eq!(round_money(0.125), 0.13);
        assert_eq!(round_money(-2.5051), -2.51);
        assert_eq!(round_money(0.0), 0.0);
    }
}
