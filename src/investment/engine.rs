//! Investment result assembly: compounding, taxes and fees combined

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use super::compounding::compound;
use super::fees::FeeSchedule;
use super::result::{round_money, InvestmentResult};
use super::taxes::{IncomeTax, TaxEngine};
use crate::error::{CalcError, Result};
use crate::rates::RateSource;

/// Per-investment options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentConfig {
    /// Annual administrative fee, percent
    pub admin_rate_pct: f64,

    /// Annual custody fee, percent
    pub custody_rate_pct: f64,

    /// Whether IR and IOF are deducted
    pub apply_taxes: bool,
}

impl Default for InvestmentConfig {
    fn default() -> Self {
        Self {
            admin_rate_pct: 0.0,
            custody_rate_pct: 0.0,
            apply_taxes: true,
        }
    }
}

impl InvestmentConfig {
    pub fn fees(&self) -> FeeSchedule {
        FeeSchedule {
            admin_rate_pct: self.admin_rate_pct,
            custody_rate_pct: self.custody_rate_pct,
        }
    }
}

/// Investment engine
#[derive(Debug, Clone, Default)]
pub struct InvestmentEngine {
    taxes: TaxEngine,
    config: InvestmentConfig,
}

impl InvestmentEngine {
    pub fn new(taxes: TaxEngine, config: InvestmentConfig) -> Self {
        Self { taxes, config }
    }

    pub fn config(&self) -> &InvestmentConfig {
        &self.config
    }

    pub fn taxes(&self) -> &TaxEngine {
        &self.taxes
    }

    /// Compute the full result of investing `principal` over `(start_date, end_date]`
    pub fn assemble<S>(
        &self,
        principal: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        rates: &S,
    ) -> Result<InvestmentResult>
    where
        S: RateSource + ?Sized,
    {
        if !principal.is_finite() || principal <= 0.0 {
            return Err(CalcError::invalid_range(
                "principal",
                format!("must be a positive amount, got {}", principal),
            ));
        }
        let fees = self.config.fees();
        fees.validate()?;

        let growth = compound(start_date, end_date, rates)?;

        let gross_value = principal * growth.compound_factor;
        let gross_profit = gross_value - principal;

        let (income_tax, transaction_tax) = if self.config.apply_taxes {
            let ir = self.taxes.compute_income_tax(gross_profit, growth.total_days);
            let iof = self.taxes.compute_transaction_tax(gross_profit, growth.total_days);
            (ir, iof)
        } else {
            (IncomeTax { amount: 0.0, rate_pct: 0.0 }, 0.0)
        };
        let fee_amounts = fees.compute(principal, growth.total_days);

        let gross_value = round_money(gross_value);
        let income_tax_amount = round_money(income_tax.amount);
        let transaction_tax_amount = round_money(transaction_tax);
        let admin_fee_amount = round_money(fee_amounts.admin);
        let custody_fee_amount = round_money(fee_amounts.custody);
        let net_value = round_money(
            gross_value - income_tax_amount - transaction_tax_amount - admin_fee_amount - custody_fee_amount,
        );
        let gross_profit = round_money(gross_value - principal);
        let net_profit = round_money(net_value - principal);

        let result = InvestmentResult {
            start_date,
            end_date,
            principal,
            gross_value,
            net_value,
            gross_profit,
            net_profit,
            taxes_applied: self.config.apply_taxes,
            income_tax_amount,
            income_tax_rate_pct: income_tax.rate_pct,
            transaction_tax_amount,
            admin_rate_pct: self.config.admin_rate_pct,
            admin_fee_amount,
            custody_rate_pct: self.config.custody_rate_pct,
            custody_fee_amount,
            total_days: growth.total_days,
            business_days: growth.business_days,
            compound_factor: growth.compound_factor,
            gross_return_pct: round_money(gross_profit / principal * 100.0),
            net_return_pct: round_money(net_profit / principal * 100.0),
        };

        info!(
            "Investment {:.2} from {} to {}: {} days ({} business), gross {:.2}, net {:.2}",
            principal, start_date, end_date, result.total_days, result.business_days, result.gross_value,
            result.net_value
        );

        Ok(result)
    }
}
