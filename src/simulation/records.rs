//! Simulation output structures

use serde::{Deserialize, Serialize};

use super::state::{MonthFlows, SimulationState};
use crate::error::{CalcError, Result};

/// A single month of simulation output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationMonthRecord {
    /// 1-indexed month
    pub month_index: u32,
    pub contribution_this_month: f64,
    /// Running total including the initial investment
    pub total_contributed: f64,

    // Balances at month end
    pub gross_balance: f64,
    pub net_balance: f64,

    // Flows
    pub gross_yield: f64,
    pub dividend_yield: f64,
    pub admin_fee: f64,
    pub income_tax: f64,
    pub dividend_tax: f64,
    pub net_yield: f64,

    /// `net_balance - total_contributed`
    pub cumulative_return: f64,
}

impl SimulationMonthRecord {
    /// Record for the month `state` was just advanced through
    pub fn from_month(state: &SimulationState, flows: &MonthFlows) -> Self {
        Self {
            month_index: state.month,
            contribution_this_month: flows.contribution,
            total_contributed: state.total_contributed,
            gross_balance: state.gross_balance,
            net_balance: state.net_balance,
            gross_yield: flows.gross_yield,
            dividend_yield: flows.dividend,
            admin_fee: flows.admin_fee,
            income_tax: flows.income_tax,
            dividend_tax: flows.dividend_tax,
            net_yield: flows.net_yield(),
            cumulative_return: state.cumulative_return(),
        }
    }
}

/// Month-by-month projection before any annualization
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationProjection {
    pub years: u32,
    pub inflation_annual: f64,
    /// Empty unless detailed output was requested
    pub records: Vec<SimulationMonthRecord>,
    pub final_state: SimulationState,
}

impl SimulationProjection {
    pub fn months(&self) -> u32 {
        self.final_state.month
    }

    /// Totals and annualized returns.
    ///
    /// Fails with `DegenerateSimulation` when the CAGR is undefined: zero
    /// years, nothing contributed, or a non-positive final-to-contributed ratio.
    pub fn summary(&self) -> Result<SimulationSummary> {
        let state = &self.final_state;

        if self.years == 0 {
            return Err(CalcError::DegenerateSimulation(
                "annualized return is undefined over 0 years".to_string(),
            ));
        }
        if state.total_contributed <= 0.0 {
            return Err(CalcError::DegenerateSimulation(format!(
                "total contributed is {}, annualized return is undefined",
                state.total_contributed
            )));
        }

        let inflation_adjusted_net_value =
            state.net_balance / (1.0 + self.inflation_annual).powi(self.years as i32);

        let annualized_net_return_pct = cagr(state.net_balance, state.total_contributed, self.years)? * 100.0;
        let annualized_real_return_pct =
            cagr(inflation_adjusted_net_value, state.total_contributed, self.years)? * 100.0;

        Ok(SimulationSummary {
            final_gross_value: state.gross_balance,
            total_contributed: state.total_contributed,
            total_gross_yield: state.gross_balance - state.total_contributed,
            total_dividends: state.total_dividends,
            total_admin_fees: state.total_admin_fees,
            total_income_tax: state.total_income_tax,
            total_dividend_tax: state.total_dividend_tax,
            total_taxes: state.total_income_tax + state.total_dividend_tax,
            final_net_value: state.net_balance,
            inflation_adjusted_net_value,
            annualized_net_return_pct,
            annualized_real_return_pct,
        })
    }
}

/// Compound annual growth rate from `base` to `value` over `years`
fn cagr(value: f64, base: f64, years: u32) -> Result<f64> {
    let ratio = value / base;
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(CalcError::DegenerateSimulation(format!(
            "final value {:.2} over contributed {:.2} has no real annualized rate",
            value, base
        )));
    }
    Ok(ratio.powf(1.0 / years as f64) - 1.0)
}

/// Totals for a full simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub final_gross_value: f64,
    pub total_contributed: f64,
    /// Growth plus dividends, `final_gross_value - total_contributed`
    pub total_gross_yield: f64,
    pub total_dividends: f64,
    pub total_admin_fees: f64,
    pub total_income_tax: f64,
    pub total_dividend_tax: f64,
    pub total_taxes: f64,
    pub final_net_value: f64,
    pub inflation_adjusted_net_value: f64,
    pub annualized_net_return_pct: f64,
    pub annualized_real_return_pct: f64,
}

/// Summary plus the optional monthly history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub summary: SimulationSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_detail: Option<Vec<SimulationMonthRecord>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn projection(years: u32, net: f64, contributed: f64) -> SimulationProjection {
        let mut final_state = SimulationState::initial(contributed);
        final_state.net_balance = net;
        final_state.gross_balance = net;
        final_state.month = years * 12;
        SimulationProjection {
            years,
            inflation_annual: 0.0,
            records: Vec::new(),
            final_state,
        }
    }

    #[test]
    fn test_cagr_doubling() {
        let summary = projection(2, 400.0, 100.0).summary().unwrap();
        assert_relative_eq!(summary.annualized_net_return_pct, 100.0, max_relative = 1e-12);
        assert_relative_eq!(summary.annualized_real_return_pct, 100.0, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_years_is_degenerate() {
        let err = projection(0, 100.0, 100.0).summary().unwrap_err();
        assert!(matches!(err, CalcError::DegenerateSimulation(_)));
    }

    #[test]
    fn test_nothing_contributed_is_degenerate() {
        let err = projection(5, 0.0, 0.0).summary().unwrap_err();
        assert!(matches!(err, CalcError::DegenerateSimulation(_)));
    }

    #[test]
    fn test_non_positive_ratio_is_degenerate() {
        let err = projection(5, -10.0, 100.0).summary().unwrap_err();
        assert!(matches!(err, CalcError::DegenerateSimulation(_)));
    }

    #[test]
    fn test_monthly_detail_omitted_when_absent() {
        let result = SimulationResult {
            summary: projection(1, 110.0, 100.0).summary().unwrap(),
            monthly_detail: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("monthly_detail").is_none());
        assert!(json["summary"]["total_taxes"].is_number());
    }
}
