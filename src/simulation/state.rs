//! Running state of a contribution simulation

/// Balances and accumulated totals at a month boundary
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Last completed month (0 before the first month)
    pub month: u32,

    /// Balance before taxes and fees
    pub gross_balance: f64,

    /// Balance after taxes and fees
    pub net_balance: f64,

    /// Initial investment plus every contribution so far
    pub total_contributed: f64,

    /// Return-driven growth, dividends excluded
    pub total_growth: f64,
    pub total_dividends: f64,
    pub total_admin_fees: f64,
    pub total_income_tax: f64,
    pub total_dividend_tax: f64,
}

/// Amounts produced in one month
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthFlows {
    pub contribution: f64,
    pub gross_yield: f64,
    pub dividend: f64,
    pub admin_fee: f64,
    pub income_tax: f64,
    pub dividend_tax: f64,
}

impl MonthFlows {
    pub fn net_yield(&self) -> f64 {
        self.gross_yield + self.dividend - self.income_tax - self.dividend_tax - self.admin_fee
    }
}

impl SimulationState {
    /// State at month 0
    pub fn initial(initial_investment: f64) -> Self {
        Self {
            month: 0,
            gross_balance: initial_investment,
            net_balance: initial_investment,
            total_contributed: initial_investment,
            total_growth: 0.0,
            total_dividends: 0.0,
            total_admin_fees: 0.0,
            total_income_tax: 0.0,
            total_dividend_tax: 0.0,
        }
    }

    /// Apply one month of flows
    pub fn advance_month(&mut self, flows: &MonthFlows) {
        self.month += 1;

        self.gross_balance += flows.gross_yield + flows.dividend + flows.contribution;
        self.net_balance += flows.net_yield() + flows.contribution;
        self.total_contributed += flows.contribution;

        self.total_growth += flows.gross_yield;
        self.total_dividends += flows.dividend;
        self.total_admin_fees += flows.admin_fee;
        self.total_income_tax += flows.income_tax;
        self.total_dividend_tax += flows.dividend_tax;
    }

    /// Net balance above everything contributed
    pub fn cumulative_return(&self) -> f64 {
        self.net_balance - self.total_contributed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_month() {
        let mut state = SimulationState::initial(1_000.0);
        let flows = MonthFlows {
            contribution: 100.0,
            gross_yield: 10.0,
            dividend: 2.0,
            admin_fee: 0.5,
            income_tax: 1.5,
            dividend_tax: 0.3,
        };
        state.advance_month(&flows);

        assert_eq!(state.month, 1);
        assert!((state.gross_balance - 1_112.0).abs() < 1e-12);
        assert!((state.net_balance - 1_109.7).abs() < 1e-9);
        assert_eq!(state.total_contributed, 1_100.0);
        assert!((state.cumulative_return() - 9.7).abs() < 1e-9);
    }
}
