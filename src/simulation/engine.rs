//! Monthly contribution simulation engine

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::frequency::ContributionFrequency;
use super::records::{SimulationMonthRecord, SimulationProjection, SimulationResult, SimulationSummary};
use super::state::{MonthFlows, SimulationState};
use crate::error::{CalcError, Result};

/// Longest horizon accepted, in years
pub const MAX_YEARS: i32 = 100;

/// Configuration for a simulation run.
///
/// Rates are fractions: `annual_return = 0.10` means 10% a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Amount invested at month 0
    pub initial_investment: f64,

    /// Amount added on every contribution month
    pub contribution_amount: f64,

    /// Horizon in whole years
    pub years: i32,

    /// Expected annual return
    pub annual_return: f64,

    /// Annual administrative fee
    pub admin_rate: f64,

    /// Tax rate on growth and dividends
    pub tax_rate: f64,

    /// Expected annual inflation, used for the real-value summary
    pub inflation_annual: f64,

    pub contribution_frequency: ContributionFrequency,

    /// Annual dividend yield, taxed like growth
    pub dividend_yield: f64,

    /// Whether to keep month-by-month records
    pub detailed_output: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_investment: 10_000.0,
            contribution_amount: 1_000.0,
            years: 20,
            annual_return: 0.10,
            admin_rate: 0.005,
            tax_rate: 0.15,
            inflation_annual: 0.045,
            contribution_frequency: ContributionFrequency::Monthly,
            dividend_yield: 0.0,
            detailed_output: false,
        }
    }
}

impl SimulationConfig {
    /// Reject inputs the monthly recurrence cannot handle
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("initial_investment", self.initial_investment),
            ("contribution_amount", self.contribution_amount),
            ("annual_return", self.annual_return),
            ("admin_rate", self.admin_rate),
            ("tax_rate", self.tax_rate),
            ("inflation_annual", self.inflation_annual),
            ("dividend_yield", self.dividend_yield),
        ];
        for (parameter, value) in finite {
            if !value.is_finite() {
                return Err(CalcError::invalid_parameter(parameter, format!("must be finite, got {}", value)));
            }
        }

        if self.initial_investment < 0.0 {
            return Err(CalcError::invalid_parameter(
                "initial_investment",
                format!("must be >= 0, got {}", self.initial_investment),
            ));
        }
        if self.contribution_amount < 0.0 {
            return Err(CalcError::invalid_parameter(
                "contribution_amount",
                format!("must be >= 0, got {}", self.contribution_amount),
            ));
        }
        if !(0..=MAX_YEARS).contains(&self.years) {
            return Err(CalcError::invalid_parameter(
                "years",
                format!("must lie in [0, {}], got {}", MAX_YEARS, self.years),
            ));
        }
        if !(0.0..=1.0).contains(&self.tax_rate) {
            return Err(CalcError::invalid_parameter(
                "tax_rate",
                format!("must lie in [0, 1], got {}", self.tax_rate),
            ));
        }
        if self.inflation_annual <= -1.0 {
            return Err(CalcError::invalid_parameter(
                "inflation_annual",
                format!("must be > -1, got {}", self.inflation_annual),
            ));
        }
        if self.annual_return - self.admin_rate <= -1.0 {
            return Err(CalcError::invalid_parameter(
                "annual_return",
                format!(
                    "return net of admin fee must be > -1, got {}",
                    self.annual_return - self.admin_rate
                ),
            ));
        }
        if self.dividend_yield <= -1.0 {
            return Err(CalcError::invalid_parameter(
                "dividend_yield",
                format!("must be > -1, got {}", self.dividend_yield),
            ));
        }
        Ok(())
    }
}

/// Simulation engine
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    config: SimulationConfig,
    monthly_return_rate: f64,
    monthly_dividend_rate: f64,
}

impl SimulationEngine {
    /// Validate `config` and derive the monthly rates
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let monthly_return_rate = (1.0 + (config.annual_return - config.admin_rate)).powf(1.0 / 12.0) - 1.0;
        let monthly_dividend_rate = (1.0 + config.dividend_yield).powf(1.0 / 12.0) - 1.0;
        Ok(Self {
            config,
            monthly_return_rate,
            monthly_dividend_rate,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn monthly_return_rate(&self) -> f64 {
        self.monthly_return_rate
    }

    pub fn monthly_dividend_rate(&self) -> f64 {
        self.monthly_dividend_rate
    }

    /// Iterate every month of the horizon
    pub fn project(&self) -> SimulationProjection {
        let config = &self.config;
        // validated non-negative in `new`
        let years = config.years as u32;
        let total_months = years * 12;

        info!(
            "Simulating {} years: initial {:.2}, {} contributions of {:.2} ({}), return {:.2}%, admin {:.2}%, tax {:.2}%",
            years,
            config.initial_investment,
            config.contribution_frequency.contributions_over(total_months),
            config.contribution_amount,
            config.contribution_frequency,
            config.annual_return * 100.0,
            config.admin_rate * 100.0,
            config.tax_rate * 100.0
        );

        let mut state = SimulationState::initial(config.initial_investment);
        let mut records = if config.detailed_output {
            Vec::with_capacity(total_months as usize)
        } else {
            Vec::new()
        };

        for month in 1..=total_months {
            let flows = self.calculate_month(&state, month);
            state.advance_month(&flows);

            if config.detailed_output {
                records.push(SimulationMonthRecord::from_month(&state, &flows));
            }
            if month % 12 == 0 {
                debug!(
                    "Year {}: gross {:.2}, net {:.2}, contributed {:.2}",
                    month / 12,
                    state.gross_balance,
                    state.net_balance,
                    state.total_contributed
                );
            }
        }

        SimulationProjection {
            years,
            inflation_annual: config.inflation_annual,
            records,
            final_state: state,
        }
    }

    /// Flows for 1-indexed `month`, all based on the prior gross balance
    fn calculate_month(&self, state: &SimulationState, month: u32) -> MonthFlows {
        let config = &self.config;
        let prior_gross = state.gross_balance;

        let gross_yield = prior_gross * self.monthly_return_rate;
        let dividend = prior_gross * self.monthly_dividend_rate;
        let contribution = if config.contribution_frequency.contributes_in(month) {
            config.contribution_amount
        } else {
            0.0
        };

        MonthFlows {
            contribution,
            gross_yield,
            dividend,
            admin_fee: prior_gross * config.admin_rate / 12.0,
            income_tax: gross_yield * config.tax_rate,
            dividend_tax: dividend * config.tax_rate,
        }
    }

    pub fn summary(&self) -> Result<SimulationSummary> {
        self.project().summary()
    }

    /// Projection and summary, keeping monthly records when configured
    pub fn run(&self) -> Result<SimulationResult> {
        let projection = self.project();
        let summary = projection.summary()?;

        info!(
            "Simulation done after {} months: gross {:.2}, net {:.2}, real {:.2}, net CAGR {:.2}%",
            projection.months(),
            summary.final_gross_value,
            summary.final_net_value,
            summary.inflation_adjusted_net_value,
            summary.annualized_net_return_pct
        );

        let monthly_detail = self.config.detailed_output.then_some(projection.records);
        Ok(SimulationResult { summary, monthly_detail })
    }
}

/// Run many configurations in parallel, preserving input order
pub fn run_batch(configs: &[SimulationConfig]) -> Vec<Result<SimulationResult>> {
    configs
        .par_iter()
        .map(|config| SimulationEngine::new(config.clone())?.run())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> SimulationConfig {
        SimulationConfig::default()
    }

    #[test]
    fn test_twenty_year_monthly_reference() {
        let summary = SimulationEngine::new(reference()).unwrap().summary().unwrap();

        assert_eq!(summary.total_contributed, 250_000.0);
        assert_relative_eq!(summary.final_gross_value, 738_698.460_460_549_2, max_relative = 1e-9);
        assert_relative_eq!(summary.final_net_value, 638_571.134_747_308, max_relative = 1e-9);
        assert_relative_eq!(summary.inflation_adjusted_net_value, 264_778.961_423_653_6, max_relative = 1e-9);
        assert_relative_eq!(summary.annualized_net_return_pct, 4.800_526_320_470_588, max_relative = 1e-8);
        assert_relative_eq!(summary.annualized_real_return_pct, 0.287_584_995_665_657_3, max_relative = 1e-7);
        assert_relative_eq!(summary.total_admin_fees, 26_822.556_644_159_37, max_relative = 1e-9);
        assert_relative_eq!(summary.total_income_tax, 73_304.769_069_082_45, max_relative = 1e-9);
        assert_relative_eq!(summary.total_gross_yield, 488_698.460_460_549_2, max_relative = 1e-9);
    }

    #[test]
    fn test_no_contributions_matches_closed_form() {
        let config = SimulationConfig {
            initial_investment: 5_000.0,
            contribution_amount: 250.0,
            years: 7,
            annual_return: 0.09,
            admin_rate: 0.0,
            tax_rate: 0.2,
            contribution_frequency: ContributionFrequency::None,
            ..reference()
        };
        let summary = SimulationEngine::new(config).unwrap().summary().unwrap();

        let gross = 5_000.0 * 1.09_f64.powi(7);
        assert_relative_eq!(summary.final_gross_value, gross, max_relative = 1e-10);
        // taxes come out of growth only
        assert_relative_eq!(summary.final_net_value, 5_000.0 + 0.8 * (gross - 5_000.0), max_relative = 1e-10);
        assert_eq!(summary.total_contributed, 5_000.0);
    }

    #[test]
    fn test_quarterly_with_dividends() {
        let config = SimulationConfig {
            initial_investment: 10_000.0,
            contribution_amount: 500.0,
            years: 10,
            annual_return: 0.08,
            admin_rate: 0.0,
            tax_rate: 0.0,
            inflation_annual: 0.0,
            contribution_frequency: ContributionFrequency::Quarterly,
            dividend_yield: 0.04,
            detailed_output: false,
        };
        let summary = SimulationEngine::new(config).unwrap().summary().unwrap();

        assert_eq!(summary.total_contributed, 30_000.0);
        assert_relative_eq!(summary.final_gross_value, 69_075.251_133_852_36, max_relative = 1e-9);
        assert_relative_eq!(summary.final_net_value, summary.final_gross_value, max_relative = 1e-12);
        assert!(summary.total_dividends > 0.0);
    }

    #[test]
    fn test_detailed_output_records() {
        let config = SimulationConfig {
            years: 2,
            contribution_frequency: ContributionFrequency::Semiannually,
            detailed_output: true,
            ..reference()
        };
        let result = SimulationEngine::new(config).unwrap().run().unwrap();
        let records = result.monthly_detail.unwrap();

        assert_eq!(records.len(), 24);
        assert_eq!(records[0].month_index, 1);
        let contribution_months: Vec<u32> = records
            .iter()
            .filter(|r| r.contribution_this_month > 0.0)
            .map(|r| r.month_index)
            .collect();
        assert_eq!(contribution_months, vec![6, 12, 18, 24]);

        let last = records.last().unwrap();
        assert_eq!(last.total_contributed, 14_000.0);
        assert_relative_eq!(last.net_balance, result.summary.final_net_value);
        assert_relative_eq!(last.cumulative_return, last.net_balance - last.total_contributed);
    }

    #[test]
    fn test_detail_omitted_by_default() {
        let result = SimulationEngine::new(reference()).unwrap().run().unwrap();
        assert!(result.monthly_detail.is_none());
    }

    #[test]
    fn test_zero_years() {
        let engine = SimulationEngine::new(SimulationConfig { years: 0, detailed_output: true, ..reference() }).unwrap();
        let projection = engine.project();

        assert!(projection.records.is_empty());
        assert_eq!(projection.final_state.gross_balance, 10_000.0);
        assert_eq!(projection.final_state.net_balance, 10_000.0);
        assert!(matches!(engine.run(), Err(CalcError::DegenerateSimulation(_))));
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            (SimulationConfig { initial_investment: -1.0, ..reference() }, "initial_investment"),
            (SimulationConfig { years: -1, ..reference() }, "years"),
            (SimulationConfig { contribution_amount: -5.0, ..reference() }, "contribution_amount"),
            (SimulationConfig { tax_rate: 1.5, ..reference() }, "tax_rate"),
            (SimulationConfig { inflation_annual: -1.0, ..reference() }, "inflation_annual"),
            (SimulationConfig { annual_return: f64::NAN, ..reference() }, "annual_return"),
            (SimulationConfig { dividend_yield: -2.0, ..reference() }, "dividend_yield"),
        ];
        for (config, parameter) in cases {
            match SimulationEngine::new(config) {
                Err(CalcError::InvalidParameters { parameter: p, .. }) => assert_eq!(p, parameter),
                other => panic!("expected InvalidParameters for {}, got {:?}", parameter, other),
            }
        }
    }

    #[test]
    fn test_years_upper_bound() {
        assert!(SimulationEngine::new(SimulationConfig { years: MAX_YEARS, ..reference() }).is_ok());
        for years in [MAX_YEARS + 1, i32::MAX] {
            match SimulationEngine::new(SimulationConfig { years, ..reference() }) {
                Err(CalcError::InvalidParameters { parameter, .. }) => assert_eq!(parameter, "years"),
                other => panic!("expected InvalidParameters for {} years, got {:?}", years, other),
            }
        }
    }

    #[test]
    fn test_annual_contributions() {
        let config = SimulationConfig {
            years: 3,
            contribution_frequency: ContributionFrequency::Annually,
            detailed_output: true,
            ..reference()
        };
        let engine = SimulationEngine::new(config).unwrap();
        let projection = engine.project();

        let months: Vec<u32> = projection
            .records
            .iter()
            .filter(|r| r.contribution_this_month > 0.0)
            .map(|r| r.month_index)
            .collect();
        assert_eq!(months, vec![12, 24, 36]);
        assert_eq!(projection.months(), 36);
        assert_eq!(ContributionFrequency::Annually.contributions_over(projection.months()), 3);
        assert_eq!(projection.final_state.total_contributed, 13_000.0);
        assert_eq!(projection.records[11].total_contributed, 11_000.0);
        assert_eq!(projection.records[10].total_contributed, 10_000.0);
    }

    #[test]
    fn test_deterministic() {
        let a = SimulationEngine::new(reference()).unwrap().summary().unwrap();
        let b = SimulationEngine::new(reference()).unwrap().summary().unwrap();
        assert_eq!(a.final_net_value.to_bits(), b.final_net_value.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_run_batch_preserves_order() {
        let configs = vec![
            SimulationConfig { years: 5, ..reference() },
            SimulationConfig { years: -3, ..reference() },
            SimulationConfig { years: 20, ..reference() },
        ];
        let results = run_batch(&configs);

        assert_eq!(results.len(), 3);
        assert!(results[1].is_err());
        let five = results[0].as_ref().unwrap();
        let twenty = results[2].as_ref().unwrap();
        assert_eq!(five.summary.total_contributed, 70_000.0);
        assert_relative_eq!(twenty.summary.final_net_value, 638_571.134_747_308, max_relative = 1e-9);
    }
}
