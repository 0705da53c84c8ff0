//! Request/response contracts for the calculation endpoints
//!
//! Transport is left to the caller; these types only define the JSON shapes
//! and the translation into engine calls. Fields ending in `_pct` are
//! percentages (`0.5` means 0.5%); every other rate is a fraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{format_br, parse_date, BusinessDayClassifier, DayKind};
use crate::error::{CalcError, Result};
use crate::investment::{
    analyze, InvestmentAnalysis, InvestmentConfig, InvestmentEngine, InvestmentResult, TaxEngine,
};
use crate::rates::{CalendarRateSource, RateSource};
use crate::simulation::{ContributionFrequency, SimulationConfig, SimulationEngine, SimulationResult};

fn default_true() -> bool {
    true
}

fn default_frequency() -> String {
    ContributionFrequency::Monthly.to_string()
}

/// Investment yield request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentRequest {
    pub principal: f64,

    /// `YYYY-MM-DD` or `DD/MM/YYYY`
    pub start_date: String,
    pub end_date: String,

    #[serde(default)]
    pub admin_rate_pct: f64,

    #[serde(default)]
    pub custody_rate_pct: f64,

    #[serde(default = "default_true")]
    pub apply_taxes: bool,
}

impl InvestmentRequest {
    pub fn period(&self) -> Result<(NaiveDate, NaiveDate)> {
        Ok((parse_date(&self.start_date)?, parse_date(&self.end_date)?))
    }

    pub fn config(&self) -> InvestmentConfig {
        InvestmentConfig {
            admin_rate_pct: self.admin_rate_pct,
            custody_rate_pct: self.custody_rate_pct,
            apply_taxes: self.apply_taxes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestmentResponse {
    #[serde(flatten)]
    pub result: InvestmentResult,
    /// `DD/MM/YYYY`
    pub start_date_formatted: String,
    pub end_date_formatted: String,
}

impl From<InvestmentResult> for InvestmentResponse {
    fn from(result: InvestmentResult) -> Self {
        Self {
            start_date_formatted: format_br(result.start_date),
            end_date_formatted: format_br(result.end_date),
            result,
        }
    }
}

pub fn handle_investment<S>(request: &InvestmentRequest, taxes: &TaxEngine, rates: &S) -> Result<InvestmentResponse>
where
    S: RateSource + ?Sized,
{
    let (start_date, end_date) = request.period()?;
    let engine = InvestmentEngine::new(taxes.clone(), request.config());
    let result = engine.assemble(request.principal, start_date, end_date, rates)?;
    Ok(result.into())
}

/// Day-by-day analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub principal: f64,
    pub start_date: String,
    pub end_date: String,
}

pub fn handle_analysis<S, C>(request: &AnalysisRequest, rates: &S, classifier: &C) -> Result<InvestmentAnalysis>
where
    S: RateSource + ?Sized,
    C: BusinessDayClassifier + ?Sized,
{
    let start_date = parse_date(&request.start_date)?;
    let end_date = parse_date(&request.end_date)?;
    analyze(request.principal, start_date, end_date, rates, classifier)
}

/// Long-horizon simulation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub initial_investment: f64,
    pub contribution_amount: f64,
    pub years: i32,
    /// Fraction, e.g. 0.10
    pub annual_return: f64,
    /// Percent, e.g. 0.5
    pub admin_rate_pct: f64,
    /// Percent, e.g. 15
    pub tax_rate_pct: f64,
    /// Fraction, e.g. 0.045
    pub inflation_annual: f64,

    #[serde(default = "default_frequency")]
    pub contribution_frequency: String,

    #[serde(default)]
    pub dividend_yield: f64,

    #[serde(default)]
    pub include_monthly_detail: bool,
}

impl SimulationRequest {
    /// Engine configuration with percentages converted to fractions
    pub fn to_config(&self) -> Result<SimulationConfig> {
        Ok(SimulationConfig {
            initial_investment: self.initial_investment,
            contribution_amount: self.contribution_amount,
            years: self.years,
            annual_return: self.annual_return,
            admin_rate: self.admin_rate_pct / 100.0,
            tax_rate: self.tax_rate_pct / 100.0,
            inflation_annual: self.inflation_annual,
            contribution_frequency: self.contribution_frequency.parse()?,
            dividend_yield: self.dividend_yield,
            detailed_output: self.include_monthly_detail,
        })
    }
}

pub type SimulationResponse = SimulationResult;

pub fn handle_simulation(request: &SimulationRequest) -> Result<SimulationResponse> {
    SimulationEngine::new(request.to_config()?)?.run()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessDayQuery {
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessDayResponse {
    pub date: NaiveDate,
    pub is_business_day: bool,
    pub kind: DayKind,
    pub weekday: String,
}

pub fn handle_business_day<C>(query: &BusinessDayQuery, source: &CalendarRateSource<C>) -> Result<BusinessDayResponse>
where
    C: BusinessDayClassifier,
{
    let date = parse_date(&query.date)?;
    let kind = source.day_kind(date);
    Ok(BusinessDayResponse {
        date,
        is_business_day: kind.is_business_day(),
        kind,
        weekday: date.format("%A").to_string(),
    })
}

/// Daily rate recorded for a date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateQuery {
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateResponse {
    pub date: NaiveDate,
    /// Zero on non-business days
    pub daily_rate_factor: f64,
    pub is_business_day: bool,
    pub kind: DayKind,
}

/// Resolve the rate of one date; a business day without data is `RateUnavailable`
pub fn handle_rate<C>(query: &RateQuery, source: &CalendarRateSource<C>) -> Result<RateResponse>
where
    C: BusinessDayClassifier,
{
    let date = parse_date(&query.date)?;
    let rate = source.lookup(date)?;
    let kind = if rate.is_business_day() {
        DayKind::Business
    } else {
        match source.day_kind(date) {
            DayKind::Business | DayKind::Unknown => DayKind::Holiday,
            other => other,
        }
    };
    Ok(RateResponse {
        date,
        daily_rate_factor: rate.daily_rate_factor(),
        is_business_day: rate.is_business_day(),
        kind,
    })
}

/// Error body for failed requests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code
    pub error: &'static str,
    pub message: String,
}

impl From<&CalcError> for ErrorResponse {
    fn from(err: &CalcError) -> Self {
        let error = match err {
            CalcError::InvalidParameters { .. } => "invalid_parameters",
            CalcError::InvalidRange { .. } => "invalid_range",
            CalcError::RateUnavailable(_) => "rate_unavailable",
            CalcError::DegenerateSimulation(_) => "degenerate_simulation",
            CalcError::InvalidTable(_) => "invalid_table",
            CalcError::Parse { .. } => "parse_error",
            CalcError::Io(_) | CalcError::Csv(_) | CalcError::Json(_) => "data_error",
        };
        Self {
            error,
            message: err.to_string(),
        }
    }
}
