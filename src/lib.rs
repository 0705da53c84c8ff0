//! SELIC yield - investment yield and contribution simulation engine
//!
//! This library provides:
//! - Daily-rate compounding over business days (SELIC-indexed fixed income)
//! - Income tax (IR) brackets and the regressive transaction tax (IOF)
//! - Administrative and custody fees pro-rated over the holding period
//! - Day-by-day investment analysis
//! - Long-horizon contribution simulation with dividends and inflation
//! - Rate stores, snapshot loaders and a concurrent rate cache

pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod investment;
pub mod rates;
pub mod simulation;

// Re-export commonly used types
pub use calendar::{BusinessDayClassifier, DayKind, HoldingPeriod, NationalCalendar};
pub use config::Settings;
pub use error::{CalcError, Result};
pub use investment::{InvestmentConfig, InvestmentEngine, InvestmentResult, TaxEngine};
pub use rates::{CalendarRateSource, DailyRate, RateSource, RateStore};
pub use simulation::{ContributionFrequency, SimulationConfig, SimulationEngine, SimulationResult};
