//! Long-horizon contribution simulation
//!
//! Projects monthly gross and net balances under periodic contributions,
//! compound growth, dividends, administrative fees and taxes, then
//! annualizes the outcome nominally and after inflation.

mod engine;
mod frequency;
mod records;
mod state;

pub use engine::{run_batch, SimulationConfig, SimulationEngine, MAX_YEARS};
pub use frequency::ContributionFrequency;
pub use records::{SimulationMonthRecord, SimulationProjection, SimulationResult, SimulationSummary};
pub use state::{MonthFlows, SimulationState};
