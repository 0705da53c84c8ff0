//! SELIC-indexed investment calculations
//!
//! Compounding of daily rates, IR/IOF taxes, pro-rated fees, and the
//! assembler that combines them into one [`InvestmentResult`].

mod analysis;
mod compounding;
mod engine;
mod fees;
mod result;
mod taxes;

pub use analysis::{analyze, DayDetail, InvestmentAnalysis};
pub use compounding::{compound, compound_period, CompoundingOutcome};
pub use engine::{InvestmentConfig, InvestmentEngine};
pub use fees::{compute_fee, FeeAmounts, FeeSchedule, DAYS_PER_YEAR};
pub use result::{round_money, InvestmentResult};
pub use taxes::{
    IncomeTax, IncomeTaxBracket, IncomeTaxSchedule, TaxEngine, TransactionTaxTable,
    TRANSACTION_TAX_WINDOW_DAYS,
};
