//! Runtime settings
//!
//! Loaded from a JSON file; every field is optional:
//!
//! ```json
//! {
//!   "rates_path": "data/selic_cache.json",
//!   "holidays_path": "data/holidays.json",
//!   "transaction_tax_table_path": "data/iof.csv",
//!   "missing_rate_policy": "strict",
//!   "conflict_policy": "most_recent",
//!   "admin_rate_pct": 0.0,
//!   "custody_rate_pct": 0.0
//! }
//! ```

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::calendar::{BusinessDayClassifier, HolidayCalendar, NationalCalendar};
use crate::error::Result;
use crate::investment::{IncomeTaxSchedule, InvestmentConfig, TaxEngine, TransactionTaxTable};
use crate::rates::{load_rates, CalendarRateSource, ConflictPolicy, MissingRatePolicy, RateStore};

/// Classifier chosen at runtime
pub type DynClassifier = Box<dyn BusinessDayClassifier + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rate snapshot: feed JSON (`.json`) or `date,daily_rate,is_business_day` CSV
    pub rates_path: Option<PathBuf>,

    /// Per-year holiday JSON; the rule-based national calendar is used when absent
    pub holidays_path: Option<PathBuf>,

    /// `day,rate_pct` CSV replacing the default IOF schedule
    pub transaction_tax_table_path: Option<PathBuf>,

    pub missing_rate_policy: MissingRatePolicy,

    /// Resolution of duplicate dates while loading rates
    pub conflict_policy: ConflictPolicy,

    /// Default annual administrative fee, percent
    pub admin_rate_pct: f64,

    /// Default annual custody fee, percent
    pub custody_rate_pct: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rates_path: None,
            holidays_path: None,
            transaction_tax_table_path: None,
            missing_rate_policy: MissingRatePolicy::Strict,
            conflict_policy: ConflictPolicy::MostRecent,
            admin_rate_pct: 0.0,
            custody_rate_pct: 0.0,
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let settings = Self::from_reader(file)?;
        info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn investment_config(&self) -> InvestmentConfig {
        InvestmentConfig {
            admin_rate_pct: self.admin_rate_pct,
            custody_rate_pct: self.custody_rate_pct,
            apply_taxes: true,
        }
    }

    pub fn tax_engine(&self) -> Result<TaxEngine> {
        let transaction_tax = match &self.transaction_tax_table_path {
            Some(path) => TransactionTaxTable::from_csv_path(path)?,
            None => TransactionTaxTable::default(),
        };
        Ok(TaxEngine::new(IncomeTaxSchedule::default(), transaction_tax))
    }

    pub fn rate_store(&self) -> Result<RateStore> {
        match &self.rates_path {
            Some(path) => load_rates(path, self.conflict_policy),
            None => {
                debug!("No rate snapshot configured; starting empty");
                Ok(RateStore::new())
            }
        }
    }

    pub fn classifier(&self) -> Result<DynClassifier> {
        match &self.holidays_path {
            Some(path) => Ok(Box::new(HolidayCalendar::from_json_path(path)?)),
            None => Ok(Box::new(NationalCalendar)),
        }
    }

    /// Rate source combining the configured snapshot and calendar
    pub fn rate_source(&self) -> Result<CalendarRateSource<DynClassifier>> {
        Ok(CalendarRateSource::new(self.rate_store()?, self.classifier()?)
            .with_missing_policy(self.missing_rate_policy))
    }
}
