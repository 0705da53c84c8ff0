//! Read-only loaders for rate snapshots
//!
//! Two formats are understood:
//! - the central bank feed snapshot, JSON `{"registros": [{"dataCotacao": "DD/MM/YYYY", "fatorDiario": "1.00049037"}]}`
//! - a flat CSV with columns `date,daily_rate,is_business_day`

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use super::store::{ConflictPolicy, RateStore};
use super::types::DailyRate;
use crate::calendar::parse_date;
use crate::error::{CalcError, Result};

/// Feed snapshot envelope
#[derive(Debug, Deserialize)]
struct FeedSnapshot {
    #[serde(default)]
    registros: Vec<FeedRecord>,
}

#[derive(Debug, Deserialize)]
struct FeedRecord {
    #[serde(rename = "dataCotacao")]
    data_cotacao: String,
    #[serde(rename = "fatorDiario")]
    fator_diario: FeedFactor,
}

/// The feed writes factors as strings; hand-edited snapshots often use numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedFactor {
    Number(f64),
    Text(String),
}

impl FeedRecord {
    fn to_rate(&self) -> Result<DailyRate> {
        let date = parse_date(&self.data_cotacao)?;
        let factor = match &self.fator_diario {
            FeedFactor::Number(value) => *value,
            FeedFactor::Text(text) => text.trim().parse().map_err(|_| CalcError::Parse {
                input: text.clone(),
                reason: format!("daily factor for {} is not a number", self.data_cotacao),
            })?,
        };
        DailyRate::from_feed_factor(date, factor)
    }
}

/// Raw CSV row
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    daily_rate: f64,
    #[serde(default = "default_business_day")]
    is_business_day: bool,
}

fn default_business_day() -> bool {
    true
}

impl CsvRow {
    fn to_rate(&self) -> Result<DailyRate> {
        let date = parse_date(&self.date)?;
        if !self.is_business_day {
            if self.daily_rate != 0.0 {
                warn!("{} marked non-business with rate {}; using zero", date, self.daily_rate);
            }
            return Ok(DailyRate::non_business(date));
        }
        DailyRate::business(date, self.daily_rate)
    }
}

/// Load a feed snapshot file
pub fn load_feed_snapshot<P: AsRef<Path>>(path: P, policy: ConflictPolicy) -> Result<RateStore> {
    let file = File::open(path.as_ref())?;
    let store = read_feed_snapshot(file, policy)?;
    info!("Loaded {} daily rates from {}", store.len(), path.as_ref().display());
    Ok(store)
}

pub fn read_feed_snapshot<R: Read>(reader: R, policy: ConflictPolicy) -> Result<RateStore> {
    let snapshot: FeedSnapshot = serde_json::from_reader(reader)?;
    let rates = snapshot
        .registros
        .iter()
        .map(FeedRecord::to_rate)
        .collect::<Result<Vec<_>>>()?;
    Ok(build_store(rates, policy))
}

/// Load a `date,daily_rate,is_business_day` CSV file
pub fn load_rates_csv<P: AsRef<Path>>(path: P, policy: ConflictPolicy) -> Result<RateStore> {
    let file = File::open(path.as_ref())?;
    let store = read_rates_csv(file, policy)?;
    info!("Loaded {} daily rates from {}", store.len(), path.as_ref().display());
    Ok(store)
}

pub fn read_rates_csv<R: Read>(reader: R, policy: ConflictPolicy) -> Result<RateStore> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rates = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        rates.push(row?.to_rate()?);
    }
    Ok(build_store(rates, policy))
}

/// Pick the loader from the file extension (`.json` feed snapshot, anything else CSV)
pub fn load_rates<P: AsRef<Path>>(path: P, policy: ConflictPolicy) -> Result<RateStore> {
    let is_json = path
        .as_ref()
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        load_feed_snapshot(path, policy)
    } else {
        load_rates_csv(path, policy)
    }
}

fn build_store(rates: Vec<DailyRate>, policy: ConflictPolicy) -> RateStore {
    let mut store = RateStore::new();
    let stats = store.merge(rates, policy);
    if stats.duplicates() > 0 {
        warn!(
            "{} duplicate dates resolved with {} policy ({} replaced, {} kept)",
            stats.duplicates(),
            policy,
            stats.replaced,
            stats.kept
        );
    }
    store
}
