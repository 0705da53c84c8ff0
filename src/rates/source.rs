//! Rate lookup contracts and their in-process implementations

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::store::{ConflictPolicy, RateStore, UpsertOutcome};
use super::types::DailyRate;
use crate::calendar::{BusinessDayClassifier, DayKind};
use crate::error::{CalcError, Result};

/// Yields the daily rate and business-day status of a date.
///
/// Engines call `lookup` once per accrual date; implementations that reach
/// out to remote services are expected to memoize.
pub trait RateSource {
    fn lookup(&self, date: NaiveDate) -> Result<DailyRate>;
}

impl<F> RateSource for F
where
    F: Fn(NaiveDate) -> Result<DailyRate>,
{
    fn lookup(&self, date: NaiveDate) -> Result<DailyRate> {
        self(date)
    }
}

/// A bare store only knows what was recorded
impl RateSource for RateStore {
    fn lookup(&self, date: NaiveDate) -> Result<DailyRate> {
        self.get(date).copied().ok_or(CalcError::RateUnavailable(date))
    }
}

/// What to do with a calendar business day that has no recorded rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRatePolicy {
    /// Fail with `RateUnavailable`
    #[default]
    Strict,
    /// Assume an unlisted holiday and accrue nothing
    TreatAsHoliday,
}

impl fmt::Display for MissingRatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingRatePolicy::Strict => f.write_str("strict"),
            MissingRatePolicy::TreatAsHoliday => f.write_str("treat_as_holiday"),
        }
    }
}

impl FromStr for MissingRatePolicy {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "strict" => Ok(MissingRatePolicy::Strict),
            "treat_as_holiday" | "holiday" => Ok(MissingRatePolicy::TreatAsHoliday),
            other => Err(CalcError::invalid_parameter(
                "missing_rate_policy",
                format!("unknown policy `{}` (expected strict or treat_as_holiday)", other),
            )),
        }
    }
}

/// Recorded rates backed by a business-day classifier.
///
/// A recorded entry always wins. A missing entry is resolved through the
/// classifier: weekends and holidays accrue nothing, while a business (or
/// unknown) day without data is an error unless the caller opted into
/// [`MissingRatePolicy::TreatAsHoliday`].
#[derive(Debug, Clone)]
pub struct CalendarRateSource<C> {
    store: RateStore,
    classifier: C,
    missing: MissingRatePolicy,
}

impl<C: BusinessDayClassifier> CalendarRateSource<C> {
    pub fn new(store: RateStore, classifier: C) -> Self {
        Self {
            store,
            classifier,
            missing: MissingRatePolicy::default(),
        }
    }

    pub fn with_missing_policy(mut self, missing: MissingRatePolicy) -> Self {
        self.missing = missing;
        self
    }

    pub fn store(&self) -> &RateStore {
        &self.store
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn missing_policy(&self) -> MissingRatePolicy {
        self.missing
    }

    /// Classification combining the calendar with recorded data.
    ///
    /// A calendar business day recorded without a session is reported as a
    /// holiday the calendar does not list.
    pub fn day_kind(&self, date: NaiveDate) -> DayKind {
        let kind = self.classifier.classify(date);
        match self.store.get(date) {
            Some(rate) if rate.is_business_day() => DayKind::Business,
            Some(_) if matches!(kind, DayKind::Business | DayKind::Unknown) => DayKind::Holiday,
            _ => kind,
        }
    }
}

impl<C: BusinessDayClassifier> RateSource for CalendarRateSource<C> {
    fn lookup(&self, date: NaiveDate) -> Result<DailyRate> {
        let kind = self.classifier.classify(date);

        if let Some(rate) = self.store.get(date) {
            if !rate.is_business_day() && kind == DayKind::Business {
                debug!("{} recorded without a session on a calendar business day; unlisted holiday", date);
            } else if rate.is_business_day() && matches!(kind, DayKind::Weekend | DayKind::Holiday) {
                warn!("{} has a recorded rate but the calendar marks it as {}", date, kind.as_str());
            }
            return Ok(*rate);
        }

        match kind {
            DayKind::Weekend | DayKind::Holiday => Ok(DailyRate::non_business(date)),
            DayKind::Business | DayKind::Unknown => match self.missing {
                MissingRatePolicy::Strict => Err(CalcError::RateUnavailable(date)),
                MissingRatePolicy::TreatAsHoliday => {
                    warn!("No rate recorded for {} ({}); treating as holiday", date, kind.as_str());
                    Ok(DailyRate::non_business(date))
                }
            },
        }
    }
}

/// Remote side of a [`SharedRateCache`]: resolves one date per call
pub trait RateFetcher: Send + Sync {
    fn fetch(&self, date: NaiveDate) -> Result<DailyRate>;
}

impl<F> RateFetcher for F
where
    F: Fn(NaiveDate) -> Result<DailyRate> + Send + Sync,
{
    fn fetch(&self, date: NaiveDate) -> Result<DailyRate> {
        self(date)
    }
}

/// Rate cache shared across concurrent calculations.
///
/// At most one fetch per date is in flight at any time: concurrent lookups of
/// the same unknown date wait on a per-date gate and then read the stored
/// result. Writes go through one [`ConflictPolicy`], so every reader sees the
/// same sorted, deduplicated view.
pub struct SharedRateCache<F> {
    fetcher: F,
    policy: ConflictPolicy,
    store: RwLock<RateStore>,
    in_flight: Mutex<HashMap<NaiveDate, Arc<Mutex<()>>>>,
}

impl<F: RateFetcher> SharedRateCache<F> {
    pub fn new(fetcher: F, policy: ConflictPolicy) -> Self {
        Self::with_store(fetcher, RateStore::new(), policy)
    }

    /// Start from previously loaded rates
    pub fn with_store(fetcher: F, store: RateStore, policy: ConflictPolicy) -> Self {
        Self {
            fetcher,
            policy,
            store: RwLock::new(store),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Record a rate obtained elsewhere
    pub fn upsert(&self, rate: DailyRate) -> UpsertOutcome {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .upsert(rate, self.policy)
    }

    /// Point-in-time copy of every cached rate
    pub fn snapshot(&self) -> RateStore {
        self.store.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.store.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, date: NaiveDate) -> Option<DailyRate> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(date)
            .copied()
    }

    fn gate(&self, date: NaiveDate) -> Arc<Mutex<()>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(date)
            .or_default()
            .clone()
    }

    /// Drop the gate of `date` once no other caller holds or awaits it.
    ///
    /// Called with the gate still locked. Waiters keep their clone of the
    /// gate, so after a failed fetch they retry one at a time on the same
    /// lock and new callers keep finding it in the map.
    fn release(&self, date: NaiveDate, gate: &Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // one reference in the map, one held by the caller
        if Arc::strong_count(gate) <= 2 {
            in_flight.remove(&date);
        }
    }
}

impl<F: RateFetcher> RateSource for SharedRateCache<F> {
    fn lookup(&self, date: NaiveDate) -> Result<DailyRate> {
        if let Some(rate) = self.cached(date) {
            return Ok(rate);
        }

        let gate = self.gate(date);
        let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);

        // another caller may have completed the fetch while we waited
        if let Some(rate) = self.cached(date) {
            return Ok(rate);
        }

        debug!("Fetching rate for {}", date);
        let fetched = self.fetcher.fetch(date);
        if let Ok(rate) = &fetched {
            self.upsert(*rate);
        }
        self.release(date, &gate);

        fetched?;
        self.cached(date).ok_or(CalcError::RateUnavailable(date))
    }
}
