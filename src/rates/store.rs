//! Ordered, deduplicated daily rate store

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::DailyRate;
use crate::calendar::HoldingPeriod;
use crate::error::{CalcError, Result};

/// How to resolve two rates recorded for the same date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The incoming record replaces the stored one
    #[default]
    MostRecent,
    /// Keep whichever rate is larger
    Maximum,
    /// Keep the smaller non-zero rate; a zero never displaces a non-zero
    MinimumNonZero,
}

impl ConflictPolicy {
    /// Whether `incoming` should replace `existing`
    fn prefers(&self, existing: &DailyRate, incoming: &DailyRate) -> bool {
        let old = existing.daily_rate_factor();
        let new = incoming.daily_rate_factor();
        match self {
            ConflictPolicy::MostRecent => true,
            ConflictPolicy::Maximum => new > old,
            ConflictPolicy::MinimumNonZero => {
                if new == 0.0 {
                    false
                } else if old == 0.0 {
                    true
                } else {
                    new < old
                }
            }
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConflictPolicy::MostRecent => "most_recent",
            ConflictPolicy::Maximum => "maximum",
            ConflictPolicy::MinimumNonZero => "minimum_non_zero",
        };
        f.write_str(name)
    }
}

impl FromStr for ConflictPolicy {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "most_recent" | "recent" => Ok(ConflictPolicy::MostRecent),
            "maximum" | "max" => Ok(ConflictPolicy::Maximum),
            "minimum_non_zero" | "min" => Ok(ConflictPolicy::MinimumNonZero),
            other => Err(CalcError::invalid_parameter(
                "conflict_policy",
                format!("unknown policy `{}` (expected most_recent, maximum or minimum_non_zero)", other),
            )),
        }
    }
}

/// Result of a single upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
    Kept,
}

/// Counters for a bulk merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub inserted: usize,
    pub replaced: usize,
    pub kept: usize,
}

impl MergeStats {
    /// Number of incoming records that collided with an existing date
    pub fn duplicates(&self) -> usize {
        self.replaced + self.kept
    }
}

/// Daily rates keyed by canonical date, always sorted and unique per date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateStore {
    rates: BTreeMap<NaiveDate, DailyRate>,
}

impl RateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, resolving duplicates with `policy`
    pub fn from_rates<I>(rates: I, policy: ConflictPolicy) -> Self
    where
        I: IntoIterator<Item = DailyRate>,
    {
        let mut store = Self::new();
        store.merge(rates, policy);
        store
    }

    pub fn upsert(&mut self, rate: DailyRate, policy: ConflictPolicy) -> UpsertOutcome {
        match self.rates.get_mut(&rate.date()) {
            None => {
                self.rates.insert(rate.date(), rate);
                UpsertOutcome::Inserted
            }
            Some(existing) if policy.prefers(existing, &rate) => {
                *existing = rate;
                UpsertOutcome::Replaced
            }
            Some(_) => UpsertOutcome::Kept,
        }
    }

    pub fn merge<I>(&mut self, rates: I, policy: ConflictPolicy) -> MergeStats
    where
        I: IntoIterator<Item = DailyRate>,
    {
        let mut stats = MergeStats::default();
        for rate in rates {
            match self.upsert(rate, policy) {
                UpsertOutcome::Inserted => stats.inserted += 1,
                UpsertOutcome::Replaced => stats.replaced += 1,
                UpsertOutcome::Kept => stats.kept += 1,
            }
        }
        stats
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyRate> {
        self.rates.get(&date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.rates.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// All rates in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = &DailyRate> {
        self.rates.values()
    }

    /// Rates within an inclusive date range, ascending
    pub fn range(&self, dates: RangeInclusive<NaiveDate>) -> impl Iterator<Item = &DailyRate> {
        self.rates.range(dates).map(|(_, rate)| rate)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rates.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rates.keys().next_back().copied()
    }

    /// Accrual dates of `period` that have no record
    pub fn missing_dates(&self, period: &HoldingPeriod) -> Vec<NaiveDate> {
        period
            .accrual_days()
            .filter(|d| !self.rates.contains_key(d))
            .collect()
    }
}
