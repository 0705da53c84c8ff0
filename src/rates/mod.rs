//! Daily reference rates: records, the in-memory store, lookup sources and snapshot loaders

mod loader;
mod source;
mod store;
mod types;

pub use loader::{
    load_feed_snapshot, load_rates, load_rates_csv, read_feed_snapshot, read_rates_csv,
};
pub use source::{
    CalendarRateSource, MissingRatePolicy, RateFetcher, RateSource, SharedRateCache,
};
pub use store::{ConflictPolicy, MergeStats, RateStore, UpsertOutcome};
pub use types::DailyRate;
