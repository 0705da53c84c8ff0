//! Error taxonomy shared by every engine

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    /// Malformed or out-of-range input, rejected before any computation
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameters { parameter: String, reason: String },

    /// Holding period or principal that cannot describe an investment
    #[error("invalid range for `{parameter}`: {reason}")]
    InvalidRange { parameter: String, reason: String },

    /// A date in the requested range has no rate and no inferable classification
    #[error("no daily rate available for {0}")]
    RateUnavailable(NaiveDate),

    /// Mathematically undefined summary (zero base or zero horizon)
    #[error("degenerate simulation: {0}")]
    DegenerateSimulation(String),

    #[error("invalid table: {0}")]
    InvalidTable(String),

    #[error("could not parse `{input}`: {reason}")]
    Parse { input: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CalcError {
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidParameters {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_range(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidRange {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_trigger() {
        let err = CalcError::invalid_parameter("years", "must be >= 0, got -1");
        assert_eq!(err.to_string(), "invalid parameter `years`: must be >= 0, got -1");

        let date = NaiveDate::from_ymd_opt(2023, 7, 3).unwrap();
        assert_eq!(
            CalcError::RateUnavailable(date).to_string(),
            "no daily rate available for 2023-07-03"
        );
    }
}
