//! Contribution cadence

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};

/// How often the periodic contribution is made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionFrequency {
    #[default]
    Monthly,
    Bimonthly,
    Quarterly,
    Semiannually,
    Annually,
    None,
}

impl ContributionFrequency {
    pub const ALL: [ContributionFrequency; 6] = [
        ContributionFrequency::Monthly,
        ContributionFrequency::Bimonthly,
        ContributionFrequency::Quarterly,
        ContributionFrequency::Semiannually,
        ContributionFrequency::Annually,
        ContributionFrequency::None,
    ];

    /// Months between contributions; `None` when no contributions are made
    pub fn interval_months(&self) -> Option<u32> {
        match self {
            ContributionFrequency::Monthly => Some(1),
            ContributionFrequency::Bimonthly => Some(2),
            ContributionFrequency::Quarterly => Some(3),
            ContributionFrequency::Semiannually => Some(6),
            ContributionFrequency::Annually => Some(12),
            ContributionFrequency::None => None,
        }
    }

    /// Whether a contribution lands in 1-indexed `month`
    pub fn contributes_in(&self, month: u32) -> bool {
        self.interval_months()
            .is_some_and(|interval| month > 0 && month % interval == 0)
    }

    /// Contributions made over `months`
    pub fn contributions_over(&self, months: u32) -> u32 {
        self.interval_months().map_or(0, |interval| months / interval)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionFrequency::Monthly => "monthly",
            ContributionFrequency::Bimonthly => "bimonthly",
            ContributionFrequency::Quarterly => "quarterly",
            ContributionFrequency::Semiannually => "semiannually",
            ContributionFrequency::Annually => "annually",
            ContributionFrequency::None => "none",
        }
    }
}

impl fmt::Display for ContributionFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContributionFrequency {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|freq| freq.as_str() == wanted)
            .ok_or_else(|| {
                CalcError::invalid_parameter(
                    "contribution_frequency",
                    format!(
                        "unknown frequency `{}` (expected monthly, bimonthly, quarterly, semiannually, annually or none)",
                        s
                    ),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence() {
        let quarterly = ContributionFrequency::Quarterly;
        let months: Vec<u32> = (1..=12).filter(|&m| quarterly.contributes_in(m)).collect();
        assert_eq!(months, vec![3, 6, 9, 12]);

        assert!(!ContributionFrequency::None.contributes_in(12));
        assert!(!ContributionFrequency::Monthly.contributes_in(0));
        assert_eq!(ContributionFrequency::Bimonthly.contributions_over(240), 120);
        assert_eq!(ContributionFrequency::None.contributions_over(240), 0);
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "Semiannually".parse::<ContributionFrequency>().unwrap(),
            ContributionFrequency::Semiannually
        );
        assert_eq!(" none ".parse::<ContributionFrequency>().unwrap(), ContributionFrequency::None);

        let err = "weekly".parse::<ContributionFrequency>().unwrap_err();
        assert!(err.to_string().contains("contribution_frequency"));
        assert!(err.to_string().contains("weekly"));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ContributionFrequency::Annually).unwrap();
        assert_eq!(json, "\"annually\"");
        let freq: ContributionFrequency = serde_json::from_str("\"quarterly\"").unwrap();
        assert_eq!(freq, ContributionFrequency::Quarterly);
    }
}
