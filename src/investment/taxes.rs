//! Income tax (IR) and regressive transaction tax (IOF) on investment profit

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};

/// Holding periods of this many days or more pay no transaction tax
pub const TRANSACTION_TAX_WINDOW_DAYS: u32 = 30;

/// Official regressive IOF schedule, percent of profit for days 1..=29
const DEFAULT_TRANSACTION_TAX_PCT: [f64; 29] = [
    96.0, 93.0, 90.0, 86.0, 83.0, 80.0, 76.0, 73.0, 70.0, 66.0, 63.0, 60.0, 56.0, 53.0, 50.0,
    46.0, 43.0, 40.0, 36.0, 33.0, 30.0, 26.0, 23.0, 20.0, 16.0, 13.0, 10.0, 6.0, 3.0,
];

/// One income-tax bracket: holding periods up to `max_days` pay `rate_pct`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeTaxBracket {
    /// Inclusive upper bound; `None` for the open-ended last bracket
    pub max_days: Option<u32>,
    pub rate_pct: f64,
}

/// Income-tax rates stepped by holding-period length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeTaxSchedule {
    brackets: Vec<IncomeTaxBracket>,
}

impl Default for IncomeTaxSchedule {
    fn default() -> Self {
        Self {
            brackets: vec![
                IncomeTaxBracket { max_days: Some(180), rate_pct: 22.5 },
                IncomeTaxBracket { max_days: Some(360), rate_pct: 20.0 },
                IncomeTaxBracket { max_days: Some(720), rate_pct: 17.5 },
                IncomeTaxBracket { max_days: None, rate_pct: 15.0 },
            ],
        }
    }
}

impl IncomeTaxSchedule {
    /// Brackets must have strictly increasing bounds and end open-ended
    pub fn new(brackets: Vec<IncomeTaxBracket>) -> Result<Self> {
        match brackets.last() {
            None => return Err(CalcError::InvalidTable("income tax schedule is empty".to_string())),
            Some(last) if last.max_days.is_some() => {
                return Err(CalcError::InvalidTable(
                    "last income tax bracket must be open-ended".to_string(),
                ))
            }
            Some(_) => {}
        }

        let mut previous: Option<u32> = None;
        for (i, bracket) in brackets.iter().enumerate() {
            if !(0.0..=100.0).contains(&bracket.rate_pct) {
                return Err(CalcError::InvalidTable(format!(
                    "bracket {} rate {}% outside [0, 100]",
                    i + 1,
                    bracket.rate_pct
                )));
            }
            if i + 1 < brackets.len() {
                let bound = bracket.max_days.ok_or_else(|| {
                    CalcError::InvalidTable(format!("bracket {} is open-ended but not last", i + 1))
                })?;
                if previous.is_some_and(|p| bound <= p) {
                    return Err(CalcError::InvalidTable(format!(
                        "bracket {} bound {} days is not above the previous bracket",
                        i + 1,
                        bound
                    )));
                }
                previous = Some(bound);
            }
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[IncomeTaxBracket] {
        &self.brackets
    }

    /// Rate (percent) for a holding period of `total_days`
    pub fn rate_pct(&self, total_days: u32) -> f64 {
        self.brackets
            .iter()
            .find(|b| b.max_days.map_or(true, |max| total_days <= max))
            .map_or(0.0, |b| b.rate_pct)
    }
}

/// Day-indexed IOF percentages; entry `i` applies to a holding period of `i + 1` days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionTaxTable {
    rates_pct: Vec<f64>,
}

impl Default for TransactionTaxTable {
    fn default() -> Self {
        Self {
            rates_pct: DEFAULT_TRANSACTION_TAX_PCT.to_vec(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TableRow {
    day: u32,
    rate_pct: f64,
}

impl TransactionTaxTable {
    /// Percentages for days `1..=rates_pct.len()`; at most 29 entries, each in [0, 100]
    pub fn new(rates_pct: Vec<f64>) -> Result<Self> {
        let max_len = (TRANSACTION_TAX_WINDOW_DAYS - 1) as usize;
        if rates_pct.len() > max_len {
            return Err(CalcError::InvalidTable(format!(
                "transaction tax table has {} entries, at most {} allowed",
                rates_pct.len(),
                max_len
            )));
        }
        if let Some((i, rate)) = rates_pct
            .iter()
            .enumerate()
            .find(|(_, r)| !(0.0..=100.0).contains(*r))
        {
            return Err(CalcError::InvalidTable(format!(
                "day {} rate {}% outside [0, 100]",
                i + 1,
                rate
            )));
        }
        Ok(Self { rates_pct })
    }

    /// Load a `day,rate_pct` CSV file
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let table = Self::from_csv_reader(file)?;
        debug!("Loaded {}-day transaction tax table from {}", table.len(), path.as_ref().display());
        Ok(table)
    }

    /// Rows may come in any order but must cover days 1..=n without gaps
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut rows = Vec::new();
        for row in reader.deserialize::<TableRow>() {
            rows.push(row?);
        }
        rows.sort_by_key(|r| r.day);

        for (i, row) in rows.iter().enumerate() {
            let expected = i as u32 + 1;
            if row.day != expected {
                return Err(CalcError::InvalidTable(format!(
                    "expected day {} but found day {}",
                    expected, row.day
                )));
            }
        }

        Self::new(rows.into_iter().map(|r| r.rate_pct).collect())
    }

    pub fn len(&self) -> usize {
        self.rates_pct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates_pct.is_empty()
    }

    /// Rate (percent) for a holding period of `total_days`; zero outside the table
    pub fn rate_pct(&self, total_days: u32) -> f64 {
        if total_days == 0 || total_days >= TRANSACTION_TAX_WINDOW_DAYS {
            return 0.0;
        }
        self.rates_pct
            .get(total_days as usize - 1)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Income tax owed and the bracket rate that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncomeTax {
    pub amount: f64,
    pub rate_pct: f64,
}

/// Applies both tax tables to a gross profit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxEngine {
    pub income_tax: IncomeTaxSchedule,
    pub transaction_tax: TransactionTaxTable,
}

impl TaxEngine {
    pub fn new(income_tax: IncomeTaxSchedule, transaction_tax: TransactionTaxTable) -> Self {
        Self { income_tax, transaction_tax }
    }

    /// Bracket rate always reported; amount is zero on a loss
    pub fn compute_income_tax(&self, gross_profit: f64, total_days: u32) -> IncomeTax {
        let rate_pct = self.income_tax.rate_pct(total_days);
        let amount = if gross_profit > 0.0 {
            gross_profit * rate_pct / 100.0
        } else {
            0.0
        };
        IncomeTax { amount, rate_pct }
    }

    pub fn compute_transaction_tax(&self, gross_profit: f64, total_days: u32) -> f64 {
        if gross_profit <= 0.0 {
            return 0.0;
        }
        gross_profit * self.transaction_tax.rate_pct(total_days) / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    #[test]
    fn test_income_tax_boundaries() {
        let taxes = TaxEngine::default();
        let rate = |days| taxes.compute_income_tax(1000.0, days).rate_pct;

        assert_eq!(rate(0), 22.5);
        assert_eq!(rate(180), 22.5);
        assert_eq!(rate(181), 20.0);
        assert_eq!(rate(360), 20.0);
        assert_eq!(rate(361), 17.5);
        assert_eq!(rate(720), 17.5);
        assert_eq!(rate(721), 15.0);
        assert_eq!(rate(10_000), 15.0);
    }

    #[test]
    fn test_income_tax_amount() {
        let tax = TaxEngine::default().compute_income_tax(1000.0, 400);
        assert_relative_eq!(tax.amount, 175.0);
        assert_eq!(tax.rate_pct, 17.5);
    }

    #[test]
    fn test_loss_pays_no_tax() {
        let taxes = TaxEngine::default();
        let tax = taxes.compute_income_tax(-50.0, 10);
        assert_eq!(tax.amount, 0.0);
        assert_eq!(tax.rate_pct, 22.5);
        assert_eq!(taxes.compute_transaction_tax(-50.0, 10), 0.0);
        assert_eq!(taxes.compute_transaction_tax(0.0, 10), 0.0);
    }

    #[test]
    fn test_transaction_tax_window() {
        let taxes = TaxEngine::default();
        for days in 1..30 {
            assert!(taxes.compute_transaction_tax(100.0, days) > 0.0, "day {}", days);
        }
        assert_eq!(taxes.compute_transaction_tax(100.0, 30), 0.0);
        assert_eq!(taxes.compute_transaction_tax(100.0, 31), 0.0);
        assert_relative_eq!(taxes.compute_transaction_tax(100.0, 1), 96.0);
        assert_relative_eq!(taxes.compute_transaction_tax(100.0, 24), 20.0);
        assert_relative_eq!(taxes.compute_transaction_tax(100.0, 29), 3.0);
    }

    #[test]
    fn test_default_table_is_regressive() {
        let table = TransactionTaxTable::default();
        assert_eq!(table.len(), 29);
        for day in 2..30 {
            assert!(table.rate_pct(day) < table.rate_pct(day - 1));
        }
    }

    #[test]
    fn test_table_rejects_too_many_entries() {
        assert!(matches!(
            TransactionTaxTable::new(vec![1.0; 30]),
            Err(CalcError::InvalidTable(_))
        ));
        assert!(TransactionTaxTable::new(vec![120.0]).is_err());
    }

    #[test]
    fn test_table_from_csv() {
        let csv = "day,rate_pct\n2,50\n1,100\n3,10\n";
        let table = TransactionTaxTable::from_csv_reader(Cursor::new(csv)).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rate_pct(1), 100.0);
        assert_eq!(table.rate_pct(3), 10.0);
        assert_eq!(table.rate_pct(4), 0.0);
    }

    #[test]
    fn test_table_from_csv_with_gap() {
        let csv = "day,rate_pct\n1,100\n3,10\n";
        let err = TransactionTaxTable::from_csv_reader(Cursor::new(csv)).unwrap_err();
        assert!(err.to_string().contains("expected day 2"));
    }

    #[test]
    fn test_custom_income_schedule() {
        let schedule = IncomeTaxSchedule::new(vec![
            IncomeTaxBracket { max_days: Some(30), rate_pct: 30.0 },
            IncomeTaxBracket { max_days: None, rate_pct: 10.0 },
        ])
        .unwrap();
        assert_eq!(schedule.rate_pct(30), 30.0);
        assert_eq!(schedule.rate_pct(31), 10.0);

        let bad = IncomeTaxSchedule::new(vec![IncomeTaxBracket { max_days: Some(30), rate_pct: 30.0 }]);
        assert!(bad.is_err());

        let unordered = IncomeTaxSchedule::new(vec![
            IncomeTaxBracket { max_days: Some(60), rate_pct: 30.0 },
            IncomeTaxBracket { max_days: Some(30), rate_pct: 20.0 },
            IncomeTaxBracket { max_days: None, rate_pct: 10.0 },
        ]);
        assert!(unordered.is_err());
    }
}
