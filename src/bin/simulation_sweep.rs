//! Run a batch of contribution simulations from a scenarios CSV
//!
//! Input columns: `scenario,initial_investment,contribution_amount,years,annual_return,
//! admin_rate_pct,tax_rate_pct,inflation_annual,contribution_frequency,dividend_yield`.
//! One summary row per scenario is written to the output CSV; scenarios that
//! fail validation are reported in the `error` column.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use selic_yield::api::SimulationRequest;
use selic_yield::simulation::{SimulationEngine, SimulationSummary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[command(name = "simulation_sweep", about = "Batch contribution simulations")]
struct Cli {
    /// Scenarios CSV
    input: PathBuf,

    /// Summary CSV to write
    #[arg(long, default_value = "simulation_sweep_output.csv")]
    output: PathBuf,
}

/// Raw CSV row
#[derive(Debug, Deserialize)]
struct ScenarioRow {
    scenario: String,
    initial_investment: f64,
    contribution_amount: f64,
    years: i32,
    annual_return: f64,
    admin_rate_pct: f64,
    tax_rate_pct: f64,
    inflation_annual: f64,
    contribution_frequency: String,
    #[serde(default)]
    dividend_yield: f64,
}

impl ScenarioRow {
    fn to_request(&self) -> SimulationRequest {
        SimulationRequest {
            initial_investment: self.initial_investment,
            contribution_amount: self.contribution_amount,
            years: self.years,
            annual_return: self.annual_return,
            admin_rate_pct: self.admin_rate_pct,
            tax_rate_pct: self.tax_rate_pct,
            inflation_annual: self.inflation_annual,
            contribution_frequency: self.contribution_frequency.clone(),
            dividend_yield: self.dividend_yield,
            include_monthly_detail: false,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct OutputRow {
    scenario: String,
    total_contributed: Option<f64>,
    final_gross_value: Option<f64>,
    final_net_value: Option<f64>,
    inflation_adjusted_net_value: Option<f64>,
    total_taxes: Option<f64>,
    total_admin_fees: Option<f64>,
    annualized_net_return_pct: Option<f64>,
    annualized_real_return_pct: Option<f64>,
    error: Option<String>,
}

impl OutputRow {
    fn from_summary(scenario: String, s: &SimulationSummary) -> Self {
        Self {
            scenario,
            total_contributed: Some(s.total_contributed),
            final_gross_value: Some(s.final_gross_value),
            final_net_value: Some(s.final_net_value),
            inflation_adjusted_net_value: Some(s.inflation_adjusted_net_value),
            total_taxes: Some(s.total_taxes),
            total_admin_fees: Some(s.total_admin_fees),
            annualized_net_return_pct: Some(s.annualized_net_return_pct),
            annualized_real_return_pct: Some(s.annualized_real_return_pct),
            error: None,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&cli.input)
        .with_context(|| format!("Unable to open {}", cli.input.display()))?;
    let scenarios: Vec<ScenarioRow> = reader
        .deserialize()
        .collect::<std::result::Result<Vec<ScenarioRow>, csv::Error>>()
        .context("Failed to parse scenarios")?;
    println!("Loaded {} scenarios in {:?}", scenarios.len(), start.elapsed());

    let run_start = Instant::now();
    let rows: Vec<OutputRow> = scenarios
        .par_iter()
        .map(|row| {
            let summary = row
                .to_request()
                .to_config()
                .and_then(SimulationEngine::new)
                .and_then(|engine| engine.summary());
            match summary {
                Ok(summary) => OutputRow::from_summary(row.scenario.clone(), &summary),
                Err(err) => {
                    log::warn!("Scenario {} failed: {}", row.scenario, err);
                    OutputRow {
                        scenario: row.scenario.clone(),
                        error: Some(err.to_string()),
                        ..Default::default()
                    }
                }
            }
        })
        .collect();
    println!("Simulations complete in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("Unable to create {}", cli.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    println!("{} scenarios written to {} ({} failed)", rows.len(), cli.output.display(), failed);
    Ok(())
}
