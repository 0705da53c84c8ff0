//! SELIC yield CLI
//!
//! Command-line front end for investment yield, analysis, simulation, daily
//! rate and business-day queries. Rates and holidays come from the settings
//! file or the flags that override it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use selic_yield::api::{
    handle_analysis, handle_business_day, handle_investment, handle_rate, handle_simulation,
    AnalysisRequest, BusinessDayQuery, InvestmentRequest, RateQuery, SimulationRequest,
};
use selic_yield::config::Settings;
use selic_yield::rates::MissingRatePolicy;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "selic_yield", version, about = "SELIC-indexed yield, tax and simulation calculator")]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Rate snapshot (feed JSON or CSV), overrides settings
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    /// Holiday JSON file, overrides settings
    #[arg(long, global = true)]
    holidays: Option<PathBuf>,

    /// strict or treat_as_holiday, overrides settings
    #[arg(long, global = true)]
    missing_rate_policy: Option<MissingRatePolicy>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Yield, taxes and fees of an investment
    Invest(InvestArgs),
    /// Day-by-day breakdown of an investment period
    Analyze(AnalyzeArgs),
    /// Long-horizon contribution simulation
    Simulate(SimulateArgs),
    /// Daily rate recorded for a date
    Rate {
        /// YYYY-MM-DD or DD/MM/YYYY
        date: String,
    },
    /// Classify a date
    BusinessDay {
        /// YYYY-MM-DD or DD/MM/YYYY
        date: String,
    },
}

#[derive(Debug, Args)]
struct InvestArgs {
    #[arg(long)]
    principal: f64,
    /// YYYY-MM-DD or DD/MM/YYYY
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
    /// Annual admin fee, percent
    #[arg(long)]
    admin_pct: Option<f64>,
    /// Annual custody fee, percent
    #[arg(long)]
    custody_pct: Option<f64>,
    /// Skip IR and IOF
    #[arg(long)]
    no_taxes: bool,
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    #[arg(long)]
    principal: f64,
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
    /// Print every day, not just the summary
    #[arg(long)]
    days: bool,
}

#[derive(Debug, Args)]
struct SimulateArgs {
    #[arg(long, default_value_t = 10_000.0)]
    initial: f64,
    #[arg(long, default_value_t = 1_000.0)]
    contribution: f64,
    #[arg(long, default_value_t = 20)]
    years: i32,
    /// Annual return as a fraction
    #[arg(long, default_value_t = 0.10)]
    annual_return: f64,
    /// Annual admin fee, percent
    #[arg(long, default_value_t = 0.5)]
    admin_pct: f64,
    /// Tax rate, percent
    #[arg(long, default_value_t = 15.0)]
    tax_pct: f64,
    /// Annual inflation as a fraction
    #[arg(long, default_value_t = 0.045)]
    inflation: f64,
    #[arg(long, default_value = "monthly")]
    frequency: String,
    /// Annual dividend yield as a fraction
    #[arg(long, default_value_t = 0.0)]
    dividend_yield: f64,
    /// Write the monthly history to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = Settings::load_or_default(cli.settings.as_deref()).context("Failed to load settings")?;
    if let Some(path) = &cli.rates {
        settings.rates_path = Some(path.clone());
    }
    if let Some(path) = &cli.holidays {
        settings.holidays_path = Some(path.clone());
    }
    if let Some(policy) = cli.missing_rate_policy {
        settings.missing_rate_policy = policy;
    }

    match &cli.command {
        Command::Invest(args) => run_invest(&settings, args, cli.json),
        Command::Analyze(args) => run_analyze(&settings, args, cli.json),
        Command::Simulate(args) => run_simulate(args, cli.json),
        Command::Rate { date } => run_rate(&settings, date, cli.json),
        Command::BusinessDay { date } => run_business_day(&settings, date, cli.json),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_invest(settings: &Settings, args: &InvestArgs, json: bool) -> Result<()> {
    let source = settings.rate_source().context("Failed to load rates")?;
    let taxes = settings.tax_engine().context("Failed to load tax tables")?;

    let defaults = settings.investment_config();
    let request = InvestmentRequest {
        principal: args.principal,
        start_date: args.start.clone(),
        end_date: args.end.clone(),
        admin_rate_pct: args.admin_pct.unwrap_or(defaults.admin_rate_pct),
        custody_rate_pct: args.custody_pct.unwrap_or(defaults.custody_rate_pct),
        apply_taxes: !args.no_taxes,
    };
    let response = handle_investment(&request, &taxes, &source)
        .with_context(|| format!("Investment from {} to {} failed", args.start, args.end))?;

    if json {
        return print_json(&response);
    }

    let r = &response.result;
    println!("Investment {} to {}", response.start_date_formatted, response.end_date_formatted);
    println!("{}", "-".repeat(48));
    println!("  {:<28} {:>16}", "Calendar days", r.total_days);
    println!("  {:<28} {:>16}", "Business days", r.business_days);
    println!("  {:<28} {:>16.10}", "Compound factor", r.compound_factor);
    println!("  {:<28} {:>16.2}", "Principal", r.principal);
    println!("  {:<28} {:>16.2}", "Gross value", r.gross_value);
    println!("  {:<28} {:>16.2}", "Gross profit", r.gross_profit);
    println!("  {:<28} {:>16.2}", format!("Income tax ({:.1}%)", r.income_tax_rate_pct), r.income_tax_amount);
    println!("  {:<28} {:>16.2}", "Transaction tax (IOF)", r.transaction_tax_amount);
    println!("  {:<28} {:>16.2}", format!("Admin fee ({:.2}%)", r.admin_rate_pct), r.admin_fee_amount);
    println!("  {:<28} {:>16.2}", format!("Custody fee ({:.2}%)", r.custody_rate_pct), r.custody_fee_amount);
    println!("  {:<28} {:>16.2}", "Net value", r.net_value);
    println!("  {:<28} {:>16.2}", "Net profit", r.net_profit);
    println!("  {:<28} {:>15.2}%", "Net return", r.net_return_pct);
    Ok(())
}

fn run_analyze(settings: &Settings, args: &AnalyzeArgs, json: bool) -> Result<()> {
    let source = settings.rate_source().context("Failed to load rates")?;
    let request = AnalysisRequest {
        principal: args.principal,
        start_date: args.start.clone(),
        end_date: args.end.clone(),
    };
    let analysis = handle_analysis(&request, &source, source.classifier())
        .with_context(|| format!("Analysis from {} to {} failed", args.start, args.end))?;

    if json {
        return print_json(&analysis);
    }

    if args.days {
        println!("{:>10} {:>10} {:>9} {:>12}", "Date", "Weekday", "Kind", "Rate");
        println!("{}", "-".repeat(44));
        for day in &analysis.days {
            println!(
                "{:>10} {:>10} {:>9} {:>12.8}",
                day.date,
                day.weekday,
                day.kind.as_str(),
                day.daily_rate_factor
            );
        }
        println!();
    }

    println!("Analysis {} to {}", analysis.start_date, analysis.end_date);
    println!("  Days: {} ({} business, {} weekend, {} holiday)",
        analysis.total_days, analysis.business_days, analysis.weekend_days, analysis.holiday_days);
    println!("  Compound factor: {:.10}", analysis.compound_factor);
    println!("  Final value: {:.2} (profit {:.2}, {:.2}%)",
        analysis.final_value, analysis.gross_profit, analysis.gross_return_pct);
    println!("  Avg return per calendar day: {:.6}%", analysis.avg_daily_return_pct);
    println!("  Avg return per business day: {:.6}%", analysis.avg_business_day_return_pct);
    Ok(())
}

fn run_simulate(args: &SimulateArgs, json: bool) -> Result<()> {
    let request = SimulationRequest {
        initial_investment: args.initial,
        contribution_amount: args.contribution,
        years: args.years,
        annual_return: args.annual_return,
        admin_rate_pct: args.admin_pct,
        tax_rate_pct: args.tax_pct,
        inflation_annual: args.inflation,
        contribution_frequency: args.frequency.clone(),
        dividend_yield: args.dividend_yield,
        include_monthly_detail: args.output.is_some(),
    };
    let result = handle_simulation(&request).context("Simulation failed")?;

    if let (Some(path), Some(records)) = (&args.output, &result.monthly_detail) {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        eprintln!("Monthly history written to: {}", path.display());
    }

    if json {
        return print_json(&result.summary);
    }

    let s = &result.summary;
    println!("Simulation over {} years ({})", args.years, args.frequency);
    println!("{}", "-".repeat(52));
    println!("  {:<32} {:>16.2}", "Total contributed", s.total_contributed);
    println!("  {:<32} {:>16.2}", "Final gross value", s.final_gross_value);
    println!("  {:<32} {:>16.2}", "Gross yield", s.total_gross_yield);
    println!("  {:<32} {:>16.2}", "Dividends", s.total_dividends);
    println!("  {:<32} {:>16.2}", "Admin fees", s.total_admin_fees);
    println!("  {:<32} {:>16.2}", "Taxes", s.total_taxes);
    println!("  {:<32} {:>16.2}", "Final net value", s.final_net_value);
    println!("  {:<32} {:>16.2}", "Net value in today's money", s.inflation_adjusted_net_value);
    println!("  {:<32} {:>15.2}%", "Annualized net return", s.annualized_net_return_pct);
    println!("  {:<32} {:>15.2}%", "Annualized real return", s.annualized_real_return_pct);
    Ok(())
}

fn run_rate(settings: &Settings, date: &str, json: bool) -> Result<()> {
    let source = settings.rate_source().context("Failed to load rates")?;
    let response = handle_rate(&RateQuery { date: date.to_string() }, &source)
        .with_context(|| format!("No rate for {}", date))?;

    if json {
        return print_json(&response);
    }
    if response.is_business_day {
        println!("{}: daily factor {:.8}", response.date, response.daily_rate_factor);
    } else {
        println!("{}: {} (no accrual)", response.date, response.kind.as_str());
    }
    Ok(())
}

fn run_business_day(settings: &Settings, date: &str, json: bool) -> Result<()> {
    let source = settings.rate_source().context("Failed to load rates")?;
    let response = handle_business_day(&BusinessDayQuery { date: date.to_string() }, &source)?;

    if json {
        return print_json(&response);
    }
    println!(
        "{} ({}): {}",
        response.date,
        response.weekday,
        if response.is_business_day { "business day".to_string() } else { response.kind.as_str().to_string() }
    );
    Ok(())
}
