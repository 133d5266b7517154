//! Portfolio Forecast CLI
//!
//! Projects a portfolio snapshot under one scenario and writes monthly results

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use portfolio_forecast::{
    factors::load_scenario,
    portfolio::{load_portfolio, loader::DEFAULT_PORTFOLIO_PATH},
    projection::{validate_horizon, ProjectionConfig, ProjectionEngine},
    Scenario,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "portfolio_forecast", version, about = "Project portfolio cash flow under a scenario")]
struct Args {
    /// Directory holding properties.csv, loans.csv and optionally expenses.csv
    #[arg(long, default_value = DEFAULT_PORTFOLIO_PATH)]
    portfolio: PathBuf,

    /// Scenario JSON file; without one the baseline is projected
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override the scenario's horizon in months
    #[arg(long)]
    months: Option<u32>,

    /// Annual property value growth, in percent
    #[arg(long, default_value_t = 0.0)]
    growth: f64,

    /// Calendar month of the first projected month (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Where to write the monthly CSV
    #[arg(long, default_value = "projection_output.csv")]
    output: PathBuf,

    /// Drop per-property figures from the results
    #[arg(long)]
    no_breakdown: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let portfolio = load_portfolio(&args.portfolio)
        .with_context(|| format!("loading portfolio from {}", args.portfolio.display()))?;

    let mut scenario = match &args.scenario {
        Some(path) => load_scenario(path).with_context(|| format!("loading scenario {}", path.display()))?,
        None => Scenario::baseline(ProjectionConfig::default().time_horizon_months),
    };
    if let Some(months) = args.months {
        scenario.time_horizon_months = months;
    }
    validate_horizon(scenario.time_horizon_months)?;

    let config = ProjectionConfig {
        time_horizon_months: scenario.time_horizon_months,
        include_breakdown: !args.no_breakdown,
        annual_growth_rate: args.growth,
        start_date: args.start_date,
    };

    println!("Scenario: {}", scenario.name);
    println!(
        "  Properties: {}, Loans: {}, Factors: {}",
        portfolio.properties.len(),
        portfolio.loans.len(),
        scenario.factors.len()
    );
    println!("  Starting equity: ${:.2}", portfolio.equity());
    println!();

    let engine = ProjectionEngine::new(config);
    let result = engine.project(&portfolio, &scenario.factors);

    println!("{:>5} {:>12} {:>12} {:>12} {:>14} {:>14}", "Month", "Income", "Expenses", "Net", "Capital", "Equity");
    println!("{}", "-".repeat(74));
    for m in result.monthly_results.iter().take(24) {
        println!(
            "{:>5} {:>12.2} {:>12.2} {:>12.2} {:>14.2} {:>14.2}",
            m.month_index, m.total_income, m.total_expenses, m.net_cash_flow, m.capital_cash_flow, m.equity
        );
    }
    if result.monthly_results.len() > 24 {
        println!("... ({} more months)", result.monthly_results.len() - 24);
    }

    let file = File::create(&args.output).with_context(|| format!("creating {}", args.output.display()))?;
    result.write_csv(BufWriter::new(file))?;
    println!("\nFull results written to: {}", args.output.display());

    let summary = &result.summary_metrics;
    println!("\nSummary:");
    println!("  Total Income: ${:.2}", summary.total_income);
    println!("  Total Expenses: ${:.2}", summary.total_expenses);
    println!("  Total Net: ${:.2}", summary.total_net);
    println!("  Average Monthly Net: ${:.2}", summary.average_monthly_net);
    println!("  Negative Months: {}", summary.months_with_negative_cash_flow);
    if let Some(lowest) = summary.lowest_month {
        println!("  Lowest Month: {} (${:.2})", lowest.month_index, lowest.net_cash_flow);
    }
    println!("  Capital Events: ${:.2}", summary.total_capital_cash_flow);
    println!("  Final Loan Balance: ${:.2}", summary.final_loan_balance);
    println!("  Final Equity: ${:.2}", summary.final_equity);

    Ok(())
}
