//! Run several scenario files against one portfolio and compare them
//!
//! Usage: cargo run --bin compare_scenarios -- --portfolio data/portfolio scenarios/*.json

use anyhow::{Context, Result};
use clap::Parser;
use portfolio_forecast::{
    factors::load_scenario,
    portfolio::{load_portfolio, loader::DEFAULT_PORTFOLIO_PATH},
    projection::{validate_horizon, ProjectionConfig},
    ScenarioRunner,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "compare_scenarios", about = "Compare scenarios against the baseline")]
struct Args {
    /// Directory holding the portfolio snapshot CSVs
    #[arg(long, default_value = DEFAULT_PORTFOLIO_PATH)]
    portfolio: PathBuf,

    /// Annual property value growth, in percent
    #[arg(long, default_value_t = 0.0)]
    growth: f64,

    /// Print the comparison as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Scenario JSON files
    #[arg(required = true)]
    scenarios: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let portfolio = load_portfolio(&args.portfolio)
        .with_context(|| format!("loading portfolio from {}", args.portfolio.display()))?;

    let scenarios = args
        .scenarios
        .iter()
        .map(|path| {
            let scenario = load_scenario(path).with_context(|| format!("loading scenario {}", path.display()))?;
            validate_horizon(scenario.time_horizon_months)?;
            Ok(scenario)
        })
        .collect::<Result<Vec<_>>>()?;

    let config = ProjectionConfig {
        annual_growth_rate: args.growth,
        include_breakdown: false,
        ..Default::default()
    };
    let runner = ScenarioRunner::with_config(portfolio, config);

    let start = Instant::now();
    let comparisons = runner.compare(&scenarios);
    log::info!("Ran {} scenarios in {:?}", scenarios.len(), start.elapsed());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comparisons)?);
        return Ok(());
    }

    println!(
        "{:<24} {:>6} {:>14} {:>14} {:>8} {:>14} {:>14}",
        "Scenario", "Months", "Total Net", "vs Baseline", "Neg Mo", "Final Equity", "vs Baseline"
    );
    println!("{}", "-".repeat(100));
    for c in &comparisons {
        println!(
            "{:<24} {:>6} {:>14.2} {:>+14.2} {:>8} {:>14.2} {:>+14.2}",
            c.name,
            c.time_horizon_months,
            c.summary.total_net,
            c.net_delta,
            c.summary.months_with_negative_cash_flow,
            c.summary.final_equity,
            c.equity_delta,
        );
    }

    Ok(())
}
