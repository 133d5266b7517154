//! Scenario runner for batch and side-by-side projections
//!
//! Holds one portfolio snapshot and projects it under many factor sets. Each
//! run clones the snapshot, so scenarios can run in parallel without sharing
//! state.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::factors::ScenarioFactorInput;
use crate::portfolio::PortfolioState;
use crate::projection::{
    ProjectionConfig, ProjectionEngine, ProjectionResult, SummaryMetrics, DEFAULT_HORIZON_MONTHS,
};

fn default_name() -> String {
    "scenario".to_string()
}

fn default_horizon() -> u32 {
    DEFAULT_HORIZON_MONTHS
}

/// A named set of factors projected over a horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_horizon")]
    pub time_horizon_months: u32,

    #[serde(default)]
    pub factors: Vec<ScenarioFactorInput>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, time_horizon_months: u32, factors: Vec<ScenarioFactorInput>) -> Self {
        Self {
            name: name.into(),
            time_horizon_months,
            factors,
        }
    }

    /// The same horizon with no factors
    pub fn baseline(time_horizon_months: u32) -> Self {
        Self::new("baseline", time_horizon_months, Vec::new())
    }
}

/// A scenario's outcome next to the no-factor baseline over the same horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub name: String,
    pub time_horizon_months: u32,
    pub summary: SummaryMetrics,
    pub baseline: SummaryMetrics,
    /// Change in total operating net cash flow
    pub net_delta: f64,
    /// Change in final equity
    pub equity_delta: f64,
    /// Change in the number of negative cash-flow months
    pub negative_months_delta: i64,
}

impl ScenarioComparison {
    fn new(scenario: &Scenario, summary: SummaryMetrics, baseline: SummaryMetrics) -> Self {
        Self {
            net_delta: summary.total_net - baseline.total_net,
            equity_delta: summary.final_equity - baseline.final_equity,
            negative_months_delta: summary.months_with_negative_cash_flow as i64
                - baseline.months_with_negative_cash_flow as i64,
            name: scenario.name.clone(),
            time_horizon_months: scenario.time_horizon_months,
            summary,
            baseline,
        }
    }
}

/// Projects one portfolio under many scenarios
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    portfolio: PortfolioState,
    /// Settings shared by every run; the horizon comes from each scenario
    config: ProjectionConfig,
}

impl ScenarioRunner {
    pub fn new(portfolio: PortfolioState) -> Self {
        Self::with_config(portfolio, ProjectionConfig::default())
    }

    pub fn with_config(portfolio: PortfolioState, config: ProjectionConfig) -> Self {
        Self { portfolio, config }
    }

    /// Run a single scenario
    pub fn run(&self, scenario: &Scenario) -> ProjectionResult {
        let config = ProjectionConfig {
            time_horizon_months: scenario.time_horizon_months,
            ..self.config.clone()
        };
        log::debug!("Running scenario '{}'", scenario.name);
        ProjectionEngine::new(config).project(&self.portfolio, &scenario.factors)
    }

    /// Run scenarios in parallel; results follow the input order
    pub fn run_scenarios(&self, scenarios: &[Scenario]) -> Vec<ProjectionResult> {
        scenarios.par_iter().map(|s| self.run(s)).collect()
    }

    /// Run each scenario alongside a no-factor baseline of the same horizon
    ///
    /// The baseline is projected once per distinct horizon.
    pub fn compare(&self, scenarios: &[Scenario]) -> Vec<ScenarioComparison> {
        let horizons: BTreeSet<u32> = scenarios.iter().map(|s| s.time_horizon_months).collect();
        let baselines: HashMap<u32, SummaryMetrics> = horizons
            .into_par_iter()
            .map(|months| (months, self.run(&Scenario::baseline(months)).summary_metrics))
            .collect();

        scenarios
            .par_iter()
            .filter_map(|s| {
                let baseline = baselines.get(&s.time_horizon_months)?.clone();
                Some(ScenarioComparison::new(s, self.run(s).summary_metrics, baseline))
            })
            .collect()
    }

    pub fn portfolio(&self) -> &PortfolioState {
        &self.portfolio
    }
}
