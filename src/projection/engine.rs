//! Projection runner: drives the month projector across a time horizon

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::month::project_month;
use super::results::ProjectionResult;
use crate::error::{Error, Result};
use crate::factors::{resolve_factors, ScenarioFactor, ScenarioFactorInput};
use crate::portfolio::PortfolioState;

/// Default horizon: 10 years
pub const DEFAULT_HORIZON_MONTHS: u32 = 120;

/// Longest horizon accepted from callers (50 years)
pub const MAX_HORIZON_MONTHS: u32 = 600;

/// Caller-side bound on the number of months to project
pub fn validate_horizon(months: u32) -> Result<u32> {
    if months == 0 || months > MAX_HORIZON_MONTHS {
        return Err(Error::HorizonOutOfRange {
            months,
            max: MAX_HORIZON_MONTHS,
        });
    }
    Ok(months)
}

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectionConfig {
    /// Number of months to project
    pub time_horizon_months: u32,

    /// Whether to keep per-property figures for each month
    pub include_breakdown: bool,

    /// Annual capital growth applied to property values, in percent
    pub annual_growth_rate: f64,

    /// Calendar month of month index 0
    pub start_date: Option<NaiveDate>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            time_horizon_months: DEFAULT_HORIZON_MONTHS,
            include_breakdown: true,
            annual_growth_rate: 0.0,
            start_date: None,
        }
    }
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project a portfolio under persisted factor inputs
    ///
    /// Factors whose config cannot be parsed are skipped; the run carries on
    /// as if they were absent.
    pub fn project(&self, initial: &PortfolioState, factors: &[ScenarioFactorInput]) -> ProjectionResult {
        let resolved = resolve_factors(factors);
        self.project_resolved(initial, &resolved)
    }

    /// Project a portfolio under already-parsed factors
    pub fn project_resolved(&self, initial: &PortfolioState, factors: &[ScenarioFactor]) -> ProjectionResult {
        let horizon = self.config.time_horizon_months;
        let mut months = Vec::with_capacity(horizon as usize);
        let mut state = initial.clone();

        for month_index in 0..horizon {
            let active: Vec<&ScenarioFactor> = factors.iter().filter(|f| f.is_active(month_index)).collect();

            let step = project_month(&state, &active, month_index, &self.config);
            state = step.next_state;
            months.push(step.projection);
        }

        let result = ProjectionResult::from_months(months);
        log::info!(
            "Projected {} months with {} factors: total net {:.2}, {} negative months",
            horizon,
            factors.len(),
            result.summary_metrics.total_net,
            result.summary_metrics.months_with_negative_cash_flow
        );
        result
    }
}

/// Project `initial` for `time_horizon_months` months under `factors` with
/// default settings otherwise
pub fn run_projection(
    initial: &PortfolioState,
    factors: &[ScenarioFactorInput],
    time_horizon_months: u32,
) -> ProjectionResult {
    let config = ProjectionConfig {
        time_horizon_months,
        ..Default::default()
    };
    ProjectionEngine::new(config).project(initial, factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::{
        ApplyTo, BuyPropertyConfig, FactorConfig, FactorType, InterestRateConfig,
        SellPropertyConfig, VacancyConfig,
    };
    use crate::portfolio::{LoanState, PropertyState};
    use approx::assert_relative_eq;

    fn single_property() -> PortfolioState {
        PortfolioState::new(
            vec![PropertyState::new("prop-1", 650_000.0, 2_000.0)],
            vec![LoanState::new("loan-1", "prop-1", 400_000.0, 6.0, 2_400.0)],
        )
        .unwrap()
    }

    fn two_properties() -> PortfolioState {
        PortfolioState::new(
            vec![
                PropertyState::new("prop-1", 650_000.0, 2_000.0).with_expense("insurance", 150.0),
                PropertyState::new("prop-2", 480_000.0, 1_750.0).with_expense("strata", 300.0),
            ],
            vec![
                LoanState::new("loan-1", "prop-1", 400_000.0, 6.0, 2_400.0),
                LoanState::new("loan-2", "prop-2", 320_000.0, 5.5, 1_900.0),
            ],
        )
        .unwrap()
    }

    fn input(config: FactorConfig, start_month: u32) -> ScenarioFactorInput {
        ScenarioFactorInput::from_config(&config, start_month).unwrap()
    }

    fn mixed_factors() -> Vec<ScenarioFactorInput> {
        vec![
            input(
                FactorConfig::InterestRate(InterestRateConfig {
                    change_percent: 1.5,
                    apply_to: ApplyTo::All,
                }),
                6,
            )
            .with_duration(24),
            input(
                FactorConfig::Vacancy(VacancyConfig {
                    property_id: "prop-2".into(),
                    months: 3,
                }),
                10,
            ),
            input(
                FactorConfig::SellProperty(SellPropertyConfig {
                    property_id: "prop-1".into(),
                    sale_price: 720_000.0,
                    selling_costs: 18_000.0,
                    settlement_month: 30,
                }),
                0,
            ),
            input(
                FactorConfig::BuyProperty(BuyPropertyConfig {
                    purchase_price: 550_000.0,
                    deposit: 110_000.0,
                    loan_amount: 440_000.0,
                    interest_rate: 6.1,
                    expected_rent: 2_200.0,
                    expected_expenses: 350.0,
                    purchase_month: 36,
                }),
                0,
            ),
        ]
    }

    #[test]
    fn test_single_property_no_factors() {
        let result = run_projection(&single_property(), &[], 12);

        assert_eq!(result.monthly_results.len(), 12);
        assert_eq!(result.monthly_results[0].total_income, 2_000.0);
        assert!(result.monthly_results.iter().all(|m| m.total_income == 2_000.0));
        // Interest + principal always equals the 2400 repayment
        for m in &result.monthly_results {
            assert_relative_eq!(m.total_expenses, 2_400.0, epsilon = 1e-9);
        }

        let negative = result
            .monthly_results
            .iter()
            .filter(|m| m.net_cash_flow < 0.0)
            .count() as u32;
        assert_eq!(result.summary_metrics.months_with_negative_cash_flow, negative);
        assert_eq!(negative, 12);

        let indices: Vec<u32> = result.monthly_results.iter().map(|m| m.month_index).collect();
        assert_eq!(indices, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_loan_amortizes() {
        let result = run_projection(&single_property(), &[], 12);
        let first = &result.monthly_results[0];
        let second = &result.monthly_results[1];

        assert_relative_eq!(first.total_interest, 2_000.0);
        assert_relative_eq!(first.total_principal, 400.0);
        // Balance falls, so interest falls and principal grows
        assert!(second.total_interest < first.total_interest);
        assert!(second.total_principal > first.total_principal);
        assert!(result.summary_metrics.final_loan_balance < 400_000.0 - 4_800.0);
    }

    #[test]
    fn test_determinism() {
        let state = two_properties();
        let factors = mixed_factors();

        let first = run_projection(&state, &factors, 60);
        let second = run_projection(&state, &factors, 60);
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_consistency() {
        let result = run_projection(&two_properties(), &mixed_factors(), 60);

        let total_net: f64 = result.monthly_results.iter().map(|m| m.net_cash_flow).sum();
        assert_eq!(result.summary_metrics.total_net, total_net);

        let negative = result
            .monthly_results
            .iter()
            .filter(|m| m.net_cash_flow < 0.0)
            .count() as u32;
        assert_eq!(result.summary_metrics.months_with_negative_cash_flow, negative);

        let lowest = result.summary_metrics.lowest_month.unwrap();
        assert!(result
            .monthly_results
            .iter()
            .all(|m| m.net_cash_flow >= lowest.net_cash_flow));
        assert_relative_eq!(
            result.summary_metrics.average_monthly_net,
            total_net / 60.0
        );
    }

    #[test]
    fn test_malformed_factor_is_skipped() {
        let state = single_property();
        let baseline = run_projection(&state, &[], 24);

        let factors = vec![ScenarioFactorInput::new(FactorType::InterestRate, "{\"changePercent\":", 0)];
        let result = run_projection(&state, &factors, 24);
        assert_eq!(result, baseline);
    }

    #[test]
    fn test_rate_shock_window() {
        let state = single_property();
        let factors = vec![input(
            FactorConfig::InterestRate(InterestRateConfig {
                change_percent: 2.0,
                apply_to: ApplyTo::All,
            }),
            3,
        )
        .with_duration(2)];
        let baseline = run_projection(&state, &[], 8);
        let result = run_projection(&state, &factors, 8);

        for month in [0, 1, 2] {
            assert_eq!(result.monthly_results[month], baseline.monthly_results[month]);
        }
        // 8% on ~399k exceeds the repayment
        assert!(result.monthly_results[3].total_interest > 2_600.0);
        assert!(result.monthly_results[4].total_interest > 2_600.0);
        assert!(result.monthly_results[5].total_interest < 2_000.0);
    }

    #[test]
    fn test_vacancy_months() {
        let state = two_properties();
        let factors = vec![input(
            FactorConfig::Vacancy(VacancyConfig {
                property_id: "prop-2".into(),
                months: 3,
            }),
            5,
        )];
        let result = run_projection(&state, &factors, 12);

        for m in &result.monthly_results {
            let vacant = m.per_property_breakdown.as_ref().unwrap()[1].is_vacant;
            assert_eq!(vacant, (5..8).contains(&m.month_index), "month {}", m.month_index);
        }
        assert_relative_eq!(result.monthly_results[6].total_income, 2_000.0);
        assert_relative_eq!(result.monthly_results[8].total_income, 3_750.0);
    }

    #[test]
    fn test_sale_and_purchase() {
        let result = run_projection(&two_properties(), &mixed_factors(), 48);
        let months = &result.monthly_results;

        // Sold at month 30: prop-1 rent disappears from then on
        assert!(months[29].per_property_breakdown.as_ref().unwrap().iter().any(|b| b.property_id == "prop-1"));
        assert!(months[30].per_property_breakdown.as_ref().unwrap().iter().all(|b| b.property_id != "prop-1"));
        assert_relative_eq!(months[31].total_income, 1_750.0);

        // Net proceeds: sale price less costs less the remaining balance
        let proceeds = months[30].capital_cash_flow;
        assert!(proceeds > 720_000.0 - 18_000.0 - 400_000.0);
        assert!(proceeds < 720_000.0 - 18_000.0 - 380_000.0);

        // Bought at month 36 (factor position 3)
        assert_relative_eq!(months[36].capital_cash_flow, -110_000.0);
        assert_relative_eq!(months[36].total_income, 1_750.0 + 2_200.0);
        assert!(months[36]
            .per_property_breakdown
            .as_ref()
            .unwrap()
            .iter()
            .any(|b| b.property_id == "purchase-3"));

        let capital: f64 = months.iter().map(|m| m.capital_cash_flow).sum();
        assert_relative_eq!(result.summary_metrics.total_capital_cash_flow, capital);
    }

    #[test]
    fn test_purchase_alongside_held_property_of_same_name() {
        let state = PortfolioState::new(vec![PropertyState::new("purchase-0", 400_000.0, 1_000.0)], Vec::new()).unwrap();
        let factors = vec![input(
            FactorConfig::BuyProperty(BuyPropertyConfig {
                purchase_price: 600_000.0,
                deposit: 120_000.0,
                loan_amount: 480_000.0,
                interest_rate: 6.0,
                expected_rent: 2_300.0,
                expected_expenses: 0.0,
                purchase_month: 1,
            }),
            0,
        )];

        let result = run_projection(&state, &factors, 3);
        let months = &result.monthly_results;
        assert_relative_eq!(months[1].capital_cash_flow, -120_000.0);
        assert_relative_eq!(months[2].total_income, 3_300.0);
        assert_eq!(months[2].per_property_breakdown.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_zero_horizon() {
        let result = run_projection(&single_property(), &[], 0);
        assert!(result.monthly_results.is_empty());
        assert!(result.summary_metrics.lowest_month.is_none());
    }

    #[test]
    fn test_input_state_not_mutated() {
        let state = two_properties();
        let before = state.clone();
        let _ = run_projection(&state, &mixed_factors(), 48);
        assert_eq!(state, before);
    }

    #[test]
    fn test_validate_horizon() {
        assert_eq!(validate_horizon(360).unwrap(), 360);
        assert!(matches!(validate_horizon(0), Err(Error::HorizonOutOfRange { .. })));
        assert!(validate_horizon(MAX_HORIZON_MONTHS + 1).is_err());
    }
}
