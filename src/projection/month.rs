//! Single-month projector
//!
//! Factors are applied in a fixed order so later steps see the output of
//! earlier ones:
//! 1. structural factors (sell, buy)
//! 2. interest-rate shifts, stacking in factor-list order
//! 3. vacancy
//! 4. rent and expense changes
//! 5. aggregation and loan amortization

use chrono::Months;

use super::engine::ProjectionConfig;
use super::results::{MonthProjection, PropertyBreakdown};
use super::structural::apply_structural_factor;
use crate::factors::{
    ExpenseChangeConfig, FactorConfig, InterestRateConfig, RentChangeConfig, ScenarioFactor,
    VacancyConfig,
};
use crate::portfolio::{monthly_interest, LoanState, PortfolioState, PropertyState};

/// A loan's interest for the month, before and after rate factors
#[derive(Debug, Clone, PartialEq)]
pub struct LoanAdjustment {
    pub loan_id: String,
    pub property_id: String,
    pub balance: f64,
    pub original_rate: f64,
    pub adjusted_rate: f64,
    pub original_interest: f64,
    pub adjusted_interest: f64,
}

impl LoanAdjustment {
    pub fn from_loan(loan: &LoanState) -> Self {
        let interest = loan.monthly_interest();
        Self {
            loan_id: loan.id.clone(),
            property_id: loan.property_id.clone(),
            balance: loan.current_balance,
            original_rate: loan.interest_rate,
            adjusted_rate: loan.interest_rate,
            original_interest: interest,
            adjusted_interest: interest,
        }
    }
}

/// Shift the rate of a matching loan by `change_percent` points
///
/// The shift is applied to the already-adjusted rate, so several active
/// factors stack. Rates are not floored at zero.
pub fn apply_interest_rate_factor(loan: &LoanAdjustment, config: &InterestRateConfig) -> LoanAdjustment {
    if !config.apply_to.matches(&loan.property_id) {
        return loan.clone();
    }

    let adjusted_rate = loan.adjusted_rate + config.change_percent;
    LoanAdjustment {
        adjusted_rate,
        adjusted_interest: monthly_interest(loan.balance, adjusted_rate),
        ..loan.clone()
    }
}

/// A property's rent for the month after a vacancy factor
#[derive(Debug, Clone, PartialEq)]
pub struct VacancyAdjustment {
    pub property_id: String,
    pub original_rent: f64,
    pub adjusted_rent: f64,
    pub is_vacant: bool,
}

/// Vacant iff the property matches and `current_month` is in
/// `[start_month, start_month + months)`
pub fn apply_vacancy_factor(
    property: &PropertyState,
    config: &VacancyConfig,
    start_month: u32,
    current_month: u32,
) -> VacancyAdjustment {
    let month = current_month as u64;
    let start = start_month as u64;
    let is_vacant = config.property_id == property.id
        && month >= start
        && month < start + config.months as u64;

    VacancyAdjustment {
        property_id: property.id.clone(),
        original_rent: property.monthly_rent,
        adjusted_rent: if is_vacant { 0.0 } else { property.monthly_rent },
        is_vacant,
    }
}

/// Apply a rent change to `rent` if it targets `property_id` (or all properties)
pub fn apply_rent_change(rent: f64, property_id: &str, config: &RentChangeConfig) -> f64 {
    match &config.property_id {
        Some(target) if target != property_id => rent,
        _ => rent * (1.0 + config.change_percent / 100.0),
    }
}

/// Apply an expense change to `amount` if it targets `category` (or all categories)
pub fn apply_expense_change(amount: f64, category: &str, config: &ExpenseChangeConfig) -> f64 {
    match &config.category {
        Some(target) if target != category => amount,
        _ => amount * (1.0 + config.change_percent / 100.0),
    }
}

/// Output of one month: the state carried into the next month and the
/// month's figures
#[derive(Debug, Clone, PartialEq)]
pub struct MonthStep {
    pub next_state: PortfolioState,
    pub projection: MonthProjection,
}

/// Project one month given the state at its start and the factors active in it
pub fn project_month(
    state: &PortfolioState,
    factors: &[&ScenarioFactor],
    month_index: u32,
    config: &ProjectionConfig,
) -> MonthStep {
    // 1. Structural changes take effect from this month on
    let mut current = state.clone();
    let mut capital_cash_flow = 0.0;
    for factor in factors.iter().filter(|f| f.is_one_shot()) {
        let change = apply_structural_factor(&current, factor);
        current = change.state;
        capital_cash_flow += change.capital_cash_flow;
    }

    // 2. Interest. The principal component is the scheduled one, at the
    // loan's contractual rate; rate factors only move the interest.
    let rate_configs: Vec<&InterestRateConfig> = factors
        .iter()
        .filter_map(|f| match &f.config {
            FactorConfig::InterestRate(c) => Some(c),
            _ => None,
        })
        .collect();

    let loan_adjustments: Vec<LoanAdjustment> = current
        .loans
        .iter()
        .map(|loan| {
            rate_configs
                .iter()
                .fold(LoanAdjustment::from_loan(loan), |adj, c| apply_interest_rate_factor(&adj, c))
        })
        .collect();

    let principal_repaid: Vec<f64> = current
        .loans
        .iter()
        .zip(&loan_adjustments)
        .map(|(loan, adj)| {
            (loan.repayment_amount - adj.original_interest)
                .max(0.0)
                .min(loan.current_balance.max(0.0))
        })
        .collect();

    let rent_configs: Vec<&RentChangeConfig> = factors
        .iter()
        .filter_map(|f| match &f.config {
            FactorConfig::RentChange(c) => Some(c),
            _ => None,
        })
        .collect();

    let expense_configs: Vec<&ExpenseChangeConfig> = factors
        .iter()
        .filter_map(|f| match &f.config {
            FactorConfig::ExpenseChange(c) => Some(c),
            _ => None,
        })
        .collect();

    let mut breakdown = Vec::with_capacity(current.properties.len());
    for property in &current.properties {
        // 3. Vacancy
        let mut rent = property.monthly_rent;
        let mut is_vacant = false;
        for factor in factors {
            if let FactorConfig::Vacancy(c) = &factor.config {
                let vacancy = apply_vacancy_factor(property, c, factor.start_month, month_index);
                if vacancy.is_vacant {
                    rent = vacancy.adjusted_rent;
                    is_vacant = true;
                }
            }
        }

        // 4. Rent and expense changes
        let rent = rent_configs
            .iter()
            .fold(rent, |r, c| apply_rent_change(r, &property.id, c));

        let expenses: f64 = property
            .expenses
            .iter()
            .map(|e| {
                expense_configs
                    .iter()
                    .fold(e.monthly_amount, |a, c| apply_expense_change(a, &e.category, c))
            })
            .sum();

        let (interest, principal) = loan_adjustments
            .iter()
            .zip(&principal_repaid)
            .filter(|(adj, _)| adj.property_id == property.id)
            .fold((0.0_f64, 0.0_f64), |(i, p), (adj, repaid)| {
                (i + adj.adjusted_interest, p + *repaid)
            });

        breakdown.push(PropertyBreakdown {
            property_id: property.id.clone(),
            rent,
            expenses,
            interest,
            principal,
            is_vacant,
            net_cash_flow: rent - expenses - interest - principal,
        });
    }

    let total_income: f64 = breakdown.iter().map(|b| b.rent).sum();
    let operating_expenses: f64 = breakdown.iter().map(|b| b.expenses).sum();
    let total_interest: f64 = breakdown.iter().map(|b| b.interest).sum();
    let total_principal: f64 = breakdown.iter().map(|b| b.principal).sum();
    let total_expenses = operating_expenses + total_interest + total_principal;

    let growth = monthly_growth_factor(config.annual_growth_rate);
    let next_properties: Vec<PropertyState> = current
        .properties
        .iter()
        .map(|p| PropertyState {
            value: p.value * growth,
            ..p.clone()
        })
        .collect();

    let next_loans: Vec<LoanState> = current
        .loans
        .iter()
        .zip(&principal_repaid)
        .map(|(loan, repaid)| LoanState {
            current_balance: loan.current_balance - repaid,
            ..loan.clone()
        })
        .collect();

    let next_state = PortfolioState {
        properties: next_properties,
        loans: next_loans,
    };

    let property_value = next_state.total_value();
    let loan_balance = next_state.total_debt();

    let projection = MonthProjection {
        month_index,
        month_start: config
            .start_date
            .and_then(|d| d.checked_add_months(Months::new(month_index))),
        total_income,
        total_expenses,
        total_interest,
        total_principal,
        net_cash_flow: total_income - total_expenses,
        capital_cash_flow,
        property_value,
        loan_balance,
        equity: property_value - loan_balance,
        per_property_breakdown: config.include_breakdown.then_some(breakdown),
    };

    MonthStep {
        next_state,
        projection,
    }
}

/// Monthly compounding factor for an annual growth rate in percent
fn monthly_growth_factor(annual_rate: f64) -> f64 {
    if annual_rate == 0.0 {
        1.0
    } else {
        (1.0 + annual_rate / 100.0).powf(1.0 / 12.0)
    }
}
