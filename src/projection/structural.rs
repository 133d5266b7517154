//! One-shot factors that change which properties and loans are held

use crate::factors::{BuyPropertyConfig, FactorConfig, ScenarioFactor, SellPropertyConfig};
use crate::portfolio::{monthly_interest, LoanState, PortfolioState, PropertyState};

/// Expense category given to a purchased property's running costs
pub const PURCHASE_EXPENSE_CATEGORY: &str = "operating";

/// Result of applying a structural factor
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralChange {
    pub state: PortfolioState,
    /// One-off cash event: net sale proceeds (+) or purchase deposit (-)
    pub capital_cash_flow: f64,
}

impl StructuralChange {
    fn unchanged(state: &PortfolioState) -> Self {
        Self {
            state: state.clone(),
            capital_cash_flow: 0.0,
        }
    }
}

/// Id given to the property acquired by the factor at `position`
pub fn purchased_property_id(position: usize) -> String {
    format!("purchase-{}", position)
}

/// Apply a sell or buy factor; window-scoped factors leave the state unchanged
pub fn apply_structural_factor(state: &PortfolioState, factor: &ScenarioFactor) -> StructuralChange {
    match &factor.config {
        FactorConfig::SellProperty(config) => sell_property(state, config),
        FactorConfig::BuyProperty(config) => buy_property(state, config, factor.position),
        _ => StructuralChange::unchanged(state),
    }
}

fn sell_property(state: &PortfolioState, config: &SellPropertyConfig) -> StructuralChange {
    match state.without_property(&config.property_id) {
        Some((next, removal)) => {
            let proceeds = config.sale_price - config.selling_costs - removal.loan_balance();
            log::debug!(
                "Sold {} in month {}: net proceeds {:.2}",
                config.property_id,
                config.settlement_month,
                proceeds
            );
            StructuralChange {
                state: next,
                capital_cash_flow: proceeds,
            }
        }
        None => {
            // Already sold or never held
            log::debug!(
                "Sale of {} in month {} ignored: property not held",
                config.property_id,
                config.settlement_month
            );
            StructuralChange::unchanged(state)
        }
    }
}

/// `purchase-<position>`, suffixed with `-1`, `-2`, ... while the snapshot
/// already holds a property of that name
fn unused_purchase_id(state: &PortfolioState, position: usize) -> String {
    let base = purchased_property_id(position);
    if state.property(&base).is_none() {
        return base;
    }

    let mut suffix = 1;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if state.property(&candidate).is_none() {
            log::warn!("Property id {} is already held; recording purchase as {}", base, candidate);
            return candidate;
        }
        suffix += 1;
    }
}

fn buy_property(state: &PortfolioState, config: &BuyPropertyConfig, position: usize) -> StructuralChange {
    let id = unused_purchase_id(state, position);

    let property = PropertyState::new(id.clone(), config.purchase_price, config.expected_rent)
        .with_expense(PURCHASE_EXPENSE_CATEGORY, config.expected_expenses);

    // Interest-only until the caller models a repayment schedule
    let loan = (config.loan_amount > 0.0).then(|| {
        LoanState::new(
            format!("{}-loan", id),
            id.clone(),
            config.loan_amount,
            config.interest_rate,
            monthly_interest(config.loan_amount, config.interest_rate),
        )
    });

    log::debug!(
        "Bought {} in month {} for {:.2}",
        id,
        config.purchase_month,
        config.purchase_price
    );

    StructuralChange {
        state: state.with_property(property, loan),
        capital_cash_flow: -config.deposit,
    }
}
