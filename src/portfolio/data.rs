//! Portfolio snapshot structures threaded through a projection

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A recurring monthly expense attached to a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    /// Expense category (e.g. "insurance", "strata", "council_rates")
    pub category: String,

    /// Amount paid per month
    pub monthly_amount: f64,
}

impl ExpenseItem {
    pub fn new(category: impl Into<String>, monthly_amount: f64) -> Self {
        Self {
            category: category.into(),
            monthly_amount,
        }
    }
}

/// A single property held in the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyState {
    /// Unique property identifier
    pub id: String,

    /// Current market value
    pub value: f64,

    /// Rent received per month when tenanted
    pub monthly_rent: f64,

    /// Recurring expenses by category
    pub expenses: Vec<ExpenseItem>,
}

impl PropertyState {
    pub fn new(id: impl Into<String>, value: f64, monthly_rent: f64) -> Self {
        Self {
            id: id.into(),
            value,
            monthly_rent,
            expenses: Vec::new(),
        }
    }

    /// Builder-style helper for attaching an expense
    pub fn with_expense(mut self, category: impl Into<String>, monthly_amount: f64) -> Self {
        self.expenses.push(ExpenseItem::new(category, monthly_amount));
        self
    }

    /// Sum of all monthly expenses before any factor adjustment
    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|e| e.monthly_amount).sum()
    }
}

/// A loan secured against a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanState {
    /// Unique loan identifier
    pub id: String,

    /// Property this loan is secured against
    pub property_id: String,

    /// Outstanding principal
    pub current_balance: f64,

    /// Annual interest rate in percent (6.0 = 6%)
    pub interest_rate: f64,

    /// Scheduled repayment per month (interest + principal)
    pub repayment_amount: f64,
}

impl LoanState {
    pub fn new(
        id: impl Into<String>,
        property_id: impl Into<String>,
        current_balance: f64,
        interest_rate: f64,
        repayment_amount: f64,
    ) -> Self {
        Self {
            id: id.into(),
            property_id: property_id.into(),
            current_balance,
            interest_rate,
            repayment_amount,
        }
    }

    /// Interest charged for one month at the loan's own rate
    pub fn monthly_interest(&self) -> f64 {
        monthly_interest(self.current_balance, self.interest_rate)
    }
}

/// Interest for one month on `balance` at an annual percentage `rate`
pub fn monthly_interest(balance: f64, rate: f64) -> f64 {
    balance * rate / 100.0 / 12.0
}

/// What leaves the portfolio when a property is sold
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRemoval {
    pub property: PropertyState,
    pub loans: Vec<LoanState>,
}

impl SaleRemoval {
    /// Outstanding debt discharged by the sale
    pub fn loan_balance(&self) -> f64 {
        self.loans.iter().map(|l| l.current_balance).sum()
    }
}

/// Properties and loans at a point in the projection
///
/// Every loan references a property present in the same state. Transitions
/// (`without_property`, `with_property`) return a new state and leave the
/// original untouched, so scenario runs never alias each other's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub properties: Vec<PropertyState>,
    pub loans: Vec<LoanState>,
}

impl PortfolioState {
    /// Build a state, checking property ids are unique and every loan is secured
    /// against a known property
    pub fn new(properties: Vec<PropertyState>, loans: Vec<LoanState>) -> Result<Self> {
        let mut ids = HashSet::new();
        for property in &properties {
            if !ids.insert(property.id.as_str()) {
                return Err(Error::DuplicateProperty(property.id.clone()));
            }
        }

        if let Some(orphan) = loans.iter().find(|l| !ids.contains(l.property_id.as_str())) {
            return Err(Error::UnknownProperty {
                kind: "loan",
                id: orphan.id.clone(),
                property_id: orphan.property_id.clone(),
            });
        }

        Ok(Self { properties, loans })
    }

    pub fn property(&self, id: &str) -> Option<&PropertyState> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn loans_for<'a>(&'a self, property_id: &'a str) -> impl Iterator<Item = &'a LoanState> + 'a {
        self.loans.iter().filter(move |l| l.property_id == property_id)
    }

    pub fn total_value(&self) -> f64 {
        self.properties.iter().map(|p| p.value).sum()
    }

    pub fn total_debt(&self) -> f64 {
        self.loans.iter().map(|l| l.current_balance).sum()
    }

    /// Portfolio equity: market value less outstanding debt
    pub fn equity(&self) -> f64 {
        self.total_value() - self.total_debt()
    }

    /// State with `property_id` and its loans removed, or `None` if the property
    /// is not held
    pub fn without_property(&self, property_id: &str) -> Option<(PortfolioState, SaleRemoval)> {
        let position = self.properties.iter().position(|p| p.id == property_id)?;

        let mut properties = self.properties.clone();
        let property = properties.remove(position);

        let (loans, remaining): (Vec<_>, Vec<_>) = self
            .loans
            .iter()
            .cloned()
            .partition(|l| l.property_id == property_id);

        Some((
            PortfolioState {
                properties,
                loans: remaining,
            },
            SaleRemoval { property, loans },
        ))
    }

    /// State with a newly acquired property (and optional loan) appended
    pub fn with_property(&self, property: PropertyState, loan: Option<LoanState>) -> PortfolioState {
        let mut next = self.clone();
        next.properties.push(property);
        next.loans.extend(loan);
        next
    }
}
