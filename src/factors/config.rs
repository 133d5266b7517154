//! Factor config shapes, parsing and structural validation
//!
//! Configs arrive as JSON strings keyed by a separate factor type tag. Parsing
//! is lenient: malformed JSON yields `None` so the caller can drop that factor
//! and keep projecting the rest of the portfolio.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The six kinds of scenario factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorType {
    InterestRate,
    Vacancy,
    RentChange,
    ExpenseChange,
    SellProperty,
    BuyProperty,
}

impl FactorType {
    pub const ALL: [FactorType; 6] = [
        FactorType::InterestRate,
        FactorType::Vacancy,
        FactorType::RentChange,
        FactorType::ExpenseChange,
        FactorType::SellProperty,
        FactorType::BuyProperty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FactorType::InterestRate => "interest_rate",
            FactorType::Vacancy => "vacancy",
            FactorType::RentChange => "rent_change",
            FactorType::ExpenseChange => "expense_change",
            FactorType::SellProperty => "sell_property",
            FactorType::BuyProperty => "buy_property",
        }
    }

    /// Sell and buy apply once at their configured month and change the
    /// portfolio permanently
    pub fn is_one_shot(&self) -> bool {
        matches!(self, FactorType::SellProperty | FactorType::BuyProperty)
    }
}

impl fmt::Display for FactorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactorType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FactorType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownFactorType(s.to_string()))
    }
}

/// Loans targeted by an interest-rate factor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplyTo {
    /// Every loan in the portfolio
    All,
    /// Only loans secured against this property
    Property(String),
}

impl ApplyTo {
    pub fn matches(&self, property_id: &str) -> bool {
        match self {
            ApplyTo::All => true,
            ApplyTo::Property(id) => id == property_id,
        }
    }
}

impl From<String> for ApplyTo {
    fn from(s: String) -> Self {
        if s == "all" {
            ApplyTo::All
        } else {
            ApplyTo::Property(s)
        }
    }
}

impl From<ApplyTo> for String {
    fn from(apply_to: ApplyTo) -> Self {
        match apply_to {
            ApplyTo::All => "all".to_string(),
            ApplyTo::Property(id) => id,
        }
    }
}

/// Additive percentage-point shift to loan interest rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestRateConfig {
    pub change_percent: f64,
    pub apply_to: ApplyTo,
}

/// Zero rent on one property for a number of consecutive months
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacancyConfig {
    pub property_id: String,
    pub months: u32,
}

/// Percentage change to rent, for one property or all of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentChangeConfig {
    pub change_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
}

/// Percentage change to expenses, for one category or all of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseChangeConfig {
    pub change_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellPropertyConfig {
    pub property_id: String,
    pub sale_price: f64,
    pub selling_costs: f64,
    pub settlement_month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyPropertyConfig {
    pub purchase_price: f64,
    pub deposit: f64,
    pub loan_amount: f64,
    /// Annual rate in percent
    pub interest_rate: f64,
    pub expected_rent: f64,
    pub expected_expenses: f64,
    pub purchase_month: u32,
}

/// A parsed factor config, one variant per factor type
#[derive(Debug, Clone, PartialEq)]
pub enum FactorConfig {
    InterestRate(InterestRateConfig),
    Vacancy(VacancyConfig),
    RentChange(RentChangeConfig),
    ExpenseChange(ExpenseChangeConfig),
    SellProperty(SellPropertyConfig),
    BuyProperty(BuyPropertyConfig),
}

impl FactorConfig {
    pub fn factor_type(&self) -> FactorType {
        match self {
            FactorConfig::InterestRate(_) => FactorType::InterestRate,
            FactorConfig::Vacancy(_) => FactorType::Vacancy,
            FactorConfig::RentChange(_) => FactorType::RentChange,
            FactorConfig::ExpenseChange(_) => FactorType::ExpenseChange,
            FactorConfig::SellProperty(_) => FactorType::SellProperty,
            FactorConfig::BuyProperty(_) => FactorType::BuyProperty,
        }
    }

    /// Serialize the payload back to its persisted JSON form
    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            FactorConfig::InterestRate(c) => serde_json::to_string(c),
            FactorConfig::Vacancy(c) => serde_json::to_string(c),
            FactorConfig::RentChange(c) => serde_json::to_string(c),
            FactorConfig::ExpenseChange(c) => serde_json::to_string(c),
            FactorConfig::SellProperty(c) => serde_json::to_string(c),
            FactorConfig::BuyProperty(c) => serde_json::to_string(c),
        }
    }
}

/// Parse a persisted config for `factor_type`
///
/// Returns `None` when the JSON is malformed or does not match the shape of
/// the factor type.
pub fn parse_factor_config(factor_type: FactorType, json: &str) -> Option<FactorConfig> {
    let parsed = match factor_type {
        FactorType::InterestRate => serde_json::from_str(json).map(FactorConfig::InterestRate),
        FactorType::Vacancy => serde_json::from_str(json).map(FactorConfig::Vacancy),
        FactorType::RentChange => serde_json::from_str(json).map(FactorConfig::RentChange),
        FactorType::ExpenseChange => serde_json::from_str(json).map(FactorConfig::ExpenseChange),
        FactorType::SellProperty => serde_json::from_str(json).map(FactorConfig::SellProperty),
        FactorType::BuyProperty => serde_json::from_str(json).map(FactorConfig::BuyProperty),
    };

    match parsed {
        Ok(config) => Some(config),
        Err(e) => {
            log::debug!("Unparseable {} config: {}", factor_type, e);
            None
        }
    }
}

fn is_number(config: &Value, key: &str) -> bool {
    config.get(key).is_some_and(Value::is_number)
}

fn is_string(config: &Value, key: &str) -> bool {
    config.get(key).is_some_and(Value::is_string)
}

fn is_optional_string(config: &Value, key: &str) -> bool {
    match config.get(key) {
        None | Some(Value::Null) => true,
        Some(v) => v.is_string(),
    }
}

/// Month indices are non-negative integers
fn is_month(config: &Value, key: &str) -> bool {
    config
        .get(key)
        .and_then(Value::as_u64)
        .is_some_and(|m| m <= u32::MAX as u64)
}

/// Structural check used when a factor is authored
///
/// Checks field presence and primitive types only. Cross-field rules (such as
/// a settlement month after the factor's start) are not checked.
pub fn is_valid_factor_config(factor_type: FactorType, config: &Value) -> bool {
    if !config.is_object() {
        return false;
    }

    match factor_type {
        FactorType::InterestRate => {
            is_number(config, "changePercent") && is_string(config, "applyTo")
        }
        FactorType::Vacancy => {
            is_string(config, "propertyId")
                && is_month(config, "months")
                && config.get("months").and_then(Value::as_u64).is_some_and(|m| m > 0)
        }
        FactorType::RentChange => {
            is_number(config, "changePercent") && is_optional_string(config, "propertyId")
        }
        FactorType::ExpenseChange => {
            is_number(config, "changePercent") && is_optional_string(config, "category")
        }
        FactorType::SellProperty => {
            is_string(config, "propertyId")
                && is_number(config, "salePrice")
                && is_number(config, "sellingCosts")
                && is_month(config, "settlementMonth")
        }
        FactorType::BuyProperty => {
            ["purchasePrice", "deposit", "loanAmount", "interestRate", "expectedRent", "expectedExpenses"]
                .iter()
                .all(|key| is_number(config, key))
                && is_month(config, "purchaseMonth")
        }
    }
}
