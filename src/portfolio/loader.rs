//! Load a portfolio snapshot from CSV exports
//!
//! A snapshot directory holds `properties.csv`, `loans.csv` and, optionally,
//! `expenses.csv`.

use super::{ExpenseItem, LoanState, PortfolioState, PropertyState};
use crate::error::{Error, Result};
use csv::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default snapshot directory used by the CLI
pub const DEFAULT_PORTFOLIO_PATH: &str = "data/portfolio";

#[derive(Debug, serde::Deserialize)]
struct PropertyRow {
    #[serde(rename = "PropertyID")]
    property_id: String,
    #[serde(rename = "Value")]
    value: f64,
    #[serde(rename = "MonthlyRent")]
    monthly_rent: f64,
}

#[derive(Debug, serde::Deserialize)]
struct LoanRow {
    #[serde(rename = "LoanID")]
    loan_id: String,
    #[serde(rename = "PropertyID")]
    property_id: String,
    #[serde(rename = "Balance")]
    balance: f64,
    #[serde(rename = "InterestRate")]
    interest_rate: f64,
    #[serde(rename = "Repayment")]
    repayment: f64,
}

#[derive(Debug, serde::Deserialize)]
struct ExpenseRow {
    #[serde(rename = "PropertyID")]
    property_id: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "MonthlyAmount")]
    monthly_amount: f64,
}

fn read_rows<R: Read, T: serde::de::DeserializeOwned>(reader: R) -> Result<Vec<T>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        rows.push(result?);
    }

    Ok(rows)
}

/// Load a portfolio from any readers (e.g. string buffers in tests, API payloads)
pub fn load_portfolio_from_readers<P: Read, L: Read, E: Read>(
    properties: P,
    loans: L,
    expenses: Option<E>,
) -> Result<PortfolioState> {
    let mut property_states: Vec<PropertyState> = read_rows::<_, PropertyRow>(properties)?
        .into_iter()
        .map(|row| PropertyState::new(row.property_id, row.value, row.monthly_rent))
        .collect();

    if let Some(expenses) = expenses {
        for row in read_rows::<_, ExpenseRow>(expenses)? {
            let property = property_states
                .iter_mut()
                .find(|p| p.id == row.property_id)
                .ok_or_else(|| Error::UnknownProperty {
                    kind: "expense",
                    id: row.category.clone(),
                    property_id: row.property_id.clone(),
                })?;
            property
                .expenses
                .push(ExpenseItem::new(row.category, row.monthly_amount));
        }
    }

    let loan_states = read_rows::<_, LoanRow>(loans)?
        .into_iter()
        .map(|row| {
            LoanState::new(
                row.loan_id,
                row.property_id,
                row.balance,
                row.interest_rate,
                row.repayment,
            )
        })
        .collect();

    let state = PortfolioState::new(property_states, loan_states)?;
    log::debug!(
        "Loaded portfolio: {} properties, {} loans",
        state.properties.len(),
        state.loans.len()
    );
    Ok(state)
}

/// Load a portfolio snapshot from a directory of CSV files
pub fn load_portfolio<P: AsRef<Path>>(dir: P) -> Result<PortfolioState> {
    let dir = dir.as_ref();
    let properties = File::open(dir.join("properties.csv"))?;
    let loans = File::open(dir.join("loans.csv"))?;

    let expenses_path = dir.join("expenses.csv");
    let expenses = if expenses_path.exists() {
        Some(File::open(expenses_path)?)
    } else {
        None
    };

    load_portfolio_from_readers(properties, loans, expenses)
}
