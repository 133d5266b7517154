//! Output structures for a projection run

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::Result;

/// One property's contribution to a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyBreakdown {
    pub property_id: String,
    pub rent: f64,
    pub expenses: f64,
    pub interest: f64,
    pub principal: f64,
    pub is_vacant: bool,
    pub net_cash_flow: f64,
}

/// Outputs of one simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthProjection {
    /// 0-indexed month from projection start
    pub month_index: u32,

    /// Calendar month, when the projection has a start date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_start: Option<NaiveDate>,

    // Operating cash flow
    pub total_income: f64,
    /// Operating expenses + loan interest + principal repaid
    pub total_expenses: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    pub net_cash_flow: f64,

    /// One-off sale proceeds less purchase deposits settled this month
    pub capital_cash_flow: f64,

    // Month-end position
    pub property_value: f64,
    pub loan_balance: f64,
    pub equity: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_property_breakdown: Option<Vec<PropertyBreakdown>>,
}

/// Month with the lowest net cash flow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowestMonth {
    pub month_index: u32,
    pub net_cash_flow: f64,
}

/// Summary statistics derived from the monthly results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_net: f64,
    pub average_monthly_net: f64,
    pub months_with_negative_cash_flow: u32,
    /// `None` for a zero-month horizon
    pub lowest_month: Option<LowestMonth>,
    pub total_capital_cash_flow: f64,
    pub final_loan_balance: f64,
    pub final_equity: f64,
}

impl SummaryMetrics {
    pub fn from_months(months: &[MonthProjection]) -> Self {
        let total_income: f64 = months.iter().map(|m| m.total_income).sum();
        let total_expenses: f64 = months.iter().map(|m| m.total_expenses).sum();
        let total_net: f64 = months.iter().map(|m| m.net_cash_flow).sum();
        let total_capital_cash_flow: f64 = months.iter().map(|m| m.capital_cash_flow).sum();

        let average_monthly_net = if months.is_empty() {
            0.0
        } else {
            total_net / months.len() as f64
        };

        let months_with_negative_cash_flow =
            months.iter().filter(|m| m.net_cash_flow < 0.0).count() as u32;

        // Earliest month wins ties
        let lowest_month = months.iter().fold(None, |lowest: Option<LowestMonth>, m| match lowest {
            Some(l) if l.net_cash_flow <= m.net_cash_flow => Some(l),
            _ => Some(LowestMonth {
                month_index: m.month_index,
                net_cash_flow: m.net_cash_flow,
            }),
        });

        let final_loan_balance = months.last().map(|m| m.loan_balance).unwrap_or(0.0);
        let final_equity = months.last().map(|m| m.equity).unwrap_or(0.0);

        Self {
            total_income,
            total_expenses,
            total_net,
            average_monthly_net,
            months_with_negative_cash_flow,
            lowest_month,
            total_capital_cash_flow,
            final_loan_balance,
            final_equity,
        }
    }
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub monthly_results: Vec<MonthProjection>,
    pub summary_metrics: SummaryMetrics,
}

/// Flat CSV row; the per-property breakdown is not exported
#[derive(Debug, Serialize)]
struct MonthCsvRow {
    #[serde(rename = "Month")]
    month_index: u32,
    #[serde(rename = "MonthStart")]
    month_start: Option<NaiveDate>,
    #[serde(rename = "Income")]
    total_income: f64,
    #[serde(rename = "Expenses")]
    total_expenses: f64,
    #[serde(rename = "Interest")]
    total_interest: f64,
    #[serde(rename = "Principal")]
    total_principal: f64,
    #[serde(rename = "NetCashFlow")]
    net_cash_flow: f64,
    #[serde(rename = "CapitalCashFlow")]
    capital_cash_flow: f64,
    #[serde(rename = "PropertyValue")]
    property_value: f64,
    #[serde(rename = "LoanBalance")]
    loan_balance: f64,
    #[serde(rename = "Equity")]
    equity: f64,
}

impl From<&MonthProjection> for MonthCsvRow {
    fn from(m: &MonthProjection) -> Self {
        Self {
            month_index: m.month_index,
            month_start: m.month_start,
            total_income: m.total_income,
            total_expenses: m.total_expenses,
            total_interest: m.total_interest,
            total_principal: m.total_principal,
            net_cash_flow: m.net_cash_flow,
            capital_cash_flow: m.capital_cash_flow,
            property_value: m.property_value,
            loan_balance: m.loan_balance,
            equity: m.equity,
        }
    }
}

impl ProjectionResult {
    /// Assemble a result, computing the summary once from the finished months
    pub fn from_months(monthly_results: Vec<MonthProjection>) -> Self {
        let summary_metrics = SummaryMetrics::from_months(&monthly_results);
        Self {
            monthly_results,
            summary_metrics,
        }
    }

    /// Write one CSV row per month
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for month in &self.monthly_results {
            csv_writer.serialize(MonthCsvRow::from(month))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
