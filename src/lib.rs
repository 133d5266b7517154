//! Portfolio Forecast - cash-flow and equity projections for property portfolios
//!
//! This library provides:
//! - Portfolio snapshots (properties, loans, expenses) and CSV loading
//! - Scenario factors: interest-rate shifts, vacancies, rent and expense
//!   changes, property sales and purchases
//! - A deterministic month-by-month projector and summary metrics
//! - A scenario runner for parallel side-by-side comparisons

pub mod error;
pub mod portfolio;
pub mod factors;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{Error, Result};
pub use portfolio::{PortfolioState, PropertyState, LoanState, ExpenseItem};
pub use factors::{FactorConfig, FactorType, ScenarioFactorInput, parse_factor_config, is_valid_factor_config};
pub use projection::{ProjectionEngine, ProjectionConfig, ProjectionResult, MonthProjection, run_projection};
pub use scenario::{Scenario, ScenarioRunner};
