//! Portfolio snapshot structures and CSV loading

mod data;
pub mod loader;

pub use data::{
    monthly_interest, ExpenseItem, LoanState, PortfolioState, PropertyState, SaleRemoval,
};
pub use loader::{load_portfolio, load_portfolio_from_readers};
