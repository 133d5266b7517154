//! Scenario factors: config shapes, parsing, validation and time windows

mod config;
mod input;
pub mod loader;

pub use config::{
    is_valid_factor_config, parse_factor_config, ApplyTo, BuyPropertyConfig, ExpenseChangeConfig,
    FactorConfig, FactorType, InterestRateConfig, RentChangeConfig, SellPropertyConfig,
    VacancyConfig,
};
pub use input::{resolve_factors, ScenarioFactor, ScenarioFactorInput};
pub use loader::{load_scenario, parse_scenario};
