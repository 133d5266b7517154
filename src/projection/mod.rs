//! Month-by-month portfolio projection

mod engine;
mod month;
mod results;
mod structural;

pub use engine::{
    run_projection, validate_horizon, ProjectionConfig, ProjectionEngine, DEFAULT_HORIZON_MONTHS,
    MAX_HORIZON_MONTHS,
};
pub use month::{
    apply_expense_change, apply_interest_rate_factor, apply_rent_change, apply_vacancy_factor,
    project_month, LoanAdjustment, MonthStep, VacancyAdjustment,
};
pub use results::{LowestMonth, MonthProjection, ProjectionResult, PropertyBreakdown, SummaryMetrics};
pub use structural::{apply_structural_factor, purchased_property_id, StructuralChange};
