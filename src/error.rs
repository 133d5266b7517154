//! Error type for loading portfolios and scenarios
//!
//! The projection itself never fails; only the edges that read snapshots,
//! scenario files and CLI input return these errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{kind} {id} references unknown property {property_id}")]
    UnknownProperty {
        kind: &'static str,
        id: String,
        property_id: String,
    },

    #[error("duplicate property id: {0}")]
    DuplicateProperty(String),

    #[error("unknown factor type: {0}")]
    UnknownFactorType(String),

    #[error("time horizon of {months} months is outside 1..={max}")]
    HorizonOutOfRange { months: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
