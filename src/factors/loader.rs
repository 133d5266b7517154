//! Load scenario definitions from JSON files

use crate::error::Result;
use crate::scenario::Scenario;
use std::fs;
use std::path::Path;

/// Parse a scenario from a JSON document
///
/// ```json
/// {
///   "name": "Rate shock",
///   "timeHorizonMonths": 60,
///   "factors": [
///     {"factorType": "interest_rate", "config": {"changePercent": 2, "applyTo": "all"}, "startMonth": 0}
///   ]
/// }
/// ```
pub fn parse_scenario(json: &str) -> Result<Scenario> {
    Ok(serde_json::from_str(json)?)
}

/// Load a scenario from a JSON file
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario> {
    let contents = fs::read_to_string(path.as_ref())?;
    let scenario = parse_scenario(&contents)?;
    log::debug!(
        "Loaded scenario '{}' from {} ({} factors)",
        scenario.name,
        path.as_ref().display(),
        scenario.factors.len()
    );
    Ok(scenario)
}
