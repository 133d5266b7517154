//! User-authored factor records and their resolved, time-scoped form

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::config::{parse_factor_config, FactorConfig, FactorType};

/// A factor as persisted by the scenario-authoring layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFactorInput {
    pub factor_type: FactorType,

    /// JSON payload whose shape is given by `factor_type`
    #[serde(deserialize_with = "config_as_string")]
    pub config: String,

    /// First month (0-indexed from projection start) the factor applies
    #[serde(default)]
    pub start_month: u32,

    /// Number of months the factor stays active; open-ended when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<u32>,
}

impl ScenarioFactorInput {
    pub fn new(factor_type: FactorType, config: impl Into<String>, start_month: u32) -> Self {
        Self {
            factor_type,
            config: config.into(),
            start_month,
            duration_months: None,
        }
    }

    pub fn with_duration(mut self, months: u32) -> Self {
        self.duration_months = Some(months);
        self
    }

    /// Build an input from an already-typed config
    pub fn from_config(config: &FactorConfig, start_month: u32) -> serde_json::Result<Self> {
        Ok(Self::new(config.factor_type(), config.to_json()?, start_month))
    }

    /// Parse the payload, yielding `None` if it is malformed
    pub fn parse(&self) -> Option<FactorConfig> {
        parse_factor_config(self.factor_type, &self.config)
    }
}

/// Accept either the persisted JSON string or an inline JSON object
fn config_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

/// A factor whose config parsed successfully, ready for projection
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioFactor {
    /// Position in the scenario's factor list (stacking and purchase ids follow it)
    pub position: usize,
    pub start_month: u32,
    pub duration_months: Option<u32>,
    pub config: FactorConfig,
}

impl ScenarioFactor {
    pub fn new(position: usize, config: FactorConfig, start_month: u32) -> Self {
        Self {
            position,
            start_month,
            duration_months: None,
            config,
        }
    }

    pub fn with_duration(mut self, months: u32) -> Self {
        self.duration_months = Some(months);
        self
    }

    pub fn factor_type(&self) -> FactorType {
        self.config.factor_type()
    }

    pub fn is_one_shot(&self) -> bool {
        self.factor_type().is_one_shot()
    }

    /// Month a one-shot factor takes effect; `None` for window-scoped factors
    pub fn effective_month(&self) -> Option<u32> {
        match &self.config {
            FactorConfig::SellProperty(c) => Some(c.settlement_month),
            FactorConfig::BuyProperty(c) => Some(c.purchase_month),
            _ => None,
        }
    }

    /// Exclusive end of the active window, `None` if open-ended
    fn window_end(&self) -> Option<u64> {
        let start = self.start_month as u64;
        let duration_end = self.duration_months.map(|d| start + d as u64);

        match &self.config {
            FactorConfig::Vacancy(c) => {
                let vacancy_end = start + c.months as u64;
                Some(duration_end.map_or(vacancy_end, |end| end.min(vacancy_end)))
            }
            _ => duration_end,
        }
    }

    /// Whether the factor applies in `month`
    ///
    /// Window factors cover `[start_month, start_month + duration)`; one-shot
    /// factors are active only in their configured month.
    pub fn is_active(&self, month: u32) -> bool {
        if let Some(effective) = self.effective_month() {
            return effective == month;
        }

        let month = month as u64;
        month >= self.start_month as u64 && self.window_end().map_or(true, |end| month < end)
    }
}

/// Parse every input, dropping (and logging) those whose config is malformed
/// or whose duration is zero
pub fn resolve_factors(inputs: &[ScenarioFactorInput]) -> Vec<ScenarioFactor> {
    inputs
        .iter()
        .enumerate()
        .filter(|(position, input)| {
            if input.duration_months == Some(0) {
                log::warn!(
                    "Skipping {} factor #{}: durationMonths must be positive",
                    input.factor_type,
                    position
                );
                return false;
            }
            true
        })
        .filter_map(|(position, input)| match input.parse() {
            Some(config) => Some(ScenarioFactor {
                position,
                start_month: input.start_month,
                duration_months: input.duration_months,
                config,
            }),
            None => {
                log::warn!(
                    "Skipping {} factor #{}: config could not be parsed",
                    input.factor_type,
                    position
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::config::{RentChangeConfig, SellPropertyConfig, VacancyConfig};

    fn vacancy(start: u32, months: u32) -> ScenarioFactor {
        ScenarioFactor::new(
            0,
            FactorConfig::Vacancy(VacancyConfig {
                property_id: "p1".into(),
                months,
            }),
            start,
        )
    }

    #[test]
    fn test_open_ended_window() {
        let factor = ScenarioFactor::new(
            0,
            FactorConfig::RentChange(RentChangeConfig {
                change_percent: 3.0,
                property_id: None,
            }),
            4,
        );
        assert!(!factor.is_active(3));
        assert!(factor.is_active(4));
        assert!(factor.is_active(359));
    }

    #[test]
    fn test_duration_window_is_half_open() {
        let factor = ScenarioFactor::new(
            0,
            FactorConfig::RentChange(RentChangeConfig {
                change_percent: 3.0,
                property_id: None,
            }),
            2,
        )
        .with_duration(3);
        let active: Vec<u32> = (0..8).filter(|&m| factor.is_active(m)).collect();
        assert_eq!(active, vec![2, 3, 4]);
    }

    #[test]
    fn test_vacancy_window_uses_months() {
        let factor = vacancy(5, 3);
        let active: Vec<u32> = (0..12).filter(|&m| factor.is_active(m)).collect();
        assert_eq!(active, vec![5, 6, 7]);

        // A shorter duration truncates the vacancy
        let truncated = vacancy(5, 3).with_duration(1);
        assert!(truncated.is_active(5));
        assert!(!truncated.is_active(6));
    }

    #[test]
    fn test_one_shot_active_at_configured_month() {
        let factor = ScenarioFactor::new(
            0,
            FactorConfig::SellProperty(SellPropertyConfig {
                property_id: "p1".into(),
                sale_price: 1.0,
                selling_costs: 0.0,
                settlement_month: 10,
            }),
            0,
        );
        assert!(factor.is_one_shot());
        assert_eq!(factor.effective_month(), Some(10));
        assert!(!factor.is_active(0));
        assert!(factor.is_active(10));
        assert!(!factor.is_active(11));
    }

    #[test]
    fn test_resolve_skips_malformed() {
        let inputs = vec![
            ScenarioFactorInput::new(FactorType::Vacancy, r#"{"propertyId":"p1","months":2}"#, 0),
            ScenarioFactorInput::new(FactorType::InterestRate, "{broken", 0),
            ScenarioFactorInput::new(FactorType::RentChange, r#"{"changePercent":4}"#, 1).with_duration(6),
        ];

        let factors = resolve_factors(&inputs);
        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0].position, 0);
        assert_eq!(factors[1].position, 2);
        assert_eq!(factors[1].duration_months, Some(6));
    }

    #[test]
    fn test_resolve_skips_zero_duration() {
        let inputs = vec![
            ScenarioFactorInput::new(FactorType::RentChange, r#"{"changePercent":4}"#, 0).with_duration(0),
            ScenarioFactorInput::new(FactorType::RentChange, r#"{"changePercent":2}"#, 0).with_duration(1),
        ];

        let factors = resolve_factors(&inputs);
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].position, 1);
        assert_eq!(factors[0].duration_months, Some(1));
    }

    #[test]
    fn test_input_accepts_inline_object_config() {
        let json = r#"{
            "factorType": "interest_rate",
            "config": {"changePercent": 1.5, "applyTo": "all"},
            "startMonth": 12
        }"#;
        let input: ScenarioFactorInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.start_month, 12);
        assert!(input.duration_months.is_none());
        assert!(input.parse().is_some());

        let json = r#"{
            "factorType": "interest_rate",
            "config": "{\"changePercent\": 1.5, \"applyTo\": \"all\"}"
        }"#;
        let input: ScenarioFactorInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.start_month, 0);
        assert!(input.parse().is_some());
    }
}
