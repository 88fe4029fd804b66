use crate::{
    error::{require_probability, StaffingResult},
    scenario::{SearchConfig, StaffingScenario},
    traffic::TrafficRegime,
};
use serde::{Deserialize, Serialize};

/// A scenario file: the parameter object, search settings and an optional
/// list of vacation probabilities to sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub scenario: StaffingScenario,
    #[serde(default)]
    pub search:   SearchConfig,
    #[serde(default)]
    pub sweep:    Vec<f64>,
}

impl ScenarioConfig {
    /// Load and validate a JSON scenario file.
    /// In tests, use ScenarioConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content).map_err(|e| anyhow::anyhow!("Invalid scenario {path}: {e}"))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StaffingResult<()> {
        self.scenario.validate()?;
        self.search.limits.validate()?;
        for &p in &self.sweep {
            require_probability("sweep", p)?;
        }
        Ok(())
    }

    /// Weekday/weekend call-centre constants used across the test suite.
    pub fn default_test() -> Self {
        Self {
            scenario: StaffingScenario {
                normal:                TrafficRegime::new(225.0, 7.0, 60.0),
                vacation:              TrafficRegime::new(375.0, 2.0, 25.0),
                vacation_probability:  0.75,
                average_handling_time: 180.0,
                target_answer_time:    20.0,
                target_service_level:  0.80,
                shrinkage:             0.30,
            },
            search: SearchConfig::default(),
            sweep:  vec![],
        }
    }
}
