//! Output shapes handed to renderers and other external consumers.
//!
//! The search returns row-oriented trial records; charts want one array per
//! metric. `StaffingSeries` is that column view, and `StaffingReport` adds
//! the identifying envelope a runner writes out.

use crate::{
    blended::BlendedTraffic,
    error::StaffingResult,
    scenario::{StaffingPlan, StaffingScenario},
    search::StaffingTrialResult,
    types::{AgentCount, RunId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Parallel arrays, one entry per evaluated agent count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffingSeries {
    pub agents:                   Vec<AgentCount>,
    pub waiting_probabilities:    Vec<f64>,
    pub service_levels:           Vec<f64>,
    pub average_speed_of_answer:  Vec<f64>,
    pub immediate_answer_percent: Vec<f64>,
    pub max_occupancy:            Vec<f64>,
    pub shrunk_agents:            Vec<AgentCount>,
}

impl StaffingSeries {
    pub fn from_trials(trials: &[StaffingTrialResult]) -> Self {
        let mut series = Self::default();
        for t in trials {
            series.agents.push(t.num_agents);
            series.waiting_probabilities.push(t.waiting_probability);
            series.service_levels.push(t.service_level);
            series.average_speed_of_answer.push(t.average_speed_of_answer);
            series.immediate_answer_percent.push(t.immediate_answer_percent);
            series.max_occupancy.push(t.max_occupancy);
            series.shrunk_agents.push(t.shrunk_agent_count);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffingReport {
    pub run_id:       RunId,
    pub generated_at: DateTime<Utc>,
    pub scenario:     StaffingScenario,
    pub blended:      BlendedTraffic,
    pub accepted:     Option<StaffingTrialResult>,
    pub series:       StaffingSeries,
}

impl StaffingReport {
    pub fn new(scenario: &StaffingScenario, plan: &StaffingPlan) -> Self {
        Self {
            run_id:       Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            scenario:     *scenario,
            blended:      plan.blended,
            accepted:     plan.accepted().cloned(),
            series:       plan.series(),
        }
    }

    pub fn to_json(&self) -> StaffingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
