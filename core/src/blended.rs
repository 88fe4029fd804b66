//! Bernoulli mix of the normal and working-vacation regimes.
//!
//! With probability `p` the centre runs in the vacation regime, otherwise
//! in the normal regime. Both the traffic intensity and the agent count are
//! mixed with the same weight; the mixed agent count becomes the first
//! candidate of the staffing search.

use crate::{
    error::{require_probability, StaffingResult},
    traffic::TrafficRegime,
    types::{AgentCount, Erlangs},
};
use serde::{Deserialize, Serialize};

/// Round to the nearest whole number, ties to even (2.5 -> 2, 3.5 -> 4).
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendedTraffic {
    pub traffic_intensity:    Erlangs,
    pub starting_agents:      AgentCount,
    pub normal_intensity:     Erlangs,
    pub vacation_intensity:   Erlangs,
    pub vacation_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendedTrafficModel {
    normal:               TrafficRegime,
    vacation:             TrafficRegime,
    vacation_probability: f64,
}

impl BlendedTrafficModel {
    pub fn new(
        normal: TrafficRegime,
        vacation: TrafficRegime,
        vacation_probability: f64,
    ) -> StaffingResult<Self> {
        let vacation_probability = require_probability("vacation_probability", vacation_probability)?;
        Ok(Self { normal, vacation, vacation_probability })
    }

    pub fn blend(&self) -> StaffingResult<BlendedTraffic> {
        let p = self.vacation_probability;
        let normal_intensity = self.normal.intensity()?;
        let vacation_intensity = self.vacation.intensity()?;

        let traffic_intensity = p * vacation_intensity + (1.0 - p) * normal_intensity;
        let mixed_agents = p * self.vacation.num_agents + (1.0 - p) * self.normal.num_agents;
        // Both counts are validated > 0, so the mix is finite and non-negative.
        let starting_agents = round_half_even(mixed_agents) as AgentCount;

        log::debug!(
            "blend: p={p} normal={normal_intensity:.4} vacation={vacation_intensity:.4} \
             -> traffic={traffic_intensity:.4} start={starting_agents}"
        );

        Ok(BlendedTraffic {
            traffic_intensity,
            starting_agents,
            normal_intensity,
            vacation_intensity,
            vacation_probability: p,
        })
    }
}
