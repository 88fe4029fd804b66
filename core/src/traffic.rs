//! Offered load for a single staffing regime.

use crate::{
    error::{require_positive, StaffingResult},
    types::Erlangs,
};
use serde::{Deserialize, Serialize};

/// Traffic intensity in Erlangs: `arrival_rate / (num_agents * service_rate)`.
///
/// Fails with `InvalidArgument` if any input is not a finite value > 0.
pub fn intensity(arrival_rate: f64, num_agents: f64, service_rate: f64) -> StaffingResult<Erlangs> {
    let arrival_rate = require_positive("arrival_rate", arrival_rate)?;
    let num_agents = require_positive("num_agents", num_agents)?;
    let service_rate = require_positive("service_rate", service_rate)?;
    Ok(arrival_rate / (num_agents * service_rate))
}

/// Arrival rate, staffing and service rate of one regime
/// ("normal" weekdays or "vacation" weekends).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficRegime {
    pub arrival_rate: f64,
    pub num_agents:   f64,
    pub service_rate: f64,
}

impl TrafficRegime {
    pub fn new(arrival_rate: f64, num_agents: f64, service_rate: f64) -> Self {
        Self { arrival_rate, num_agents, service_rate }
    }

    pub fn intensity(&self) -> StaffingResult<Erlangs> {
        intensity(self.arrival_rate, self.num_agents, self.service_rate)
    }
}
