use crate::{search::StaffingTrialResult, types::AgentCount};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StaffingError {
    #[error("Invalid argument '{parameter}' = {value}: {reason}")]
    InvalidArgument {
        parameter: &'static str,
        value:     f64,
        reason:    &'static str,
    },

    #[error("Unstable queue: {num_agents} agents cannot serve {traffic_intensity:.4} Erlangs")]
    UnstableQueue {
        traffic_intensity: f64,
        num_agents:        f64,
    },

    #[error(
        "No convergence: service level {last_service_level:.2}% at {last_agents} agents \
         is below target {target_service_level} after {evaluated} trials (limit {max_agents} agents)"
    )]
    ConvergenceFailure {
        target_service_level: f64,
        last_agents:          AgentCount,
        last_service_level:   f64,
        max_agents:           AgentCount,
        /// Number of agent counts evaluated before the search gave up.
        evaluated:            usize,
        /// The last `FAILURE_TRIAL_TAIL` trials, oldest first.
        trials:               Vec<StaffingTrialResult>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StaffingResult<T> = Result<T, StaffingError>;

impl StaffingError {
    pub(crate) fn invalid(parameter: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidArgument { parameter, value, reason }
    }
}

/// `value` must be finite and strictly positive.
pub(crate) fn require_positive(parameter: &'static str, value: f64) -> StaffingResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(StaffingError::invalid(parameter, value, "must be a finite value > 0"))
    }
}

/// `value` must lie in the closed interval [0, 1].
pub(crate) fn require_probability(parameter: &'static str, value: f64) -> StaffingResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(StaffingError::invalid(parameter, value, "must lie in [0, 1]"))
    }
}
