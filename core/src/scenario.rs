//! The caller-facing parameter object and the end-to-end staffing run.
//!
//! Flow: regimes -> blended model -> staffing search -> plan.

use crate::{
    blended::{BlendedTraffic, BlendedTrafficModel},
    erlang_c::ServiceTargets,
    error::StaffingResult,
    report::StaffingSeries,
    search::{SearchLimits, StabilityPolicy, StaffingOutcome, StaffingSearch, StaffingTrialResult},
    traffic::TrafficRegime,
};
use serde::{Deserialize, Serialize};

/// All inputs of one staffing run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaffingScenario {
    pub normal:                TrafficRegime,
    pub vacation:              TrafficRegime,
    pub vacation_probability:  f64,
    /// Seconds.
    pub average_handling_time: f64,
    /// Seconds.
    pub target_answer_time:    f64,
    pub target_service_level:  f64,
    pub shrinkage:             f64,
}

/// How the staffing search treats unstable starts and when it gives up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub stability_policy: StabilityPolicy,
    pub limits:           SearchLimits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingPlan {
    pub blended: BlendedTraffic,
    pub outcome: StaffingOutcome,
}

impl StaffingPlan {
    pub fn accepted(&self) -> Option<&StaffingTrialResult> {
        self.outcome.accepted()
    }

    pub fn trials(&self) -> &[StaffingTrialResult] {
        &self.outcome.trials
    }

    pub fn series(&self) -> StaffingSeries {
        StaffingSeries::from_trials(&self.outcome.trials)
    }
}

/// One point of a vacation-probability sweep.
#[derive(Debug)]
pub struct SweepPoint {
    pub vacation_probability: f64,
    pub result:               StaffingResult<StaffingPlan>,
}

impl StaffingScenario {
    pub fn model(&self) -> StaffingResult<BlendedTrafficModel> {
        BlendedTrafficModel::new(self.normal, self.vacation, self.vacation_probability)
    }

    pub fn targets(&self) -> StaffingResult<ServiceTargets> {
        ServiceTargets::new(
            self.target_answer_time,
            self.target_service_level,
            self.average_handling_time,
            self.shrinkage,
        )
    }

    /// Check every parameter without running the search.
    pub fn validate(&self) -> StaffingResult<()> {
        self.targets()?;
        self.model()?.blend()?;
        Ok(())
    }

    pub fn with_vacation_probability(&self, vacation_probability: f64) -> Self {
        Self { vacation_probability, ..*self }
    }

    pub fn run(&self, search: &SearchConfig) -> StaffingResult<StaffingPlan> {
        let targets = self.targets()?;
        let blended = self.model()?.blend()?;
        let outcome =
            StaffingSearch::from_blend(&blended, targets, search.stability_policy, search.limits)?
                .run()?;
        Ok(StaffingPlan { blended, outcome })
    }

    /// Independent runs, one per vacation probability, in input order.
    /// A failing point does not stop the others.
    pub fn sweep_vacation_probabilities(
        &self,
        probabilities: &[f64],
        search: &SearchConfig,
    ) -> Vec<SweepPoint> {
        probabilities
            .iter()
            .map(|&p| {
                let result = self.with_vacation_probability(p).run(search);
                if let Err(e) = &result {
                    log::warn!("sweep point p={p} failed: {e}");
                }
                SweepPoint { vacation_probability: p, result }
            })
            .collect()
    }
}
