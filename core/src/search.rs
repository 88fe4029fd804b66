//! Staffing search — adds one agent at a time until the SLA is met.
//!
//! STATES:
//!   Searching  -> evaluate `current_agents`, append a trial record.
//!   SlaMet     -> the last record meets the target; results are final.
//!   Infeasible -> `current_agents` passed `max_agents`, or the service level
//!                 saturated at 100% below an unreachable target; ConvergenceFailure.
//!
//! RULES:
//!   - Every evaluated agent count is strictly above the traffic intensity.
//!   - Records are append-only and ordered by agent count.
//!   - Only the last record may meet the target (first crossing).

use crate::{
    blended::BlendedTraffic,
    erlang_c::{
        ensure_stable, require_load, service_level, ErlangCTerms, Evaluation, ServiceTargets,
        MAX_SERVERS,
    },
    error::{require_positive, StaffingError, StaffingResult},
    types::{AgentCount, Erlangs},
};
use serde::{Deserialize, Serialize};

pub const MAX_AGENT_FACTOR: f64 = 10_000.0;
pub const MIN_SEARCH_HEADROOM: AgentCount = 1_000;
/// Trailing records a `ConvergenceFailure` carries.
pub const FAILURE_TRIAL_TAIL: usize = 64;

/// What to do when the starting agent count cannot serve the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityPolicy {
    /// Fail with `UnstableQueue`.
    Reject,
    /// Start at the smallest whole count above the traffic intensity.
    #[default]
    AdvanceToStable,
}

/// Upper bound on the agent counts a search may evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    pub max_agent_factor: f64,
    pub min_headroom:     AgentCount,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_agent_factor: MAX_AGENT_FACTOR,
            min_headroom:     MIN_SEARCH_HEADROOM,
        }
    }
}

impl SearchLimits {
    pub fn validate(&self) -> StaffingResult<()> {
        require_positive("max_agent_factor", self.max_agent_factor)?;
        Ok(())
    }

    /// `max(ceil(traffic * factor), first_agents + headroom)`, capped at `MAX_SERVERS`.
    pub fn max_agents(&self, traffic_intensity: Erlangs, first_agents: AgentCount) -> AgentCount {
        // Float-to-int `as` saturates, so absurd loads clamp instead of wrapping.
        let scaled = (traffic_intensity * self.max_agent_factor).ceil() as AgentCount;
        scaled
            .max(first_agents.saturating_add(self.min_headroom))
            .min(MAX_SERVERS)
    }
}

/// One evaluated agent count. Percentages are unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingTrialResult {
    pub num_agents:               AgentCount,
    pub waiting_probability:      f64,
    /// Percent of contacts answered within the target answer time.
    pub service_level:            f64,
    /// Seconds.
    pub average_speed_of_answer:  f64,
    pub immediate_answer_percent: f64,
    pub max_occupancy:            f64,
    /// Headcount once shrinkage is taken into account.
    pub shrunk_agent_count:       AgentCount,
}

impl StaffingTrialResult {
    pub(crate) fn derive(
        num_agents: AgentCount,
        traffic_intensity: Erlangs,
        evaluation: Evaluation,
        targets: &ServiceTargets,
    ) -> Self {
        let agents = num_agents as f64;
        let wp = evaluation.waiting_probability;
        Self {
            num_agents,
            waiting_probability:      wp,
            service_level:            evaluation.service_level * 100.0,
            average_speed_of_answer:  wp * targets.average_handling_time() / (agents - traffic_intensity),
            immediate_answer_percent: (1.0 - wp) * 100.0,
            max_occupancy:            traffic_intensity / agents * 100.0,
            shrunk_agent_count:       (agents / (1.0 - targets.shrinkage())).ceil() as AgentCount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    Searching,
    SlaMet,
    Infeasible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    Continue,
    SlaMet,
}

/// Final, ordered trial records of a search that met its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingOutcome {
    pub traffic_intensity: Erlangs,
    pub trials:            Vec<StaffingTrialResult>,
}

impl StaffingOutcome {
    /// The first record meeting the target.
    pub fn accepted(&self) -> Option<&StaffingTrialResult> {
        self.trials.last()
    }
}

/// Acceptance is decided on the fraction, before conversion to percent.
fn meets_target(targets: &ServiceTargets, service_level: f64) -> bool {
    targets.is_reachable() && service_level >= targets.target_service_level()
}

/// Smallest whole agent count strictly above `traffic_intensity`.
pub fn first_stable_agents(traffic_intensity: Erlangs) -> AgentCount {
    (traffic_intensity.floor() as AgentCount).saturating_add(1)
}

#[derive(Debug)]
pub struct StaffingSearch {
    traffic:        Erlangs,
    targets:        ServiceTargets,
    current_agents: AgentCount,
    max_agents:     AgentCount,
    terms:          ErlangCTerms,
    results:        Vec<StaffingTrialResult>,
    state:          SearchState,
}

impl StaffingSearch {
    pub fn new(
        traffic_intensity: Erlangs,
        starting_agents: AgentCount,
        targets: ServiceTargets,
        policy: StabilityPolicy,
        limits: SearchLimits,
    ) -> StaffingResult<Self> {
        let traffic = require_load(traffic_intensity)?;
        limits.validate()?;

        let first_agents = match policy {
            StabilityPolicy::Reject => {
                ensure_stable(traffic, starting_agents as f64)?;
                starting_agents
            }
            StabilityPolicy::AdvanceToStable => {
                let stable = first_stable_agents(traffic);
                if starting_agents < stable {
                    log::warn!(
                        "starting agent count {starting_agents} cannot serve {traffic:.4} Erlangs; \
                         advancing to {stable}"
                    );
                }
                starting_agents.max(stable)
            }
        };
        if first_agents > MAX_SERVERS {
            return Err(StaffingError::invalid(
                "starting_agents",
                first_agents as f64,
                "exceeds the supported server count",
            ));
        }
        let max_agents = limits.max_agents(traffic, first_agents);

        Ok(Self {
            traffic,
            targets,
            current_agents: first_agents,
            max_agents,
            terms: ErlangCTerms::new(traffic, first_agents),
            results: Vec::new(),
            state: SearchState::Searching,
        })
    }

    /// Start from the blended traffic intensity and starting agent count.
    pub fn from_blend(
        blended: &BlendedTraffic,
        targets: ServiceTargets,
        policy: StabilityPolicy,
        limits: SearchLimits,
    ) -> StaffingResult<Self> {
        Self::new(blended.traffic_intensity, blended.starting_agents, targets, policy, limits)
    }

    pub fn state(&self) -> SearchState               { self.state }
    pub fn current_agents(&self) -> AgentCount       { self.current_agents }
    pub fn max_agents(&self) -> AgentCount           { self.max_agents }
    pub fn traffic_intensity(&self) -> Erlangs       { self.traffic }
    pub fn results(&self) -> &[StaffingTrialResult]  { &self.results }

    /// Evaluate the current agent count and advance the state machine.
    ///
    /// Once infeasible, every further call returns the same
    /// `ConvergenceFailure` context.
    pub fn step(&mut self) -> StaffingResult<SearchStep> {
        match self.state {
            SearchState::SlaMet => return Ok(SearchStep::SlaMet),
            SearchState::Infeasible => return Err(self.convergence_failure()),
            SearchState::Searching => {}
        }

        if self.current_agents > self.max_agents {
            self.state = SearchState::Infeasible;
            return Err(self.convergence_failure());
        }

        let evaluation = self.evaluate_current()?;
        let met = meets_target(&self.targets, evaluation.service_level);
        // Service level has rounded up to exactly 1; further agents cannot change it.
        let saturated = !met && evaluation.service_level >= 1.0;
        let trial = StaffingTrialResult::derive(
            self.current_agents,
            self.traffic,
            evaluation,
            &self.targets,
        );

        log::debug!(
            "agents={} wait={:.6} sla={:.2}% asa={:.1}s",
            trial.num_agents,
            trial.waiting_probability,
            trial.service_level,
            trial.average_speed_of_answer
        );
        self.results.push(trial);

        if met {
            self.state = SearchState::SlaMet;
            log::info!(
                "SLA {:.2}% met with {} agents after {} trials",
                self.targets.target_percent(),
                self.current_agents,
                self.results.len()
            );
            return Ok(SearchStep::SlaMet);
        }
        if saturated {
            self.state = SearchState::Infeasible;
            return Err(self.convergence_failure());
        }

        self.current_agents += 1;
        self.terms.add_server();
        Ok(SearchStep::Continue)
    }

    /// Run until the SLA is met or the agent bound is exceeded.
    pub fn run(mut self) -> StaffingResult<StaffingOutcome> {
        while self.step()? == SearchStep::Continue {}
        Ok(StaffingOutcome {
            traffic_intensity: self.traffic,
            trials:            self.results,
        })
    }

    fn evaluate_current(&self) -> StaffingResult<Evaluation> {
        let params = self.targets.for_agents(self.current_agents as f64)?;
        ensure_stable(self.traffic, params.num_agents())?;
        debug_assert_eq!(self.terms.servers(), self.current_agents);

        let waiting_probability = self.terms.waiting_probability();
        let service_level = service_level(
            waiting_probability,
            self.traffic,
            params.num_agents(),
            params.target_answer_time(),
            params.average_handling_time(),
        )?;

        Ok(Evaluation { waiting_probability, service_level })
    }

    fn convergence_failure(&self) -> StaffingError {
        let (last_agents, last_service_level) = self
            .results
            .last()
            .map(|t| (t.num_agents, t.service_level))
            .unwrap_or((self.current_agents, 0.0));
        let tail = self.results.len().saturating_sub(FAILURE_TRIAL_TAIL);
        StaffingError::ConvergenceFailure {
            target_service_level: self.targets.target_service_level(),
            last_agents,
            last_service_level,
            max_agents: self.max_agents,
            evaluated: self.results.len(),
            trials: self.results[tail..].to_vec(),
        }
    }
}
