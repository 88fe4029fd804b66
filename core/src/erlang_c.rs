//! Erlang-C waiting probability and service level for one staffing level.
//!
//! For a load of `A` Erlangs served by `N` agents:
//!
//!   x = (A^N / N!) * N / (N - A)
//!   y = 1 + sum_{i=0}^{N-1} A^i / i!
//!   P(wait) = x / (x + y)
//!   SL      = 1 - P(wait) * exp(-(N - A) * target_answer_time / average_handling_time)
//!
//! `A^N` and `N!` are never materialised: the terms are carried as logarithms
//! with a running `ln(i!)`, so large agent counts neither overflow nor underflow.
//!
//! RULE: nothing here is evaluated at `N <= A`. Such a queue has no steady
//! state and every entry point raises `UnstableQueue` instead of producing NaN.

use crate::{
    blended::round_half_even,
    error::{require_positive, require_probability, StaffingError, StaffingResult},
    search::StaffingTrialResult,
    types::{AgentCount, Erlangs},
};
use serde::{Deserialize, Serialize};

/// Largest server count a single evaluation accepts.
pub const MAX_SERVERS: AgentCount = 100_000_000;

/// Service-level objective shared by every candidate agent count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServiceTargets {
    target_answer_time:    f64,
    target_service_level:  f64,
    average_handling_time: f64,
    shrinkage:             f64,
}

impl ServiceTargets {
    /// `target_service_level` is accepted in (0, 1]. A target of exactly 1.0
    /// is valid but can never be met by a finite staffing level.
    pub fn new(
        target_answer_time: f64,
        target_service_level: f64,
        average_handling_time: f64,
        shrinkage: f64,
    ) -> StaffingResult<Self> {
        let target_answer_time = require_positive("target_answer_time", target_answer_time)?;
        let average_handling_time =
            require_positive("average_handling_time", average_handling_time)?;
        if !(target_service_level > 0.0 && target_service_level <= 1.0) {
            return Err(StaffingError::invalid(
                "target_service_level",
                target_service_level,
                "must lie in (0, 1]",
            ));
        }
        if !(0.0..1.0).contains(&shrinkage) {
            return Err(StaffingError::invalid("shrinkage", shrinkage, "must lie in [0, 1)"));
        }
        Ok(Self { target_answer_time, target_service_level, average_handling_time, shrinkage })
    }

    pub fn target_answer_time(&self) -> f64    { self.target_answer_time }
    pub fn target_service_level(&self) -> f64  { self.target_service_level }
    pub fn average_handling_time(&self) -> f64 { self.average_handling_time }
    pub fn shrinkage(&self) -> f64             { self.shrinkage }

    /// Target as a percentage, the unit trial records use.
    pub fn target_percent(&self) -> f64 {
        self.target_service_level * 100.0
    }

    /// Service level stays strictly below 1 for any finite staffing.
    pub fn is_reachable(&self) -> bool {
        self.target_service_level < 1.0
    }

    /// Fresh parameter snapshot for one candidate agent count.
    pub fn for_agents(&self, num_agents: f64) -> StaffingResult<QueueParameters> {
        let num_agents = require_positive("num_agents", num_agents)?;
        Ok(QueueParameters { num_agents, targets: *self })
    }
}

/// Immutable inputs of a single Erlang-C evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueueParameters {
    num_agents: f64,
    targets:    ServiceTargets,
}

impl QueueParameters {
    pub fn new(
        num_agents: f64,
        target_answer_time: f64,
        target_service_level: f64,
        average_handling_time: f64,
        shrinkage: f64,
    ) -> StaffingResult<Self> {
        ServiceTargets::new(target_answer_time, target_service_level, average_handling_time, shrinkage)?
            .for_agents(num_agents)
    }

    pub fn num_agents(&self) -> f64              { self.num_agents }
    pub fn targets(&self) -> &ServiceTargets      { &self.targets }
    pub fn target_answer_time(&self) -> f64      { self.targets.target_answer_time }
    pub fn target_service_level(&self) -> f64    { self.targets.target_service_level }
    pub fn average_handling_time(&self) -> f64   { self.targets.average_handling_time }
    pub fn shrinkage(&self) -> f64               { self.targets.shrinkage }
}

/// Waiting probability and service level (both fractions) at one staffing level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub waiting_probability: f64,
    pub service_level:       f64,
}

#[derive(Debug, Clone)]
pub struct ErlangCEvaluator {
    params: QueueParameters,
}

impl ErlangCEvaluator {
    pub fn new(params: QueueParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &QueueParameters {
        &self.params
    }

    pub fn waiting_probability(&self, traffic_intensity: Erlangs) -> StaffingResult<f64> {
        waiting_probability(traffic_intensity, self.params.num_agents)
    }

    pub fn service_level(
        &self,
        waiting_probability: f64,
        traffic_intensity: Erlangs,
    ) -> StaffingResult<f64> {
        service_level(
            waiting_probability,
            traffic_intensity,
            self.params.num_agents,
            self.params.target_answer_time(),
            self.params.average_handling_time(),
        )
    }

    pub fn evaluate(&self, traffic_intensity: Erlangs) -> StaffingResult<Evaluation> {
        let waiting_probability = self.waiting_probability(traffic_intensity)?;
        let service_level = self.service_level(waiting_probability, traffic_intensity)?;
        Ok(Evaluation { waiting_probability, service_level })
    }

    /// Full trial record. A fractional agent count is rounded half-to-even
    /// first and every field is evaluated at the whole count.
    pub fn trial(&self, traffic_intensity: Erlangs) -> StaffingResult<StaffingTrialResult> {
        let servers = round_half_even(self.params.num_agents);
        ensure_stable(require_load(traffic_intensity)?, servers)?;
        let whole = Self::new(self.params.targets.for_agents(servers)?);
        let evaluation = whole.evaluate(traffic_intensity)?;
        Ok(StaffingTrialResult::derive(
            servers as AgentCount,
            traffic_intensity,
            evaluation,
            &self.params.targets,
        ))
    }
}

/// Erlang-C probability that an arriving contact has to wait.
///
/// `num_agents` is rounded half-to-even to a whole server count. Fails with
/// `UnstableQueue` when either the given or the rounded count does not
/// exceed `traffic_intensity`.
pub fn waiting_probability(traffic_intensity: Erlangs, num_agents: f64) -> StaffingResult<f64> {
    let traffic = require_load(traffic_intensity)?;
    let num_agents = require_positive("num_agents", num_agents)?;
    let servers = round_half_even(num_agents);
    ensure_stable(traffic, num_agents.min(servers))?;
    if servers > MAX_SERVERS as f64 {
        return Err(StaffingError::invalid(
            "num_agents",
            num_agents,
            "exceeds the supported server count",
        ));
    }
    Ok(ErlangCTerms::new(traffic, servers as AgentCount).waiting_probability())
}

/// Fraction of contacts answered within `target_answer_time`.
pub fn service_level(
    waiting_probability: f64,
    traffic_intensity: Erlangs,
    num_agents: f64,
    target_answer_time: f64,
    average_handling_time: f64,
) -> StaffingResult<f64> {
    let waiting_probability = require_probability("waiting_probability", waiting_probability)?;
    let traffic = require_load(traffic_intensity)?;
    let num_agents = require_positive("num_agents", num_agents)?;
    let target_answer_time = require_positive("target_answer_time", target_answer_time)?;
    let average_handling_time = require_positive("average_handling_time", average_handling_time)?;
    ensure_stable(traffic, num_agents)?;

    let decay = (-(num_agents - traffic) * (target_answer_time / average_handling_time)).exp();
    Ok(1.0 - waiting_probability * decay)
}

/// Traffic intensity must be finite and non-negative.
pub(crate) fn require_load(traffic_intensity: Erlangs) -> StaffingResult<Erlangs> {
    if traffic_intensity.is_finite() && traffic_intensity >= 0.0 {
        Ok(traffic_intensity)
    } else {
        Err(StaffingError::invalid(
            "traffic_intensity",
            traffic_intensity,
            "must be a finite value >= 0",
        ))
    }
}

pub(crate) fn ensure_stable(traffic_intensity: Erlangs, num_agents: f64) -> StaffingResult<()> {
    if num_agents > traffic_intensity {
        Ok(())
    } else {
        Err(StaffingError::UnstableQueue { traffic_intensity, num_agents })
    }
}

/// Running Erlang-C terms for a fixed load, held as logarithms.
///
/// After `servers = N` additions:
///   - `ln_last_term`   = ln(A^N / N!)
///   - `ln_partial_sum` = ln(1 + sum_{i=0}^{N-1} A^i / i!)
///
/// Adding one server is O(1), which is what the staffing search relies on.
#[derive(Debug, Clone)]
pub(crate) struct ErlangCTerms {
    traffic:        Erlangs,
    ln_traffic:     f64,
    servers:        AgentCount,
    ln_last_term:   f64,
    ln_partial_sum: f64,
}

impl ErlangCTerms {
    pub(crate) fn new(traffic: Erlangs, servers: AgentCount) -> Self {
        let mut terms = Self {
            traffic,
            ln_traffic:     traffic.ln(),
            servers:        0,
            ln_last_term:   0.0, // A^0 / 0! = 1
            ln_partial_sum: 0.0, // the leading 1 of y
        };
        for _ in 0..servers {
            terms.add_server();
        }
        terms
    }

    pub(crate) fn servers(&self) -> AgentCount {
        self.servers
    }

    pub(crate) fn add_server(&mut self) {
        self.ln_partial_sum = ln_add_exp(self.ln_partial_sum, self.ln_last_term);
        self.servers += 1;
        self.ln_last_term += self.ln_traffic - (self.servers as f64).ln();
    }

    /// Requires `servers > traffic`; callers check stability first.
    pub(crate) fn waiting_probability(&self) -> f64 {
        let n = self.servers as f64;
        let ln_x = self.ln_last_term + n.ln() - (n - self.traffic).ln();
        // x / (x + y) == 1 / (1 + y/x); an infinite ratio yields exactly 0.
        1.0 / (1.0 + (self.ln_partial_sum - ln_x).exp())
    }
}

/// ln(e^a + e^b) without leaving the log domain.
fn ln_add_exp(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if hi == f64::NEG_INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}
