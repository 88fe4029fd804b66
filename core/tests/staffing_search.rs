//! Staffing search tests — termination, first crossing, failure bounds.

use staffing_core::{
    erlang_c::ServiceTargets,
    error::StaffingError,
    search::{
        SearchLimits, SearchState, SearchStep, StabilityPolicy, StaffingSearch,
        FAILURE_TRIAL_TAIL,
    },
};

const WEEKEND_TRAFFIC: f64 = 0.75 * 7.5 + 0.25 * (225.0 / 420.0);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn targets(sla: f64) -> ServiceTargets {
    ServiceTargets::new(20.0, sla, 180.0, 0.30).expect("valid targets")
}

fn search(traffic: f64, start: u64, sla: f64, policy: StabilityPolicy) -> StaffingSearch {
    StaffingSearch::new(traffic, start, targets(sla), policy, SearchLimits::default())
        .expect("search setup")
}

#[test]
fn weekend_mix_needs_nine_agents() {
    init_logging();
    let outcome = search(WEEKEND_TRAFFIC, 3, 0.80, StabilityPolicy::AdvanceToStable)
        .run()
        .expect("search converges");

    // (agents, P(wait), SL %, shrunk headcount)
    let expected = [
        (6, 0.8906694235848065, 13.287111064544366, 9),
        (7, 0.5336470865429626, 53.50927569125334, 10),
        (8, 0.3023644145832225, 76.42846284910712, 12),
        (9, 0.16133964663618938, 88.7450547627171, 13),
    ];
    assert_eq!(outcome.trials.len(), expected.len());
    for (trial, (agents, wp, sl, shrunk)) in outcome.trials.iter().zip(expected) {
        assert_eq!(trial.num_agents, agents);
        assert!((trial.waiting_probability - wp).abs() < 1e-9, "P(wait) at {agents}: {}", trial.waiting_probability);
        assert!((trial.service_level - sl).abs() < 1e-7, "SL at {agents}: {}", trial.service_level);
        assert_eq!(trial.shrunk_agent_count, shrunk, "shrunk headcount at {agents}");
    }

    let accepted = outcome.accepted().unwrap();
    assert_eq!(accepted.num_agents, 9);
    assert!((accepted.average_speed_of_answer - 8.960350623100766).abs() < 1e-7);
    assert!((accepted.immediate_answer_percent - 83.86603533638106).abs() < 1e-7);
    assert!((accepted.max_occupancy - 63.988095238095234).abs() < 1e-9);
}

#[test]
fn result_is_the_first_crossing() {
    let outcome = search(WEEKEND_TRAFFIC, 6, 0.80, StabilityPolicy::Reject).run().unwrap();
    let (last, earlier) = outcome.trials.split_last().unwrap();
    assert!(last.service_level >= 80.0, "final SL {} below target", last.service_level);
    for t in earlier {
        assert!(t.service_level < 80.0, "SL {} at {} agents already met target", t.service_level, t.num_agents);
    }
    let agents: Vec<u64> = outcome.trials.iter().map(|t| t.num_agents).collect();
    assert_eq!(agents, vec![6, 7, 8, 9], "agent counts must rise by one per trial");
}

#[test]
fn start_already_meeting_target_yields_one_trial() {
    let outcome = search(225.0 / 420.0, 7, 0.80, StabilityPolicy::Reject).run().unwrap();
    assert_eq!(outcome.trials.len(), 1);
    assert_eq!(outcome.trials[0].num_agents, 7);
    assert!(outcome.trials[0].service_level > 99.99);
}

#[test]
fn reject_policy_raises_unstable_queue() {
    let err = StaffingSearch::new(
        WEEKEND_TRAFFIC,
        3,
        targets(0.80),
        StabilityPolicy::Reject,
        SearchLimits::default(),
    )
    .err()
    .expect("start of 3 agents cannot carry 5.76 Erlangs");
    match err {
        StaffingError::UnstableQueue { traffic_intensity, num_agents } => {
            assert_eq!(traffic_intensity, WEEKEND_TRAFFIC);
            assert_eq!(num_agents, 3.0);
        }
        other => panic!("expected UnstableQueue, got {other:?}"),
    }
}

#[test]
fn advance_policy_starts_above_load() {
    let s = search(5.0, 2, 0.80, StabilityPolicy::AdvanceToStable);
    assert_eq!(s.current_agents(), 6, "integer load must start strictly above it");
    let s = search(5.0, 11, 0.80, StabilityPolicy::AdvanceToStable);
    assert_eq!(s.current_agents(), 11, "a stable start is kept");
}

#[test]
fn no_trial_is_evaluated_at_or_below_load() {
    for traffic in [0.2, 1.0, 5.0, 17.9] {
        let outcome = search(traffic, 0, 0.95, StabilityPolicy::AdvanceToStable).run().unwrap();
        for t in &outcome.trials {
            assert!((t.num_agents as f64) > traffic, "evaluated {} agents at load {traffic}", t.num_agents);
            assert!(t.waiting_probability.is_finite());
            assert!(t.average_speed_of_answer.is_finite());
        }
    }
}

#[test]
fn full_service_target_never_converges() {
    let err = search(0.5, 1, 1.0, StabilityPolicy::AdvanceToStable)
        .run()
        .expect_err("100% service level is unreachable");
    match err {
        StaffingError::ConvergenceFailure {
            target_service_level,
            last_agents,
            last_service_level,
            max_agents,
            evaluated,
            trials,
        } => {
            assert_eq!(target_service_level, 1.0);
            assert_eq!(max_agents, 5_000);
            assert_eq!(last_service_level, 100.0);
            assert!(evaluated < 100, "stops once the service level saturates, not at the bound");
            assert_eq!(last_agents, evaluated as u64, "one trial per agent from 1");
            assert_eq!(trials.len(), evaluated);
            assert_eq!(trials.first().unwrap().num_agents, 1);
        }
        other => panic!("expected ConvergenceFailure, got {other:?}"),
    }
}

#[test]
fn full_service_target_at_large_load_stays_small() {
    let err = search(500.0, 501, 1.0, StabilityPolicy::Reject)
        .run()
        .expect_err("100% service level is unreachable");
    match err {
        StaffingError::ConvergenceFailure {
            last_agents,
            last_service_level,
            max_agents,
            evaluated,
            trials,
            ..
        } => {
            assert_eq!(max_agents, 5_000_000);
            assert_eq!(last_service_level, 100.0);
            assert!(evaluated < 1_000, "evaluated {evaluated} agent counts");
            assert_eq!(last_agents, 500 + evaluated as u64);
            assert_eq!(trials.len(), FAILURE_TRIAL_TAIL.min(evaluated));
            assert_eq!(trials.last().unwrap().num_agents, last_agents);
            assert!(trials.windows(2).all(|w| w[1].num_agents == w[0].num_agents + 1));
        }
        other => panic!("expected ConvergenceFailure, got {other:?}"),
    }
}

#[test]
fn tight_limits_stop_the_search() {
    let limits = SearchLimits { max_agent_factor: 1.0, min_headroom: 2 };
    let err = StaffingSearch::new(WEEKEND_TRAFFIC, 6, targets(0.95), StabilityPolicy::Reject, limits)
        .unwrap()
        .run()
        .unwrap_err();
    match err {
        StaffingError::ConvergenceFailure { last_agents, last_service_level, max_agents, trials, .. } => {
            assert_eq!(max_agents, 8);
            assert_eq!(last_agents, 8);
            assert_eq!(trials.len(), 3);
            assert!(last_service_level < 95.0);
        }
        other => panic!("expected ConvergenceFailure, got {other:?}"),
    }
}

#[test]
fn step_walks_the_state_machine() {
    let mut s = search(WEEKEND_TRAFFIC, 8, 0.80, StabilityPolicy::Reject);
    assert_eq!(s.state(), SearchState::Searching);

    assert_eq!(s.step().unwrap(), SearchStep::Continue);
    assert_eq!(s.results().len(), 1);
    assert_eq!(s.current_agents(), 9);

    assert_eq!(s.step().unwrap(), SearchStep::SlaMet);
    assert_eq!(s.state(), SearchState::SlaMet);
    assert_eq!(s.results().len(), 2);

    // Terminal: further steps change nothing.
    assert_eq!(s.step().unwrap(), SearchStep::SlaMet);
    assert_eq!(s.results().len(), 2);
}

#[test]
fn infeasible_state_is_sticky() {
    let limits = SearchLimits { max_agent_factor: 1.0, min_headroom: 0 };
    let mut s = StaffingSearch::new(5.0, 6, targets(0.99), StabilityPolicy::Reject, limits).unwrap();
    assert_eq!(s.max_agents(), 6);
    assert_eq!(s.step().unwrap(), SearchStep::Continue);
    let first = s.step().unwrap_err();
    assert!(matches!(first, StaffingError::ConvergenceFailure { .. }));
    assert_eq!(s.state(), SearchState::Infeasible);

    // Later calls report the same context, not an emptied one.
    let again = s.step().unwrap_err();
    assert_eq!(again.to_string(), first.to_string());
    match again {
        StaffingError::ConvergenceFailure { last_agents, evaluated, trials, .. } => {
            assert_eq!(last_agents, 6);
            assert_eq!(evaluated, 1);
            assert_eq!(trials.len(), 1);
        }
        other => panic!("expected ConvergenceFailure, got {other:?}"),
    }
    assert_eq!(s.results().len(), 1);
}

#[test]
fn invalid_traffic_is_rejected_before_searching() {
    let err = StaffingSearch::new(f64::NAN, 5, targets(0.8), StabilityPolicy::Reject, SearchLimits::default())
        .err()
        .unwrap();
    assert!(matches!(err, StaffingError::InvalidArgument { parameter: "traffic_intensity", .. }));
}

#[test]
fn large_centre_converges_quickly() {
    // 400 Erlangs: the incremental terms keep each step O(1).
    let outcome = search(400.0, 401, 0.90, StabilityPolicy::Reject).run().unwrap();
    let accepted = outcome.accepted().unwrap();
    assert!(accepted.num_agents > 400 && accepted.num_agents < 460);
    assert!(accepted.service_level >= 90.0);
}
