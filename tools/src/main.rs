//! staffing-runner: headless staffing calculator.
//!
//! Usage:
//!   staffing-runner --config data/scenarios/weekend_vacation.json
//!   staffing-runner --config scenario.json --vacation-prob 0.5 --json
//!   staffing-runner --builtin --sweep 0,0.25,0.5,0.75,1

use anyhow::Result;
use staffing_core::{
    config::ScenarioConfig,
    report::StaffingReport,
    scenario::{StaffingPlan, SweepPoint},
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let json = args.iter().any(|a| a == "--json");
    let builtin = args.iter().any(|a| a == "--builtin");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str())
        .unwrap_or("./data/scenarios/weekend_vacation.json");

    let mut config = if builtin {
        ScenarioConfig::default_test()
    } else {
        ScenarioConfig::load(config_path)?
    };
    log::info!("scenario loaded from {}", if builtin { "builtin defaults" } else { config_path });

    if let Some(p) = parse_arg::<f64>(&args, "--vacation-prob")? {
        config.scenario.vacation_probability = p;
    }
    if let Some(list) = args.windows(2).find(|w| w[0] == "--sweep").map(|w| w[1].as_str()) {
        config.sweep = parse_list(list)?;
    }
    config.validate()?;

    if !config.sweep.is_empty() {
        let points = config
            .scenario
            .sweep_vacation_probabilities(&config.sweep, &config.search);
        if json {
            print_sweep_json(&config, &points)?;
        } else {
            print_sweep(&points);
        }
        return Ok(());
    }

    let plan = config.scenario.run(&config.search)?;
    if json {
        let report = StaffingReport::new(&config.scenario, &plan);
        println!("{}", report.to_json()?);
    } else {
        println!("Erlang-C staffing with working vacations");
        println!("  source:    {}", if builtin { "builtin" } else { config_path });
        println!();
        print_summary(&plan);
    }

    Ok(())
}

fn print_summary(plan: &StaffingPlan) {
    let b = &plan.blended;
    println!("=== TRAFFIC ===");
    println!("  normal:         {:.4} Erlangs", b.normal_intensity);
    println!("  vacation:       {:.4} Erlangs", b.vacation_intensity);
    println!("  vacation prob:  {:.2}", b.vacation_probability);
    println!("  blended:        {:.4} Erlangs", b.traffic_intensity);
    println!("  start agents:   {}", b.starting_agents);
    println!();
    println!("=== TRIALS ===");
    println!("  agents |  P(wait) |    SLA % |   ASA s | immed % |  occ % | shrunk");
    for t in plan.trials() {
        println!(
            "  {:>6} | {:>8.4} | {:>8.2} | {:>7.1} | {:>7.2} | {:>6.2} | {:>6}",
            t.num_agents,
            t.waiting_probability,
            t.service_level,
            t.average_speed_of_answer,
            t.immediate_answer_percent,
            t.max_occupancy,
            t.shrunk_agent_count
        );
    }
    if let Some(a) = plan.accepted() {
        println!();
        println!(
            "  required: {} agents ({} scheduled after shrinkage)",
            a.num_agents, a.shrunk_agent_count
        );
    }
}

fn print_sweep(points: &[SweepPoint]) {
    println!("=== VACATION PROBABILITY SWEEP ===");
    for point in points {
        match &point.result {
            Ok(plan) => match plan.accepted() {
                Some(a) => println!(
                    "  p={:.2} | traffic {:.4} | {} agents | SLA {:.2}% | {} scheduled",
                    point.vacation_probability,
                    plan.blended.traffic_intensity,
                    a.num_agents,
                    a.service_level,
                    a.shrunk_agent_count
                ),
                None => println!("  p={:.2} | no trials", point.vacation_probability),
            },
            Err(e) => println!("  p={:.2} | failed: {e}", point.vacation_probability),
        }
    }
}

fn print_sweep_json(config: &ScenarioConfig, points: &[SweepPoint]) -> Result<()> {
    let mut reports = Vec::with_capacity(points.len());
    for point in points {
        let scenario = config.scenario.with_vacation_probability(point.vacation_probability);
        match &point.result {
            Ok(plan) => reports.push(serde_json::to_value(StaffingReport::new(&scenario, plan))?),
            Err(e) => reports.push(serde_json::json!({
                "vacation_probability": point.vacation_probability,
                "error": e.to_string(),
            })),
        }
    }
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn parse_arg<T>(args: &[String], flag: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| {
            w[1].parse()
                .map_err(|e| anyhow::anyhow!("Bad {flag} value '{}': {e}", w[1]))
        })
        .transpose()
}

fn parse_list(list: &str) -> Result<Vec<f64>> {
    list.split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|e| anyhow::anyhow!("Bad sweep value '{s}': {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn vacation_prob_is_parsed() {
        let a = args(&["staffing-runner", "--vacation-prob", "0.5"]);
        assert_eq!(parse_arg::<f64>(&a, "--vacation-prob").unwrap(), Some(0.5));
    }

    #[test]
    fn absent_flag_is_none() {
        let a = args(&["staffing-runner", "--json"]);
        assert_eq!(parse_arg::<f64>(&a, "--vacation-prob").unwrap(), None);
    }

    #[test]
    fn malformed_vacation_prob_is_an_error() {
        let a = args(&["staffing-runner", "--vacation-prob", "0,5"]);
        let err = parse_arg::<f64>(&a, "--vacation-prob").unwrap_err();
        assert!(err.to_string().contains("Bad --vacation-prob value '0,5'"), "got {err}");
    }

    #[test]
    fn malformed_sweep_is_an_error() {
        assert!(parse_list("0.25,half").is_err());
        assert_eq!(parse_list("0, 0.5").unwrap(), vec![0.0, 0.5]);
    }
}
