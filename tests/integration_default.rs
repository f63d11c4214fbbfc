//! Integration tests for full engine runs.

mod common;

use std::path::Path;

use common::EPS;
use umbrella_grid::config::ScenarioConfig;
use umbrella_grid::economics::EconomicsReport;
use umbrella_grid::error::EnergyError;
use umbrella_grid::scenario::Scenario;
use umbrella_grid::sim::engine::{Engine, RunReport};

fn run_preset(name: &str) -> RunReport {
    let cfg = ScenarioConfig::from_preset(name).unwrap();
    Scenario::build(&cfg).unwrap().engine().run().unwrap()
}

#[test]
fn mixed_group_balances_then_redistributes() {
    let report = Engine::new(common::mixed_group()).run().unwrap();
    let s = &report.summary;

    // surplus 7 + 5, deficit 5 + 8.5
    assert!((s.total_surplus_kwh - 12.0).abs() < EPS);
    assert!((s.total_deficit_kwh - 13.5).abs() < EPS);
    assert!((s.transferred_kwh - 12.0).abs() < EPS);
    assert!((s.unserved_deficit_kwh - 1.5).abs() < EPS);
    assert!(s.curtailed_surplus_kwh.abs() < EPS);

    let even = &report.nodes[2];
    assert_eq!(even.surplus, 0.0);
    assert_eq!(even.deficit, 0.0);
    assert_eq!(even.battery_soc_end, 1.0);
}

#[test]
fn every_node_keeps_one_sided_residual() {
    let report = Engine::new(common::mixed_group()).run().unwrap();
    for n in &report.nodes {
        assert!(n.residual_surplus >= 0.0 && n.residual_deficit >= 0.0);
        assert!(
            n.residual_surplus == 0.0 || n.residual_deficit == 0.0,
            "{} has both residuals",
            n.id
        );
        assert!(n.battery_soc_end >= 0.0 && n.battery_soc_end <= n.battery_capacity);
    }
}

#[test]
fn given_equals_received_across_the_group() {
    let report = Engine::new(common::mixed_group()).run().unwrap();
    let given: f64 = report.nodes.iter().map(|n| n.given).sum();
    let received: f64 = report.nodes.iter().map(|n| n.received).sum();
    let flows: f64 = report.flows().values().sum();
    assert!((given - received).abs() < 1e-6);
    assert!((flows - received).abs() < 1e-6);
}

#[test]
fn runs_are_deterministic() {
    for name in ScenarioConfig::PRESETS {
        assert_eq!(run_preset(name), run_preset(name), "preset {name}");
    }
}

#[test]
fn different_seed_changes_only_ev_demand() {
    let mut cfg = ScenarioConfig::ev_rush();
    let a = Scenario::build(&cfg).unwrap();
    cfg.simulation.seed = 12345;
    let b = Scenario::build(&cfg).unwrap();
    for (pa, pb) in a.profiles.iter().zip(&b.profiles) {
        assert_eq!(pa.node.generation, pb.node.generation);
        let (sa, sb) = (pa.split().unwrap(), pb.split().unwrap());
        assert_eq!(sa.self_consumption_kwh, sb.self_consumption_kwh);
    }
}

#[test]
fn presets_have_distinct_outcomes() {
    let baseline = run_preset("baseline").summary;
    let sunny = run_preset("sunny_plaza").summary;
    let rush = run_preset("ev_rush").summary;

    assert!(sunny.curtailed_surplus_kwh > 0.0);
    assert!(sunny.unserved_deficit_kwh.abs() < EPS);
    assert!(rush.unserved_deficit_kwh > 0.0);
    assert!(sunny.self_sufficiency_pct > baseline.self_sufficiency_pct);
    assert!(baseline.self_sufficiency_pct > rush.self_sufficiency_pct);
}

#[test]
fn scenario_files_match_presets() {
    for name in ScenarioConfig::PRESETS {
        let path = format!("scenarios/{name}.toml");
        let from_file = ScenarioConfig::from_toml_file(Path::new(&path)).unwrap();
        assert!(from_file.validate().is_empty(), "{path} should be valid");
        let from_preset = ScenarioConfig::from_preset(name).unwrap();
        assert_eq!(
            Scenario::build(&from_file).unwrap(),
            Scenario::build(&from_preset).unwrap(),
            "{path} should describe the {name} preset"
        );
    }
}

#[test]
fn carry_forward_chains_two_days() {
    let nodes = common::mixed_group();
    let day1 = Engine::new(nodes.clone()).run().unwrap();
    let day2_nodes = day1.carry_forward(&nodes);
    let day2 = Engine::new(day2_nodes).run().unwrap();
    for (d1, d2) in day1.nodes.iter().zip(&day2.nodes) {
        assert_eq!(d2.battery_soc_start, d1.battery_soc_end);
    }
}

#[test]
fn invalid_node_aborts_run() {
    let mut nodes = common::mixed_group();
    nodes[3].battery.charge_efficiency = 0.0;
    let err = Engine::new(nodes).run().unwrap_err();
    assert!(matches!(&err, EnergyError::Node { id, .. } if id == "bright"));
    assert_eq!(err.field(), Some("charge_efficiency"));
}

#[test]
fn economics_from_baseline_run() {
    let cfg = ScenarioConfig::baseline();
    let scenario = Scenario::build(&cfg).unwrap();
    let report = scenario.engine().run().unwrap();
    let econ =
        EconomicsReport::from_daily_generation(report.summary.total_generation_kwh, &scenario.economics);
    assert!((econ.annual_generation_kwh - report.summary.total_generation_kwh * 365.0).abs() < 1e-6);
    assert!(econ.annual_loan_payment > 700.0);
    assert!(econ.payback_years.is_some());
}
