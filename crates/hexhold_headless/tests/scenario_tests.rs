//! Scenario files on disk, end to end.

use std::io::Write;

use hexhold_core::prelude::{NavigationMode, ResourceKind};
use hexhold_headless::{run_scenario, Scenario, ScenarioError};
use hexhold_test_utils::determinism::find_first_divergence;

fn write_scenario(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn wood(report: &hexhold_headless::RunReport) -> u64 {
    report
        .snapshot
        .resources
        .iter()
        .find(|(k, _)| *k == ResourceKind::Wood)
        .map_or(0, |(_, n)| *n)
}

#[test]
fn test_load_and_run_from_disk() {
    let file = write_scenario(
        r#"(
            name: "disk",
            structures: [
                (template: Starter, resources: [((q: 3, r: 3), Wood, 20)]),
            ],
            units: [(task: Some(Gather(Wood)))],
            ticks: 200,
        )"#,
    );

    let scenario = Scenario::load(file.path()).unwrap();
    let report = run_scenario(&scenario, None).unwrap();

    assert_eq!(report.ticks, 200);
    assert_eq!(wood(&report), 20);
    assert_eq!(report.events.slots_depleted, 1);
    assert_eq!(report.events.arrivals, 1);
}

#[test]
fn test_saved_demo_reloads_identically() {
    let demo = Scenario::starter_demo();
    let file = write_scenario(&demo.to_ron_string().unwrap());

    let loaded = Scenario::load(file.path()).unwrap();
    assert_eq!(loaded, demo);

    let a = run_scenario(&demo, Some(500)).unwrap();
    let b = run_scenario(&loaded, Some(500)).unwrap();
    assert_eq!(a.state_hash, b.state_hash);
}

#[test]
fn test_external_navigation_scenario_stalls() {
    let mut scenario = Scenario::starter_demo();
    scenario.config.navigation = NavigationMode::External;

    let report = run_scenario(&scenario, Some(500)).unwrap();

    assert_eq!(report.events.arrivals, 0);
    assert_eq!(report.events.resources_credited, 0);
}

#[test]
fn test_demo_never_diverges() {
    let demo = Scenario::starter_demo();
    let divergence = find_first_divergence(|| demo.build_simulation().unwrap(), 400);
    assert_eq!(divergence, None);
}

#[test]
fn test_malformed_file() {
    let file = write_scenario("(name: \"broken\", structures: [(template: Castle)])");
    assert!(matches!(
        Scenario::load(file.path()),
        Err(ScenarioError::ParseError(_))
    ));
}
