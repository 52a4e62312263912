use cellindex::core::domain::CellCount;
use cellindex::interface::input::{self, InputSpec};
use cellindex::interface::output::{self, RunReport};
use cellindex::solvers::build_neighbor_map;
use chrono::Local;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

mod common;

fn scratch_file(ext: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("cellindex-{}.{}", Uuid::new_v4(), ext));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_text_and_json_inputs_agree() {
    let text = scratch_file("txt", "2\n10\n4\n1.0\ntrue\n0.5\n0.25\n");
    let json = scratch_file(
        "json",
        r#"{"side_length":10.0,"cell_count":{"fixed":4},"interaction_radius":1.0,"periodic":true,"radii":[0.5,0.25]}"#,
    );

    let a = InputSpec::from_path(&text).unwrap();
    let b = InputSpec::from_path(&json).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.cell_count, CellCount::Fixed(4));

    fs::remove_file(text).ok();
    fs::remove_file(json).ok();
}

#[test]
fn test_missing_input_file_is_reported() {
    let path = std::env::temp_dir().join(format!("cellindex-missing-{}.txt", Uuid::new_v4()));
    let err = InputSpec::from_path(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to read input file"));
}

#[test]
fn test_oversized_cell_count_fails_before_placement_matters() {
    let spec: InputSpec = "2\n10\n11\n1.0\nfalse\n0.1\n0.1\n".parse().unwrap();
    let plane = input::place_randomly(&spec, &mut input::seeded_rng(Some(1))).unwrap();
    let config = spec.grid_config().unwrap();
    assert!(cellindex::CellIndexMethod::new(std::sync::Arc::new(plane), config).is_err());
}

#[test]
fn test_end_to_end_text_output() {
    let spec: InputSpec = "3\n10\n-\n1.0\nfalse\n0.2\n0.2\n0.2\n".parse().unwrap();
    let plane = input::place_randomly(&spec, &mut input::seeded_rng(Some(5))).unwrap();
    let map = build_neighbor_map(&plane, spec.interaction_radius, spec.cell_count, spec.periodic).unwrap();

    let mut buf = Vec::new();
    output::write_text(&mut buf, &plane, &map).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    for (i, line) in lines.iter().enumerate() {
        assert!(line.starts_with(&format!("p_{} 0.200000 ", i)), "unexpected line: {}", line);
        assert!(line.ends_with('"'), "unexpected line: {}", line);
        assert_eq!(line.matches('"').count(), 2, "unexpected line: {}", line);
    }
}

#[test]
fn test_json_report_round_trips_through_serde_json() {
    let plane = common::points(10.0, &[(1.0, 1.0), (1.0, 2.0)]);
    let map = build_neighbor_map(&plane, 1.0, CellCount::Fixed(4), false).unwrap();
    let now = Local::now();
    let report = RunReport {
        started_at: now,
        finished_at: now,
        elapsed_ms: 0.5,
        method: "Cell Index Method".to_string(),
        side_length: plane.side_length(),
        cell_count: 4,
        config: cellindex::GridConfig::new(CellCount::Fixed(4), 1.0, false).unwrap(),
        validated: false,
        stats: cellindex::analysis::validation::NeighborStats::from_map(&map),
        particles: RunReport::particle_reports(&plane, &map),
    };

    let mut buf = Vec::new();
    output::write_json(&mut buf, &report).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(value["stats"]["pairs"], 1);
    assert_eq!(value["particles"][0]["neighbors"][0], "p_1");
    assert_eq!(value["config"]["cell_count"]["fixed"], 4);
}
