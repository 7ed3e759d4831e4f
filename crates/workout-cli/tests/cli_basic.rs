//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with an isolated HOME and verify outputs.

use std::path::Path;
use std::process::Command;

const RECORDS: &str = r#"[
    {"start": "2023-01-03T07:00:00Z", "end": "2023-01-03T07:30:00Z", "activity_type": 37,
     "energy_burned_kcal": 200.0, "distance_m": 4000.0},
    {"start": "2023-01-03T06:00:00Z", "end": "2023-01-03T06:20:00Z", "activity_type": "swimming",
     "energy_burned_kcal": 150.0},
    {"start": "2024-02-01T07:00:00Z", "end": "2024-02-01T08:00:00Z", "activity_type": "cycling",
     "energy_burned_kcal": 500.0, "distance_m": 20000.0}
]"#;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_workout-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("WORKOUT_EXPORTER_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn fixture() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("records.json");
    std::fs::write(&input, RECORDS).unwrap();
    let input = input.to_string_lossy().into_owned();
    (dir, input)
}

#[test]
fn test_classify() {
    let (dir, _) = fixture();
    let (stdout, _, code) = run_cli(dir.path(), &["classify", "37"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "running");

    let (stdout, _, _) = run_cli(dir.path(), &["classify", "9999"]);
    assert_eq!(stdout.trim(), "other");
}

#[test]
fn test_export_stdout() {
    let (dir, input) = fixture();
    let (stdout, stderr, code) =
        run_cli(dir.path(), &["export", "--input", &input, "--stdout", "--utc-offset", "+00:00"]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("start time,end time"));
    assert!(lines[1].starts_with("2024-02-01 07:00:00"));
    assert!(lines[3].ends_with("swimming,150,0,0"));
}

#[test]
fn test_export_writes_file() {
    let (dir, input) = fixture();
    let out_dir = dir.path().join("out");
    let out = out_dir.to_string_lossy().into_owned();
    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &["export", "-i", &input, "--out-dir", &out, "--utc-offset", "Z"],
    );
    assert_eq!(code, 0, "stderr: {stderr}");

    let path = Path::new(stdout.trim());
    let name = path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("workout_export_") && name.ends_with(".csv"));
    assert_eq!(std::fs::read_to_string(path).unwrap().lines().count(), 4);
}

#[test]
fn test_export_from_health_xml() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("export.xml");
    std::fs::write(
        &input,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<HealthData locale="en_US">
 <Workout workoutActivityType="HKWorkoutActivityTypeRunning" duration="30" durationUnit="min" totalDistance="4" totalDistanceUnit="km" totalEnergyBurned="200" totalEnergyBurnedUnit="kcal" startDate="2023-01-03 15:00:00 +0800" endDate="2023-01-03 15:30:00 +0800"/>
 <Workout workoutActivityType="HKWorkoutActivityTypeSwimming" duration="20" durationUnit="min" startDate="2023-01-03 14:00:00 +0800" endDate="2023-01-03 14:20:00 +0800"/>
</HealthData>
"#,
    )
    .unwrap();
    let input = input.to_string_lossy().into_owned();

    let (stdout, stderr, code) =
        run_cli(dir.path(), &["export", "-i", &input, "--stdout", "--utc-offset", "+08:00"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "2023-01-03 15:00:00,2023-01-03 15:30:00,30.0,running,200,4000,0");
    assert_eq!(lines[2], "2023-01-03 14:00:00,2023-01-03 14:20:00,20.0,swimming,0,0,0");

    let broken = dir.path().join("broken.xml");
    std::fs::write(&broken, "<HealthData><ExportDate></Health>").unwrap();
    let broken = broken.to_string_lossy().into_owned();
    let (_, stderr, code) = run_cli(dir.path(), &["export", "-i", &broken, "--stdout"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
}

#[test]
fn test_export_range_with_no_matches_fails() {
    let (dir, input) = fixture();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &[
            "export", "-i", &input, "--stdout", "--from", "2020-01-01", "--to", "2020-12-31",
            "--utc-offset", "+00:00",
        ],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("No workout records found"));
}

#[test]
fn test_export_inverted_range_fails() {
    let (dir, input) = fixture();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["export", "-i", &input, "--stdout", "--from", "2024-01-02", "--to", "2024-01-01"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid date range"));
}

#[test]
fn test_missing_input_fails() {
    let (dir, _) = fixture();
    let (_, stderr, code) = run_cli(dir.path(), &["export", "-i", "/no/such/file.json", "--stdout"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unavailable"));
}

#[test]
fn test_heatmap_json() {
    let (dir, input) = fixture();
    let (stdout, stderr, code) =
        run_cli(dir.path(), &["heatmap", "-i", &input, "--json", "--utc-offset", "+00:00"]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let years = report["years"].as_array().unwrap();
    assert_eq!(years.len(), 2);
    assert_eq!(years[0]["summary"]["year"], 2024);
    assert_eq!(years[0]["summary"]["total_days"], 366);
    assert_eq!(years[1]["summary"]["recorded_days"], 1);
    assert_eq!(report["days"]["2023"]["1672704000"], 2);
}

#[test]
fn test_heatmap_html_file() {
    let (dir, input) = fixture();
    let out = dir.path().join("heatmap.html");
    let out_arg = out.to_string_lossy().into_owned();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["heatmap", "-i", &input, "--orientation", "landscape", "-o", &out_arg, "--utc-offset", "+00:00"],
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    let html = std::fs::read_to_string(out).unwrap();
    assert!(html.contains("week-column"));
    assert!(html.contains("2023 (1/365 days, 0.3%)"));
}

#[test]
fn test_config_set_and_get() {
    let (dir, _) = fixture();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "heatmap.levels.running", "1"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "heatmap.levels.running"]);
    assert_eq!(stdout.trim(), "1");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "heatmap.fallback_level", "7"]);
    assert_eq!(code, 1);

    let (stdout, _, _) = run_cli(dir.path(), &["config", "path"]);
    assert!(stdout.trim().ends_with("workout-exporter/config.toml"));
}
