use std::path::Path;

use assert_cmd::Command;
use tempfile::tempdir;

fn parameters_path() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data/parameters.json")
        .to_str()
        .unwrap()
        .to_string()
}

#[test]
fn prints_a_summary_and_writes_reports() {
    let output_dir = tempdir().unwrap();
    let assert = Command::cargo_bin("contagion")
        .unwrap()
        .args([
            "--config",
            &parameters_path(),
            "--days",
            "4",
            "--random-seed",
            "3",
            "--output-dir",
            output_dir.path().to_str().unwrap(),
            "--prefix",
            "cli_",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.starts_with("day 4:"), "unexpected output: {stdout}");
    assert!(stdout.contains("infections="));

    let census = std::fs::read_to_string(output_dir.path().join("cli_census.csv")).unwrap();
    // Header plus one row per day.
    assert_eq!(census.lines().count(), 5);
    assert!(output_dir.path().join("cli_daily.csv").exists());
}

#[test]
fn unknown_disease_fails_the_run() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("bad.json");
    std::fs::write(&config, r#"{"initial_infections": {"measles": 3}}"#).unwrap();
    let assert = Command::cargo_bin("contagion")
        .unwrap()
        .args(["--config", config.to_str().unwrap(), "--days", "1"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("unknown disease kind"), "stderr: {stderr}");
}

#[test]
fn existing_reports_need_force_overwrite() {
    let output_dir = tempdir().unwrap();
    let args = [
        "--config".to_string(),
        parameters_path(),
        "--days".to_string(),
        "1".to_string(),
        "--output-dir".to_string(),
        output_dir.path().to_str().unwrap().to_string(),
    ];
    Command::cargo_bin("contagion")
        .unwrap()
        .args(&args)
        .assert()
        .success();
    Command::cargo_bin("contagion")
        .unwrap()
        .args(&args)
        .assert()
        .failure();
    Command::cargo_bin("contagion")
        .unwrap()
        .args(&args)
        .arg("--force-overwrite")
        .assert()
        .success();
}
