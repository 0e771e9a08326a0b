use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    let mut cmd = cargo_bin_cmd!("techdigest");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("cutoff_date"));
    assert!(content.contains("[sources]"));

    // The example must itself be valid TOML.
    let parsed: toml::Value = content.parse().expect("valid toml");
    assert_eq!(
        parsed["report"]["key"].as_str(),
        Some("index.html")
    );
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "# existing").expect("seed file");

    let mut cmd = cargo_bin_cmd!("techdigest");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn sources_lists_every_configured_origin() {
    let mut cmd = cargo_bin_cmd!("techdigest");
    cmd.arg("sources")
        .assert()
        .success()
        .stdout(predicate::str::contains("토스"))
        .stdout(predicate::str::contains("네이버 D2"))
        .stdout(predicate::str::contains("당근마켓"))
        .stdout(predicate::str::contains("단민"));
}

#[test]
fn sources_json_is_machine_readable() {
    let mut cmd = cargo_bin_cmd!("techdigest");
    let output = cmd
        .args(["sources", "--json"])
        .output()
        .expect("run sources");

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let descriptors = value.as_array().expect("array");
    assert_eq!(descriptors.len(), 4);
    assert!(descriptors.iter().all(|d| d.get("name").is_some() && d.get("url").is_some()));
}

#[test]
fn sources_respects_disable_flags() {
    let mut cmd = cargo_bin_cmd!("techdigest");
    let output = cmd
        .env("TECHDIGEST__SOURCES__TOSS", "false")
        .env("TECHDIGEST__SOURCES__DANMIN", "false")
        .args(["sources", "--json"])
        .output()
        .expect("run sources");

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value.as_array().expect("array").len(), 2);
}

#[test]
fn run_fails_when_every_source_is_disabled() {
    let mut cmd = cargo_bin_cmd!("techdigest");
    cmd.env("TECHDIGEST__SOURCES__TOSS", "false")
        .env("TECHDIGEST__SOURCES__DAANGN", "false")
        .env("TECHDIGEST__SOURCES__NAVER", "false")
        .env("TECHDIGEST__SOURCES__DANMIN", "false")
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sources enabled"));
}

#[test]
fn run_rejects_a_malformed_cutoff_date() {
    let mut cmd = cargo_bin_cmd!("techdigest");
    cmd.args(["run", "--cutoff", "03/01/2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid cutoff date"));
}

#[test]
fn missing_config_file_is_an_error() {
    let mut cmd = cargo_bin_cmd!("techdigest");
    cmd.args(["--config", "/nonexistent/config.toml", "sources"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
