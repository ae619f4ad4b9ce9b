//! CLI integration tests
//!
//! Tests the command-line interface using assert_cmd

mod common;

use predicates::prelude::*;
use tempfile::TempDir;

use common::coordinator_cmd;

// ─────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Thermal Coordinator"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("version"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_command() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("thermal-coordinator"))
        .stdout(predicate::str::contains("Build Information"))
        .stdout(predicate::str::contains("Git Hash"))
        .stdout(predicate::str::contains("Target"));
}

#[test]
fn test_short_version_flag() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("thermal-coordinator"));
}

// ─────────────────────────────────────────────────────────────────
// Config Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_default() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[coordinator]"))
        .stdout(predicate::str::contains("listen_addr = \"127.0.0.1:2000\""))
        .stdout(predicate::str::contains("[logging]"));
}

#[test]
fn test_config_show_reflects_env() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .args(["config", "show"])
        .env("THERMAL_LISTEN_ADDR", "0.0.0.0:4100")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.0.0.0:4100"));
}

#[test]
fn test_config_validate_default() {
    // Default config should always be valid
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_nonexistent_file() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .args(["config", "validate", "--config", "/nonexistent/path/config.toml"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_init_then_validate() {
    let sandbox = TempDir::new().unwrap();
    let path = sandbox.path().join("conf").join("coordinator.toml");
    let path = path.to_str().unwrap();

    coordinator_cmd(&sandbox)
        .args(["config", "init", "--path", path])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));

    coordinator_cmd(&sandbox)
        .args(["config", "validate", "--config", path])
        .assert()
        .success();

    // Second init without --force refuses to overwrite
    coordinator_cmd(&sandbox)
        .args(["config", "init", "--path", path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_file_in_working_directory_is_found() {
    let sandbox = TempDir::new().unwrap();
    std::fs::write(
        sandbox.path().join("thermal-coordinator.toml"),
        "[coordinator]\nlisten_addr = \"127.0.0.1:4321\"\n",
    )
    .unwrap();

    coordinator_cmd(&sandbox)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:4321"));
}

// ─────────────────────────────────────────────────────────────────
// Run Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_run_help() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INITIAL_TEMP"))
        .stdout(predicate::str::contains("--listen"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_run_requires_initial_temperature() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox).arg("run").assert().failure();
}

#[test]
fn test_run_rejects_non_numeric_temperature() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .args(["run", "abc"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("Invalid initial temperature"));
}

#[test]
fn test_run_rejects_infinite_temperature() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .args(["run", "inf"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("finite"));
}

#[test]
fn test_run_with_missing_config() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .args(["run", "40", "--config", "/nonexistent/config.toml"])
        .assert()
        .code(10);
}

#[test]
fn test_run_with_bad_listen_address() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .args(["run", "40", "--listen", "not-an-address"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("not a socket address"));
}

#[test]
fn test_run_listen_address_in_use() {
    let sandbox = TempDir::new().unwrap();
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = occupied.local_addr().unwrap().to_string();

    coordinator_cmd(&sandbox)
        .args(["run", "40", "--listen", &addr])
        .assert()
        .code(30)
        .stderr(predicate::str::contains("Failed to listen"));
}

// ─────────────────────────────────────────────────────────────────
// Verbosity Flag Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_verbose_flag() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox).args(["-vv", "version"]).assert().success();
}

#[test]
fn test_quiet_flag() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox).args(["--quiet", "version"]).assert().success();
}

// ─────────────────────────────────────────────────────────────────
// Error Handling Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_command() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox)
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_subcommand() {
    let sandbox = TempDir::new().unwrap();
    coordinator_cmd(&sandbox).assert().failure();
}
