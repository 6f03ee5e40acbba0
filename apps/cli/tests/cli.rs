//! End-to-end tests for the `nebula-region` binary

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("nebula-region").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("NEBULA_REGION_CONFIG")
        .env_remove("NEBULA_REGION_POOL__BLOCK_SIZE");
    cmd
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("config")));
}

#[test]
fn run_reports_text_stats() {
    cmd()
        .args(["run", "--rounds", "2", "--small", "50", "--large", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rounds:        2"))
        .stdout(predicate::str::contains("cleanups run:  8"));
}

#[test]
fn run_emits_json_report() {
    let output = cmd()
        .args([
            "run",
            "--rounds",
            "3",
            "--small",
            "20",
            "--cleanups",
            "1",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rounds"], 3);
    assert_eq!(report["cleanups_run"], 3);
    assert_eq!(report["stats"]["resets"], 2);
}

#[test]
fn config_reads_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[pool]\nblock_size = 8192\nfail_threshold = 2").unwrap();

    cmd()
        .arg("--config")
        .arg(file.path())
        .args(["config", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"block_size\": 8192"))
        .stdout(predicate::str::contains("\"fail_threshold\": 2"));
}

#[test]
fn environment_overrides_defaults() {
    cmd()
        .env("NEBULA_REGION_POOL__BLOCK_SIZE", "2048")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("block_size            = 2048"));
}

#[test]
fn flag_overrides_environment() {
    cmd()
        .env("NEBULA_REGION_POOL__BLOCK_SIZE", "2048")
        .args(["run", "--block-size", "1024", "--rounds", "1", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"block_size\": 1024"));
}

#[test]
fn zero_block_size_is_rejected() {
    cmd()
        .args(["run", "--block-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Block size must be greater than 0"));
}

#[test]
fn missing_config_file_fails() {
    cmd()
        .args(["--config", "/no/such/region.toml", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}
