//! Integration tests for the CLI interface

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn forge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("protocol-forge").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("PROTOCOL_FORGE_LOG_LEVEL")
        .env_remove("PROTOCOL_FORGE_ENDPOINT")
        .env_remove("PROTOCOL_FORGE_TIMEOUT_SECS");
    cmd
}

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    forge(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_generate_offline_markdown() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("exp.json"),
        r#"{"title": "Seed Germination", "purpose": "Compare light regimes"}"#,
    )
    .unwrap();

    forge(&dir)
        .args(["generate", "--input", "exp.json", "--offline"])
        .args(["--date", "2024-06-01", "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Seed Germination"))
        .stdout(predicate::str::contains("_Date: 2024-06-01_"))
        .stdout(predicate::str::contains("## Materials and Equipment"));
}

#[test]
fn test_generate_from_stdin_json() {
    let dir = TempDir::new().unwrap();
    forge(&dir)
        .args(["generate", "--input", "-", "--offline"])
        .write_stdin(r#"{"title": "Buffer Stability"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"aiGenerated\": false"));
}

#[test]
fn test_generate_invalid_descriptor_exit_code() {
    let dir = TempDir::new().unwrap();
    forge(&dir)
        .args(["generate", "--input", "-", "--offline"])
        .write_stdin(r#"{"title": ""}"#)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("title"));
}

#[test]
fn test_parse_numbered_text() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("response.txt"),
        "1. Materials\nGloves\n\n2. Steps\nMix reagents\n",
    )
    .unwrap();

    forge(&dir)
        .args(["parse", "--input", "response.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"1_materials\""))
        .stdout(predicate::str::contains("\"2_steps\""));
}

#[test]
fn test_missing_config_file_exit_code() {
    let dir = TempDir::new().unwrap();
    forge(&dir)
        .args(["--config", "absent.toml", "parse", "--input", "-"])
        .write_stdin("text")
        .assert()
        .code(2);
}

#[test]
fn test_invalid_command() {
    let dir = TempDir::new().unwrap();
    forge(&dir)
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
