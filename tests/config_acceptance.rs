/// Acceptance tests for the config subcommand
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn wheelhouse() -> Command {
    Command::new(std::env!("CARGO_BIN_EXE_wheelhouse"))
}

#[test]
fn generate_emits_parseable_example() {
    let output = wheelhouse().args(["config", "generate"]).output().unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("[workspace]"));
    assert!(text.contains("[transfer]"));

    // The example must round-trip through the loader
    let parsed: Result<wheelhouse::WheelhouseConfig, _> = toml::from_str(&text);
    assert!(parsed.is_ok());
}

#[test]
fn validate_accepts_valid_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wheelhouse.toml");
    fs::write(
        &path,
        r#"
packages = ["pytest"]

[remote]
url = "https://cache.example.org"
"#,
    )
    .unwrap();

    wheelhouse()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"));
}

#[test]
fn validate_rejects_bad_remote_url() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wheelhouse.toml");
    fs::write(
        &path,
        r#"
[remote]
url = "gopher://cache.example.org"
"#,
    )
    .unwrap();

    wheelhouse()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("remote.url"));
}

#[test]
fn show_redacts_transfer_password() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wheelhouse.toml");
    fs::write(
        &path,
        r#"
[transfer]
host = "cache.example.org"
user = "ci"
password = "hunter2"
"#,
    )
    .unwrap();

    wheelhouse()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2").not())
        .stdout(predicate::str::contains("<redacted>"));
}

#[test]
fn show_prints_effective_toml() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wheelhouse.toml");
    fs::write(&path, "packages = [\"tox\"]").unwrap();

    wheelhouse()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("tox"))
        .stdout(predicate::str::contains("[workspace]"));
}
