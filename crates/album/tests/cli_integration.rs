//! CLI integration tests for the album command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Configuration is discovered, merged and printed
//! - Invalid inputs are rejected before the server binds
//!
//! Every test points `ALBUM_CONFIG_DIR` at a temporary directory so the
//! user's real configuration (and log directory) is never touched.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the album binary, isolated in `dir`.
fn album(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("album").unwrap();
    cmd.current_dir(dir.path())
        .env("ALBUM_CONFIG_DIR", dir.path().join("config"))
        .env_remove("ALBUM_PASSWORD");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    album(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("photo album"))
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    album(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("album"));
}

#[test]
fn test_start_help_lists_overrides() {
    let dir = TempDir::new().unwrap();
    album(&dir)
        .args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--upload-dir"))
        .stdout(predicate::str::contains("--password"))
        .stdout(predicate::str::contains("ALBUM_PASSWORD"));
}

#[test]
fn test_unknown_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    album(&dir).arg("serve").assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_shows_defaults() {
    let dir = TempDir::new().unwrap();
    album(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 80"))
        .stdout(predicate::str::contains("cookie_name = \"baophotos\""))
        .stdout(predicate::str::contains("max_idle_secs = 300"));
}

#[test]
fn test_config_merges_project_file_and_masks_password() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("album.toml"),
        r#"
[server]
port = 8081

[auth]
password = "hunter2"
"#,
    )
    .unwrap();

    album(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 8081"))
        .stdout(predicate::str::contains("hunter2").not())
        .stdout(predicate::str::contains("<redacted>"));
}

#[test]
fn test_config_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[session]\nmax_idle_secs = 42\n").unwrap();

    album(&dir)
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("max_idle_secs = 42"));
}

#[test]
fn test_config_which_lists_sources() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("album.toml"), "[server]\nport = 8081\n").unwrap();

    album(&dir)
        .args(["config", "which"])
        .assert()
        .success()
        .stdout(predicate::str::contains("album.toml"))
        .stdout(predicate::str::contains("1 config file(s) loaded."));
}

// ─────────────────────────────────────────────────────────────────────────────
// Start Validation Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_start_rejects_bad_port() {
    let dir = TempDir::new().unwrap();
    album(&dir)
        .args(["start", "--port", "not-a-port"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_start_rejects_bad_bind_address() {
    let dir = TempDir::new().unwrap();
    album(&dir)
        .args(["start", "--bind", "not-an-ip", "--port", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid bind address"));
}

#[test]
fn test_start_rejects_zero_idle() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("album.toml"), "[session]\nmax_idle_secs = 0\n").unwrap();

    album(&dir)
        .args(["start", "--port", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("session.max_idle_secs"));
}

#[test]
fn test_start_missing_config_file() {
    let dir = TempDir::new().unwrap();
    album(&dir)
        .args(["start", "--config", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.toml"));
}
