// crates/sentinel-cli/tests/config_command.rs
// ============================================================================
// Module: CLI Config Command Tests
// Description: Integration tests for the `config` subcommand group against the compiled binary.
// Purpose: Ensure `config init`/`config schema` stay valid TOML/JSON and `config validate`
//   fails closed on bad input.
// Dependencies: sentinel-cli binary
// ============================================================================

//! ## Overview
//! Exercises `sentinel config init`, `sentinel config schema`, and
//! `sentinel config validate` as a caller would: by spawning the compiled
//! binary, not by calling internal functions.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn sentinel_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sentinel"))
}

fn temp_file(label: &str, extension: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock drift").as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("sentinel-cli-{label}-{nanos}.{extension}"));
    path
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_file(path);
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn config_init_prints_parseable_toml() {
    let output = Command::new(sentinel_bin())
        .args(["config", "init"])
        .output()
        .expect("run sentinel config init");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    let parsed: toml::Value = toml::from_str(&stdout).expect("config init output parses as toml");
    assert!(parsed.get("alerting").is_some());
}

#[test]
fn config_schema_prints_parseable_json() {
    let output = Command::new(sentinel_bin())
        .args(["config", "schema"])
        .output()
        .expect("run sentinel config schema");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("schema output parses as json");
    assert!(parsed.is_object());
}

#[test]
fn config_validate_accepts_the_canonical_example() {
    let init = Command::new(sentinel_bin())
        .args(["config", "init"])
        .output()
        .expect("run sentinel config init");
    assert!(init.status.success());

    let config_path = temp_file("validate-ok", "toml");
    fs::write(&config_path, &init.stdout).expect("write canonical config");

    let validate = Command::new(sentinel_bin())
        .args(["config", "validate", "--config"])
        .arg(&config_path)
        .output()
        .expect("run sentinel config validate");
    assert!(validate.status.success());

    cleanup(&config_path);
}

#[test]
fn config_validate_rejects_malformed_toml() {
    let config_path = temp_file("validate-bad", "toml");
    fs::write(&config_path, b"not = [valid").expect("write malformed config");

    let validate = Command::new(sentinel_bin())
        .args(["config", "validate", "--config"])
        .arg(&config_path)
        .output()
        .expect("run sentinel config validate");
    assert!(!validate.status.success());

    cleanup(&config_path);
}
