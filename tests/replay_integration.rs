//! Integration tests for the monlog binary
//!
//! These tests run the built binary against temporary config and event files:
//! - Replaying events from a file and from stdin
//! - Level overrides from config and the command line
//! - Printing the resolved level table
//! - Failing on an unknown logger backend

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Helper to get the monlog binary path
fn monlog_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_monlog"))
}

/// Helper to write a config file into the temp dir
fn write_config(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("monlog.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

/// Helper to run monlog with a config file
fn run_monlog(config: &Path, args: &[&str]) -> Output {
    Command::new(monlog_binary())
        .env_remove("RUST_LOG")
        .env("CLICOLOR", "0")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("Failed to execute monlog")
}

const EVENTS: &str = r#"{"event":"response","method":"get","path":"/health","statusCode":200,"responseTime":4}
{"event":"ping"}
{"event":"log","tags":["info"],"data":"server started"}
{"event":"ops","proc":{"uptime":10,"mem":{"rss":10485760}},"os":{"load":[0.5]}}
"#;

#[test]
fn test_replay_file_forwards_events() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "log_level: info\ncapture_errors: false\n");
    let events = temp.path().join("events.jsonl");
    fs::write(&events, EVENTS).unwrap();

    let output = run_monlog(&config, &["replay", events.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stdout.contains("4 lines"), "stdout: {}", stdout);
    assert!(stdout.contains("3 forwarded"));
    assert!(stdout.contains("1 ignored"));
    assert!(stderr.contains("GET /health 200 (4ms)"));
    assert!(stderr.contains("server started"));
    // ops is logged at debug, below the configured filter
    assert!(!stderr.contains("memory: 10Mb"));
}

#[test]
fn test_replay_level_override_from_cli() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "log_level: info\ncapture_errors: false\n");
    let events = temp.path().join("events.jsonl");
    fs::write(&events, EVENTS).unwrap();

    let output = run_monlog(&config, &["replay", events.to_str().unwrap(), "--level", "ops=warn"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stderr.contains("memory: 10Mb, uptime (seconds): 10, load: [0.5]"));
}

#[test]
fn test_replay_from_stdin() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "capture_errors: false\n");

    let mut child = Command::new(monlog_binary())
        .env_remove("RUST_LOG")
        .env("CLICOLOR", "0")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(&config)
        .arg("replay")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn monlog");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"{\"event\":\"log\",\"data\":\"from stdin\"}\nnot json\n")
        .unwrap();

    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stdout.contains("1 forwarded"));
    assert!(stdout.contains("1 malformed"));
    assert!(stderr.contains("from stdin"));
}

#[test]
fn test_replay_rejected_level_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "capture_errors: false\nlevels:\n  log: loud\n");
    let events = temp.path().join("events.jsonl");
    fs::write(&events, EVENTS).unwrap();

    let output = run_monlog(&config, &["replay", events.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("unknown log level: loud"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_logger_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "logger: winston\n");
    let events = temp.path().join("events.jsonl");
    fs::write(&events, EVENTS).unwrap();

    let output = run_monlog(&config, &["replay", events.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("invalid logger"), "stderr: {}", stderr);
}

#[test]
fn test_levels_json_output() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "levels:\n  ops: warn\n");

    let output = run_monlog(&config, &["levels", "--format", "json"]);
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0]["event"], "ops");
    assert_eq!(entries[0]["level"], "warn");
    assert_eq!(entries[0]["overridden"], true);
    assert_eq!(entries[1]["level"], "info");
}

#[test]
fn test_capture_errors_routes_reports_to_logger() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "capture_errors: true\n");
    let events = temp.path().join("events.jsonl");
    fs::write(&events, "{\"event\":\"log\",\"data\":\"ok\"}\nnot json\n").unwrap();

    let output = run_monlog(&config, &["replay", events.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stderr: {}", stderr);
    let report = stderr
        .lines()
        .find(|line| line.contains("Skipping malformed event on line 2:"))
        .expect("malformed line not reported");
    // Went through the logger, not straight to stderr
    assert!(report.contains("ERROR"), "report: {}", report);
}
