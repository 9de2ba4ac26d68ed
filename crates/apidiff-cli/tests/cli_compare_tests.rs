//! CLI compare integration tests
//!
//! These tests drive the built binary against fixture files and check the
//! report and exit code contract.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const SOURCE_YAML: &str = r##"
swagger: "2.0"
info:
  title: Pets
  version: "1.0"
basePath: /v1
paths:
  /pets/{id}:
    get:
      responses:
        "200":
          description: ok
"##;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_apidiff"))
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

#[test]
fn test_identical_documents_exit_zero() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.yaml", SOURCE_YAML);
    let b = write(&dir, "b.yaml", SOURCE_YAML);

    let output = run(&["compare", a.to_str().unwrap(), b.to_str().unwrap()]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No differences detected"));
}

#[test]
fn test_breaking_change_exits_one_with_json_report() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.yaml", SOURCE_YAML);
    let b = write(
        &dir,
        "b.json",
        r#"{
            "swagger": "2.0",
            "info": {"title": "Pets", "version": "1.0"},
            "paths": {"/pets/{petId}": {"get": {"responses": {"200": {"description": "ok"}}}}}
        }"#,
    );

    let output = run(&[
        "compare",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--output",
        "json",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["breaking_differences_found"], true);
    let breaking = report["breaking_differences"].as_array().unwrap();
    assert_eq!(breaking.len(), 1);
    assert_eq!(breaking[0]["code"], "basePath.remove");
    assert_eq!(breaking[0]["source_details"]["location"], "basePath");
    assert!(breaking[0]["destination_details"].is_null());
}

#[test]
fn test_unsupported_document_exits_two() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.yaml", SOURCE_YAML);
    let b = write(&dir, "b.yaml", "raml: 1.0\ntitle: nope\n");

    let output = run(&["compare", a.to_str().unwrap(), b.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_config_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let with_header = r##"
swagger: "2.0"
paths:
  /a:
    get:
      responses:
        "200":
          description: ok
          headers:
            X-Trace:
              type: string
"##;
    let without_header = r##"
swagger: "2.0"
paths:
  /a:
    get:
      responses:
        "200":
          description: ok
"##;
    let a = write(&dir, "a.yaml", with_header);
    let b = write(&dir, "b.yaml", without_header);
    let config = write(
        &dir,
        "apidiff.toml",
        "ignored_response_headers = [\"x-trace\"]\n",
    );

    let default_run = run(&["compare", a.to_str().unwrap(), b.to_str().unwrap()]);
    assert_eq!(default_run.status.code(), Some(1));

    let configured = run(&[
        "compare",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(
        configured.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&configured.stderr)
    );
}

#[test]
fn test_invalid_config_exits_two() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.yaml", SOURCE_YAML);
    let config = write(&dir, "bad.toml", "no_such_option = true\n");

    let output = run(&[
        "compare",
        a.to_str().unwrap(),
        a.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unknown_log_profile_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.yaml", SOURCE_YAML);

    let output = run(&[
        "compare",
        a.to_str().unwrap(),
        a.to_str().unwrap(),
        "--log-profile",
        "verbose",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("verbose"), "stderr: {}", stderr);
    assert!(stderr.contains("development"), "stderr: {}", stderr);
    assert!(stderr.contains("production"), "stderr: {}", stderr);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_log_profile_accepts_short_alias() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.yaml", SOURCE_YAML);

    let output = run(&[
        "compare",
        a.to_str().unwrap(),
        a.to_str().unwrap(),
        "--log-profile",
        "dev",
    ]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
