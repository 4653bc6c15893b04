//! CLI binary integration tests using assert_cmd + predicates.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin("jsonschema-fixture").expect("binary should exist")
}

fn simple_schema() -> String {
    serde_json::json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "age": { "type": "integer", "minimum": 18, "maximum": 99 }
        },
        "required": ["name", "age"]
    })
    .to_string()
}

// ── Generate to File ────────────────────────────────────────────────────────

#[test]
fn test_generate_to_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    let output = dir.path().join("out.json");

    fs::write(&input, simple_schema()).unwrap();

    cmd()
        .args(["generate", input.to_str().unwrap()])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success();

    let content = fs::read_to_string(&output).expect("output file should exist");
    let value: serde_json::Value =
        serde_json::from_str(&content).expect("output should be valid JSON");
    assert!(value["name"].is_string());
    let age = value["age"].as_i64().expect("age should be an integer");
    assert!((18..=99).contains(&age));
}

// ── Generate to Stdout ──────────────────────────────────────────────────────

#[test]
fn test_generate_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(&input, simple_schema()).unwrap();

    cmd()
        .args(["generate", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\""));
}

// ── Count and Seed ──────────────────────────────────────────────────────────

#[test]
fn test_count_prints_array() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(&input, simple_schema()).unwrap();

    let out = cmd()
        .args(["generate", input.to_str().unwrap(), "-n", "5", "--format", "compact"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let values: Vec<serde_json::Value> =
        serde_json::from_slice(&out.stdout).expect("stdout should be a JSON array");
    assert_eq!(values.len(), 5);
}

#[test]
fn test_seed_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(&input, simple_schema()).unwrap();

    let run = || {
        cmd()
            .args(["generate", input.to_str().unwrap(), "--seed", "42", "-n", "3"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

// ── Normalize ───────────────────────────────────────────────────────────────

#[test]
fn test_normalize_prints_canonical_schema() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(&input, r#"{"allOf": [{"type": "string"}, {"maxLength": 4}]}"#).unwrap();

    let out = cmd()
        .args(["normalize", input.to_str().unwrap(), "--default-max", "7"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let schema: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(schema["type"], serde_json::json!(["string"]));
    assert_eq!(schema["maxLength"], serde_json::json!(4));
    assert_eq!(schema["maxItems"], serde_json::json!(7));
    assert!(schema.get("allOf").is_none());
}

// ── Strict Mode ─────────────────────────────────────────────────────────────

#[test]
fn test_strict_rejects_contradiction() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(&input, r#"{"allOf": [{"type": "string"}, {"type": "integer"}]}"#).unwrap();

    cmd()
        .args(["generate", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("null"));

    cmd()
        .args(["generate", input.to_str().unwrap(), "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Generation failed"));
}

// ── Invalid Input ───────────────────────────────────────────────────────────

#[test]
fn test_invalid_input() {
    cmd()
        .args(["generate", "/nonexistent/path/schema.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open input file"));
}

// ── Help Output ─────────────────────────────────────────────────────────────

#[test]
fn test_help_output() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("normalize"));
}

#[test]
fn test_generate_help() {
    cmd()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--seed"))
        .stdout(predicate::str::contains("--count"))
        .stdout(predicate::str::contains("--strict"));
}
