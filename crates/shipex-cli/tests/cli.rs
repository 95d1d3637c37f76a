//! Integration tests for the shipex binary. Everything here runs
//! offline; commands that would reach the LLM API are exercised only up
//! to their argument and environment validation.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const EMAILS: &str = r#"[
  {"id": "EMAIL_001", "subject": "Rate request", "body": "Shipment from Hamburg to Chennai, 850kg, FOB"}
]"#;

const PORTS: &str = r#"[
  {"code": "DEHAM", "name": "Hamburg"},
  {"code": "INMAA", "name": "Chennai"}
]"#;

const PREDICTIONS: &str = r#"[
  {"id": "EMAIL_001", "product_line": "pl_sea_import_lcl", "origin_port_code": "DEHAM",
   "origin_port_name": "Hamburg", "destination_port_code": "INMAA", "destination_port_name": "Chennai",
   "incoterm": "FOB", "cargo_weight_kg": 850.0, "cargo_cbm": 1.2, "is_dangerous": false},
  {"id": "EMAIL_002", "product_line": "pl_sea_export_lcl", "origin_port_code": "INMAA",
   "origin_port_name": "Chennai", "destination_port_code": "DEHAM", "destination_port_name": "Hamburg",
   "incoterm": "EXW", "cargo_weight_kg": 1200.0, "cargo_cbm": 3.5, "is_dangerous": false}
]"#;

const TRUTH: &str = r#"[
  {"id": "EMAIL_001", "product_line": "pl_sea_import_lcl", "origin_port_code": "DEHAM",
   "origin_port_name": "Hamburg", "destination_port_code": "INMAA", "destination_port_name": "Chennai",
   "incoterm": "FOB", "cargo_weight_kg": 850, "cargo_cbm": 1.2, "is_dangerous": false},
  {"id": "EMAIL_002", "product_line": "pl_sea_export_lcl", "origin_port_code": "INNSA",
   "origin_port_name": "Chennai", "destination_port_code": "DEHAM", "destination_port_name": "Hamburg",
   "incoterm": "EXW", "cargo_weight_kg": 1200.0, "cargo_cbm": 3.5, "is_dangerous": false}
]"#;

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("shipex")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_evaluate_requires_predictions_file() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("shipex")
        .unwrap()
        .current_dir(dir.path())
        .arg("evaluate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run 'shipex extract' first"));
}

#[test]
fn test_evaluate_reports_field_accuracy() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("output.json"), PREDICTIONS).unwrap();
    fs::write(dir.path().join("ground_truth.json"), TRUTH).unwrap();

    Command::cargo_bin("shipex")
        .unwrap()
        .current_dir(dir.path())
        .arg("evaluate")
        .assert()
        .success()
        .stdout(predicate::str::contains("ACCURACY METRICS"))
        // One field of eighteen is wrong: EMAIL_002's origin code.
        .stdout(predicate::str::contains("17/18"))
        .stdout(predicate::str::contains("origin_port_code (1 errors):"))
        .stdout(predicate::str::contains("- EMAIL_002"));
}

#[test]
fn test_extract_requires_api_key() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("emails_input.json"), EMAILS).unwrap();
    fs::write(dir.path().join("port_codes_reference.json"), PORTS).unwrap();

    Command::cargo_bin("shipex")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("GROQ_API_KEY")
        .arg("extract")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GROQ_API_KEY"));
}

#[test]
fn test_extract_requires_input_file() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("shipex")
        .unwrap()
        .current_dir(dir.path())
        .arg("extract")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_inspect_unknown_email_id() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("emails_input.json"), EMAILS).unwrap();
    fs::write(dir.path().join("port_codes_reference.json"), PORTS).unwrap();

    // The id is normalized to EMAIL_999 before the lookup fails.
    Command::cargo_bin("shipex")
        .unwrap()
        .current_dir(dir.path())
        .args(["inspect", "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("EMAIL_999 not found"));
}

#[test]
fn test_config_init_and_show_path() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");

    Command::cargo_bin("shipex")
        .unwrap()
        .args(["config", "init", "-o"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    let written = fs::read_to_string(&config_path).unwrap();
    assert!(written.contains("\"llm\""));
    assert!(written.contains("\"prompt_version\""));

    // A second init without --force refuses to overwrite.
    Command::cargo_bin("shipex")
        .unwrap()
        .args(["config", "init", "-o"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    Command::cargo_bin("shipex")
        .unwrap()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"));
}
