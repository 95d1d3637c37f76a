//! Inspect command - walk a single email through the pipeline step by
//! step: raw model response, correction, and accuracy against ground
//! truth.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use serde_json::Value;

use shipex_core::models::config::ShipexConfig;
use shipex_core::models::{EmailMessage, ShipmentExtraction};
use shipex_core::ports::PortIndex;
use shipex_core::shipment::{correct, PromptVersion, ShipmentExtractor, EVALUATED_FIELDS};
use shipex_llm::GroqBackend;

const FIELD_WIDTH: usize = 28;
const VALUE_WIDTH: usize = 35;
const LINE_WIDTH: usize = 100;

/// Fields reported in the correction-changes step. `is_dangerous` is
/// never touched by correction and is left out.
const CHANGE_FIELDS: [&str; 8] = [
    "product_line",
    "origin_port_code",
    "origin_port_name",
    "destination_port_code",
    "destination_port_name",
    "cargo_weight_kg",
    "cargo_cbm",
    "incoterm",
];

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Email id (EMAIL_007, email_007 and 007 are all accepted)
    #[arg(required = true)]
    email_id: String,

    /// Input email file
    #[arg(short, long, default_value = "emails_input.json")]
    input: PathBuf,

    /// Port reference file
    #[arg(short, long, default_value = "port_codes_reference.json")]
    ports: PathBuf,

    /// Ground truth file
    #[arg(short, long, default_value = "ground_truth.json")]
    truth: PathBuf,

    /// Prompt template version (v1, v2, v3); overrides the config value
    #[arg(long)]
    prompt_version: Option<PromptVersion>,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    // Load configuration
    let config = if let Some(path) = config_path {
        ShipexConfig::from_file(std::path::Path::new(path))?
    } else {
        ShipexConfig::default()
    };

    let mut email_id = args.email_id.to_uppercase();
    if !email_id.starts_with("EMAIL_") {
        email_id = format!("EMAIL_{}", email_id);
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !args.ports.exists() {
        anyhow::bail!("Port reference file not found: {}", args.ports.display());
    }

    let emails: Vec<EmailMessage> = serde_json::from_str(&fs::read_to_string(&args.input)?)?;
    let Some(email) = emails.into_iter().find(|e| e.id == email_id) else {
        anyhow::bail!("Email {} not found in {}", email_id, args.input.display());
    };

    let truth_record: Option<ShipmentExtraction> = if args.truth.exists() {
        let records: Vec<ShipmentExtraction> =
            serde_json::from_str(&fs::read_to_string(&args.truth)?)?;
        records.into_iter().find(|t| t.id == email_id)
    } else {
        None
    };

    let prompt_version = args.prompt_version.unwrap_or(config.extraction.prompt_version);

    println!();
    println!("{}", "=".repeat(LINE_WIDTH));
    println!("INSPECTING: {} | prompt {}", email_id, prompt_version);
    println!("{}", "=".repeat(LINE_WIDTH));
    println!();
    println!("Subject: {}", email.subject);
    println!("Body: {}", preview(&email.body, 150));

    if truth_record.is_none() {
        println!();
        println!("{} No ground truth for {}", style("⚠").yellow(), email_id);
    }

    // Build the extraction pipeline
    let api_key = std::env::var(&config.llm.api_key_env)
        .map_err(|_| anyhow::anyhow!("Environment variable {} is not set", config.llm.api_key_env))?;

    let backend = GroqBackend::with_timeout(api_key, Duration::from_secs(config.llm.timeout_secs))?
        .with_base_url(config.llm.base_url.clone())
        .with_model(config.llm.model.clone())
        .with_temperature(config.llm.temperature);

    let index = PortIndex::from_file(&args.ports)?;
    let extractor = ShipmentExtractor::new(backend, index)
        .with_prompt_version(prompt_version)
        .with_max_retries(config.extraction.max_retries);

    println!();
    println!(
        "{} Requesting completion from {}",
        style("ℹ").blue(),
        config.llm.model
    );

    let raw = extractor.candidate(&email).await;
    let corrected = correct(raw.clone(), &email, extractor.index());

    let raw_json = serde_json::to_value(&raw)?;
    let corrected_json = serde_json::to_value(&corrected)?;
    let truth_json = truth_record.as_ref().map(serde_json::to_value).transpose()?;

    section("STEP 1: RAW MODEL RESPONSE (before correction)");
    let raw_accuracy = truth_json.as_ref().map(|t| print_comparison(&raw_json, t));
    println!();
    println!("Raw JSON:");
    println!("{}", serde_json::to_string_pretty(&raw)?);

    section("STEP 2: CORRECTED RESULT (what the extract command writes)");
    let final_accuracy = truth_json
        .as_ref()
        .map(|t| print_comparison(&corrected_json, t));
    println!();
    println!("Corrected JSON:");
    println!("{}", serde_json::to_string_pretty(&corrected)?);

    section("STEP 3: CORRECTION CHANGES");
    let mut changed = 0;
    for field in CHANGE_FIELDS {
        let before = raw_json.get(field).unwrap_or(&Value::Null);
        let after = corrected_json.get(field).unwrap_or(&Value::Null);
        if before != after {
            changed += 1;
            println!();
            println!("  {}:", field);
            println!("    raw:       {}", display_value(before));
            println!("    corrected: {}", display_value(after));
        }
    }
    println!();
    if changed == 0 {
        println!("  No changes, the model response was already in shape");
    } else {
        println!("  {} field(s) changed by correction", changed);
    }

    if let (Some(raw_acc), Some(final_acc)) = (raw_accuracy, final_accuracy) {
        section("ACCURACY SUMMARY");
        println!();
        println!("  Raw accuracy:    {:>6.1}%", raw_acc);
        println!("  Final accuracy:  {:>6.1}%", final_acc);
        println!("  Change:          {:>+6.1}%", final_acc - raw_acc);
    }

    if let Some(truth) = &truth_record {
        section("GROUND TRUTH");
        println!();
        println!("{}", serde_json::to_string_pretty(truth)?);
    }

    Ok(())
}

fn section(title: &str) {
    println!();
    println!("{}", "-".repeat(LINE_WIDTH));
    println!("{}", title);
    println!("{}", "-".repeat(LINE_WIDTH));
}

/// Print a per-field comparison table and return the accuracy percentage.
fn print_comparison(result: &Value, truth: &Value) -> f64 {
    let line_width = FIELD_WIDTH + VALUE_WIDTH * 2 + 10;

    println!();
    println!(
        "{:<width$} {:<vw$} {:<vw$} Status",
        "Field",
        "Result",
        "Expected",
        width = FIELD_WIDTH,
        vw = VALUE_WIDTH
    );
    println!("{}", "-".repeat(line_width));

    let mut correct = 0;
    for field in EVALUATED_FIELDS {
        let pred = result.get(field).unwrap_or(&Value::Null);
        let expected = truth.get(field).unwrap_or(&Value::Null);
        let matched = field_matches(pred, expected);
        if matched {
            correct += 1;
        }

        let status = if matched {
            style("PASS").green()
        } else {
            style("FAIL").red()
        };
        println!(
            "{:<width$} {:<vw$} {:<vw$} {}",
            field,
            truncate(&display_value(pred), VALUE_WIDTH),
            truncate(&display_value(expected), VALUE_WIDTH),
            status,
            width = FIELD_WIDTH,
            vw = VALUE_WIDTH
        );
    }

    let total = EVALUATED_FIELDS.len();
    let accuracy = correct as f64 / total as f64 * 100.0;
    println!("{}", "-".repeat(line_width));
    println!(
        "{:<width$} {:>6.1}% ({}/{} fields)",
        "ACCURACY",
        accuracy,
        correct,
        total,
        width = FIELD_WIDTH
    );
    println!("{}", "=".repeat(line_width));

    accuracy
}

/// Field comparison with the same semantics the evaluator applies:
/// strings case-insensitive and trimmed, quantities equal after
/// rounding to two decimals, null only equal to null.
fn field_matches(pred: &Value, truth: &Value) -> bool {
    match (pred, truth) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a.trim().to_lowercase() == b.trim().to_lowercase(),
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => round2(a) == round2(b),
            _ => false,
        },
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    }
}

fn round2(value: f64) -> Decimal {
    Decimal::try_from(value)
        .map(|d| d.round_dp(2))
        .unwrap_or_default()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width - 2 {
        let cut: String = text.chars().take(width - 5).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn preview(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let cut: String = text.chars().take(limit).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_matches_normalizes_strings() {
        assert!(field_matches(&json!("Chennai ICD"), &json!("chennai icd ")));
        assert!(!field_matches(&json!("Chennai"), &json!("Chennai ICD")));
    }

    #[test]
    fn test_field_matches_rounds_quantities() {
        assert!(field_matches(&json!(2.4), &json!(2.40)));
        assert!(field_matches(&json!(1234.554), &json!(1234.55)));
        assert!(!field_matches(&json!(1234.5), &json!(1234.56)));
    }

    #[test]
    fn test_field_matches_nulls() {
        assert!(field_matches(&Value::Null, &Value::Null));
        assert!(!field_matches(&json!("FOB"), &Value::Null));
        assert!(!field_matches(&Value::Null, &json!("FOB")));
    }

    #[test]
    fn test_truncate_keeps_short_values() {
        assert_eq!(truncate("Chennai", 35), "Chennai");
        let long = "a".repeat(50);
        let cut = truncate(&long, 35);
        assert_eq!(cut.len(), 33);
        assert!(cut.ends_with("..."));
    }
}
