//! Evaluate command - compare extraction output against ground truth.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use shipex_core::models::ShipmentExtraction;
use shipex_core::shipment::evaluate;

/// Arguments for the evaluate command.
#[derive(Args)]
pub struct EvaluateArgs {
    /// Predictions file produced by the extract command
    #[arg(short, long, default_value = "output.json")]
    predictions: PathBuf,

    /// Ground truth file
    #[arg(short, long, default_value = "ground_truth.json")]
    truth: PathBuf,
}

pub async fn run(args: EvaluateArgs) -> anyhow::Result<()> {
    if !args.predictions.exists() {
        anyhow::bail!(
            "Predictions file not found: {}. Run 'shipex extract' first.",
            args.predictions.display()
        );
    }
    if !args.truth.exists() {
        anyhow::bail!("Ground truth file not found: {}", args.truth.display());
    }

    let predictions = read_records(&args.predictions)?;
    let truth = read_records(&args.truth)?;

    println!(
        "{} Evaluating {} predictions against {}",
        style("ℹ").blue(),
        predictions.len(),
        args.truth.display()
    );

    let report = evaluate(&predictions, &truth);

    if !report.missing_truth.is_empty() {
        println!(
            "{} {} predictions have no ground truth record",
            style("⚠").yellow(),
            report.missing_truth.len()
        );
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("ACCURACY METRICS");
    println!("{}", "=".repeat(60));
    println!("{:<30} {:<15} {}", "Field", "Accuracy", "Correct/Total");
    println!("{}", "-".repeat(60));

    for field in &report.fields {
        println!(
            "{:<30} {:>6.1}%        {}/{}",
            field.field,
            field.percent(),
            field.correct,
            field.total
        );
    }

    println!("{}", "-".repeat(60));
    println!(
        "{:<30} {:>6.1}%        {}/{}",
        "OVERALL ACCURACY",
        report.overall_percent(),
        report.overall_correct,
        report.overall_total
    );
    println!("{}", "=".repeat(60));

    println!();
    println!("{}", "=".repeat(60));
    println!("EMAILS WITH ERRORS (Top 5 per field)");
    println!("{}", "=".repeat(60));

    for field in &report.fields {
        if field.errors.is_empty() {
            continue;
        }
        println!();
        println!("{} ({} errors):", field.field, field.errors.len());
        for id in field.errors.iter().take(5) {
            println!("  - {}", id);
        }
        if field.errors.len() > 5 {
            println!("  ... and {} more", field.errors.len() - 5);
        }
    }

    Ok(())
}

fn read_records(path: &Path) -> anyhow::Result<Vec<ShipmentExtraction>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
