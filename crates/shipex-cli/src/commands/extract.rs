//! Extract command - batch extraction over an email input file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use shipex_core::models::config::ShipexConfig;
use shipex_core::models::{EmailMessage, ShipmentExtraction};
use shipex_core::ports::PortIndex;
use shipex_core::shipment::{PromptVersion, ShipmentExtractor};
use shipex_llm::GroqBackend;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input email file
    #[arg(short, long, default_value = "emails_input.json")]
    input: PathBuf,

    /// Port reference file
    #[arg(short, long, default_value = "port_codes_reference.json")]
    ports: PathBuf,

    /// Output file (also used to resume interrupted runs)
    #[arg(short, long, default_value = "output.json")]
    output: PathBuf,

    /// Prompt template version (v1, v2, v3); overrides the config value
    #[arg(long)]
    prompt_version: Option<PromptVersion>,

    /// Ignore any existing output and start from scratch
    #[arg(long)]
    fresh: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        ShipexConfig::from_file(std::path::Path::new(path))?
    } else {
        ShipexConfig::default()
    };

    // Check input files exist
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !args.ports.exists() {
        anyhow::bail!("Port reference file not found: {}", args.ports.display());
    }

    let emails: Vec<EmailMessage> = serde_json::from_str(&fs::read_to_string(&args.input)?)?;
    let index = PortIndex::from_file(&args.ports)?;

    if emails.is_empty() {
        anyhow::bail!("No emails found in {}", args.input.display());
    }

    println!(
        "{} Found {} emails to process",
        style("ℹ").blue(),
        emails.len()
    );

    // Resume from an existing output file unless told otherwise
    let mut results: Vec<ShipmentExtraction> = Vec::new();
    let mut processed_ids: HashSet<String> = HashSet::new();

    if args.output.exists() && !args.fresh {
        match read_results(&args.output) {
            Ok(existing) => {
                processed_ids = existing.iter().map(|r| r.id.clone()).collect();
                println!(
                    "{} Found existing {} with {} emails, resuming",
                    style("ℹ").blue(),
                    args.output.display(),
                    existing.len()
                );
                results = existing;
            }
            Err(e) => {
                warn!(
                    "Existing output {} is invalid ({}), starting fresh",
                    args.output.display(),
                    e
                );
            }
        }
    }

    // Build the extraction pipeline
    let api_key = std::env::var(&config.llm.api_key_env)
        .map_err(|_| anyhow::anyhow!("Environment variable {} is not set", config.llm.api_key_env))?;

    let backend = GroqBackend::with_timeout(api_key, Duration::from_secs(config.llm.timeout_secs))?
        .with_base_url(config.llm.base_url.clone())
        .with_model(config.llm.model.clone())
        .with_temperature(config.llm.temperature);

    let prompt_version = args.prompt_version.unwrap_or(config.extraction.prompt_version);
    let extractor = ShipmentExtractor::new(backend, index)
        .with_prompt_version(prompt_version)
        .with_max_retries(config.extraction.max_retries);

    // Set up progress bar
    let pb = ProgressBar::new(emails.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} emails")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut failed: Vec<(String, String)> = Vec::new();

    for (i, email) in emails.iter().enumerate() {
        if processed_ids.contains(&email.id) {
            debug!("Skipping {} (already processed)", email.id);
            pb.inc(1);
            continue;
        }

        match extractor.extract(email).await {
            Ok(record) => {
                results.push(record);
                // Save after every email so an interrupted run loses nothing
                save_results(&args.output, &results)?;
                debug!("Saved {} of {} emails", results.len(), emails.len());
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to extract {}: {}", email.id, error_msg);
                    failed.push((email.id.clone(), error_msg));
                } else {
                    error!("Failed to extract {}: {}", email.id, error_msg);
                    save_results(&args.output, &results)?;
                    anyhow::bail!(
                        "Extraction failed, progress saved to {}: {}",
                        args.output.display(),
                        error_msg
                    );
                }
            }
        }

        pb.inc(1);

        // Rate limiting between requests
        if i + 1 < emails.len() && config.extraction.request_delay_secs > 0 {
            tokio::time::sleep(Duration::from_secs(config.extraction.request_delay_secs)).await;
        }
    }

    pb.finish_with_message("Complete");

    // Generate summary if requested
    if args.summary {
        let summary_path = args.output.with_file_name("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    // Print summary
    println!();
    println!(
        "{} Processed {} emails in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!("   Results saved to {}", args.output.display());

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed emails:").red());
        for (id, error) in &failed {
            println!("  - {}: {}", id, error);
        }
    }

    Ok(())
}

fn read_results(path: &Path) -> anyhow::Result<Vec<ShipmentExtraction>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_results(path: &Path, results: &[ShipmentExtraction]) -> anyhow::Result<()> {
    fs::write(path, serde_json::to_string_pretty(results)?)?;
    Ok(())
}

fn write_summary(path: &Path, results: &[ShipmentExtraction]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "id",
        "product_line",
        "origin_port_code",
        "origin_port_name",
        "destination_port_code",
        "destination_port_name",
        "incoterm",
        "cargo_weight_kg",
        "cargo_cbm",
        "is_dangerous",
    ])?;

    for record in results {
        wtr.write_record([
            record.id.as_str(),
            record.product_line.as_str(),
            record.origin_port_code.as_deref().unwrap_or(""),
            record.origin_port_name.as_deref().unwrap_or(""),
            record.destination_port_code.as_deref().unwrap_or(""),
            record.destination_port_name.as_deref().unwrap_or(""),
            record.incoterm.as_str(),
            &record
                .cargo_weight_kg
                .map(|d| d.to_string())
                .unwrap_or_default(),
            &record.cargo_cbm.map(|d| d.to_string()).unwrap_or_default(),
            if record.is_dangerous { "true" } else { "false" },
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
