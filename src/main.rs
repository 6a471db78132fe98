use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use std::collections::HashMap;
use std::path::PathBuf;

use omen_scanner::config::{SUMMARY_API_KEY_ENV, ScanConfig};
use omen_scanner::models::{ScopeFilter, SummaryMode};
use omen_scanner::summary::SummaryClient;
use omen_scanner::{ingest, logging, report, scan};

#[derive(Parser, Debug)]
#[command(
    name = "omen-scanner",
    about = "Ranked smart-money report from an options-flow export"
)]
struct Cli {
    /// Path to the trade export (.csv or .tsv)
    input: PathBuf,

    /// Pre-aggregation scope filter
    #[arg(long, value_enum, default_value = "full-market")]
    scope: ScopeFilter,

    /// Comma-separated ticker allowlist (required with --scope targeted)
    #[arg(long, default_value = "")]
    tickers: String,

    /// Narrative summary mode
    #[arg(long, value_enum, default_value = "standard")]
    summary: SummaryMode,

    /// Neutral band as a fraction of total premium (0 keeps the two-way bias)
    #[arg(long, default_value_t = 0.0)]
    neutral_margin: f64,

    /// Write the text report to this file as well as stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write a JSON dump of the scan outcome to this file
    #[arg(long)]
    json: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    logging::init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        // One consolidated message; no partial report on failure.
        eprintln!("{} {:#}", "✗".red(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "OMEN Smart Money Scanner".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    if cli.scope == ScopeFilter::Targeted && cli.tickers.trim().is_empty() {
        anyhow::bail!("--scope targeted requires --tickers with at least one symbol");
    }

    let config = ScanConfig {
        scope: cli.scope,
        summary_mode: cli.summary,
        neutral_margin: cli.neutral_margin,
        api_key: std::env::var(SUMMARY_API_KEY_ENV).ok(),
        ..ScanConfig::default()
    }
    .with_allowlist(&cli.tickers);

    // Step 1: Ingest the export
    println!("{}", "Step 1: Reading trade export...".cyan());
    let ingested = ingest::read_trades(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    println!(
        "{} {} rows read ({} skipped, {} premiums defaulted)",
        "✓".green(),
        ingested.rows.len(),
        ingested.skipped_rows,
        ingested.defaulted_premiums
    );
    println!();

    // Step 2: Score and rank
    println!(
        "{}",
        format!("Step 2: Scanning ({} scope)...", cli.scope.label()).cyan()
    );
    let today = Utc::now().date_naive();
    let outcome = scan::run_scan(ingested.rows, &config, today)?;
    println!(
        "{} {} of {} tickers selected from {} rows",
        "✓".green(),
        outcome.diagnostics.tickers_selected,
        outcome.diagnostics.tickers_seen,
        outcome.diagnostics.rows_after_filter
    );
    println!();

    // Step 3: Narratives (AI mode degrades to the template on any failure)
    println!("{}", "Step 3: Writing narratives...".cyan());
    let summary_client = SummaryClient::new(&config)?;
    let mut narratives = HashMap::new();
    for section in &outcome.sections {
        let text = summary_client.narrative(section).await;
        print!("{}", ".".green());
        narratives.insert(section.aggregate.symbol.clone(), text);
    }
    println!("\n");

    // Step 4: Render
    let text = report::render_report(&outcome, &narratives);
    println!("{}", text);

    if let Some(path) = &cli.output {
        std::fs::write(path, &text)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("{} Report saved to {}", "✓".green(), path.display());
    }
    if let Some(path) = &cli.json {
        let json = report::render_json(&outcome).context("Failed to serialize scan outcome")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
        println!("{} JSON saved to {}", "✓".green(), path.display());
    }

    println!();
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Done!".green().bold());
    println!("{}", "=".repeat(60).blue());

    Ok(())
}
