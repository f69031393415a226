//! Whole-universe entry-point: run every known country through the
//! orchestrator and summarize the outcome.

use cert_harvest::{
    Config, ContinentMap, CountryWriter, DirectoryClient, FetchOrchestrator, FetchWriteUnit,
};

use chrono::Local;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fetch-all",
    version,
    about = "Fetch GitHub certification counts for every known country"
)]
struct Cli {}

/// `RUST_LOG` when set, info-level progress otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_target(false)
        .compact()
        .try_init();

    let config = Config::default();
    let continents = ContinentMap::load()?;
    let countries = continents.countries();

    let client = Arc::new(DirectoryClient::new(config.http)?);
    let writer = CountryWriter::new(config.output.output_dir);
    let unit = Arc::new(FetchWriteUnit::new(client, writer));
    let orchestrator = FetchOrchestrator::new(unit, config.orchestrator);

    tokio::spawn(cert_harvest::cancel_on_shutdown(orchestrator.cancel_token()));

    let bar = "=".repeat(80);
    println!("{bar}");
    println!("GitHub Certifications Data Fetcher");
    println!("{bar}");
    println!();
    println!("Found {} countries to process", countries.len());
    println!("Started at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!();

    let summary = orchestrator.run(&countries).await;

    println!();
    println!("{bar}");
    println!("Completed at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("✓ Success: {}/{}", summary.succeeded(), countries.len());
    println!("✗ Failed: {}/{}", summary.failed(), countries.len());

    if !summary.all_succeeded() {
        println!();
        println!("Failed countries:");
        for country in summary.failed_countries() {
            match continents.continent_of(country) {
                Some(continent) => println!("  - {country} ({continent})"),
                None => println!("  - {country}"),
            }
        }
        println!("{bar}");
        std::process::exit(1);
    }

    println!("{bar}");
    Ok(())
}
