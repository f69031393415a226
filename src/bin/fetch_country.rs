//! Single-country entry-point: fetch one country's directory and write its CSV.

use cert_harvest::{Config, ContinentMap, CountryFetcher, CountryWriter, DirectoryClient};

use chrono::Local;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fetch-country",
    version,
    about = "Fetch GitHub certification counts for one country"
)]
struct Cli {
    /// Country name as listed in the badge directory (quote multi-word names)
    country: String,
}

/// `RUST_LOG` when set, info-level progress otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // A missing country must exit 1; help and version keep exit 0.
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
    let client = Arc::new(DirectoryClient::new(config.http)?);
    let fetcher = CountryFetcher::new(client);
    let writer = CountryWriter::new(config.output.output_dir);

    match continents.continent_of(&cli.country) {
        Some(continent) => println!(
            "Fetching GitHub certifications for: {} ({continent})",
            cli.country
        ),
        None => println!("Fetching GitHub certifications for: {}", cli.country),
    }
    println!("Started at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    let users = fetcher.fetch(&cli.country).await;
    let path = writer.write(&cli.country, &users)?;

    println!("Saved {} users to {}", users.len(), path.display());
    println!("Completed at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    Ok(())
}
