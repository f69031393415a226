//! # cert-harvest
//!
//! Library for harvesting GitHub certification counts from a public badge
//! directory, one CSV per country.
//!
//! ## Design Philosophy
//!
//! cert-harvest is designed to be:
//! - **Resilient** - a failing page keeps the partial result, a failing
//!   country never disturbs the others
//! - **Bounded** - per-request timeouts, per-country deadlines, and a hard
//!   cap on countries in flight
//! - **Library-first** - the CLI binaries are thin wrappers over this crate
//!
//! ## Quick Start
//!
//! ```no_run
//! use cert_harvest::{
//!     Config, ContinentMap, CountryWriter, DirectoryClient, FetchOrchestrator, FetchWriteUnit,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let client = Arc::new(DirectoryClient::new(config.http)?);
//!     let writer = CountryWriter::new(config.output.output_dir);
//!     let unit = Arc::new(FetchWriteUnit::new(client, writer));
//!     let orchestrator = FetchOrchestrator::new(unit, config.orchestrator);
//!
//!     let countries = ContinentMap::load()?.countries();
//!     let summary = orchestrator.run(&countries).await;
//!     println!("{} succeeded, {} failed", summary.succeeded(), summary.failed());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Directory service HTTP client
pub mod client;
/// Configuration types
pub mod config;
/// Country universe derived from the continent mapping
pub mod continent;
/// Error types
pub mod error;
/// Per-country pagination and badge-count merging
pub mod fetcher;
/// Bounded-concurrency multi-country orchestration
pub mod orchestrator;
/// Core types
pub mod types;
/// CSV output
pub mod writer;

// Re-export commonly used types
pub use client::DirectoryClient;
pub use config::{Config, HttpConfig, OrchestratorConfig, OutputConfig};
pub use continent::{ContinentMap, title_case};
pub use error::{Error, Result};
pub use fetcher::CountryFetcher;
pub use orchestrator::{CountryUnit, FetchOrchestrator, FetchWriteUnit};
pub use types::{CountryReport, CountryResult, FetchOutcome, FetchSummary, UserRecord};
pub use writer::{CountryWriter, country_slug};

/// Cancel `token` once a termination signal arrives.
///
/// Intended to run as a background task next to a [`FetchOrchestrator`]:
/// pass it the orchestrator's token and in-flight countries drain while no
/// new ones launch.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn cancel_on_shutdown(token: tokio_util::sync::CancellationToken) {
    wait_for_signal().await;
    tracing::warn!("shutdown requested, draining in-flight countries");
    token.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
