//! Concurrent orchestration of per-country fetch units
//!
//! Runs the whole country universe through a bounded worker pool. Each
//! country gets its own spawned task with a wall-clock deadline; whatever
//! happens inside a unit (errors, panics, overruns) is normalized into a
//! [`CountryReport`] so one country can never take the run down with it.

use crate::client::DirectoryClient;
use crate::config::OrchestratorConfig;
use crate::error::Result;
use crate::fetcher::CountryFetcher;
use crate::types::{CountryReport, CountryResult, FetchOutcome, FetchSummary};
use crate::writer::CountryWriter;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Abstraction over one country's fetch-and-write work, enabling testability.
#[async_trait::async_trait]
pub trait CountryUnit: Send + Sync {
    /// Run the unit for one country to completion.
    async fn run(&self, country: &str) -> Result<CountryResult>;
}

/// Production [`CountryUnit`] that fetches a country's directory and writes
/// its CSV.
pub struct FetchWriteUnit {
    fetcher: CountryFetcher,
    writer: CountryWriter,
}

impl FetchWriteUnit {
    /// Compose a fetcher over `client` with `writer` for its CSV output.
    pub fn new(client: Arc<DirectoryClient>, writer: CountryWriter) -> Self {
        Self {
            fetcher: CountryFetcher::new(client),
            writer,
        }
    }
}

#[async_trait::async_trait]
impl CountryUnit for FetchWriteUnit {
    async fn run(&self, country: &str) -> Result<CountryResult> {
        let users = self.fetcher.fetch(country).await;
        let output_path = self.writer.write(country, &users)?;
        Ok(CountryResult {
            country: country.to_string(),
            users,
            output_path,
        })
    }
}

/// Bounded-concurrency runner for a set of countries.
///
/// At most `max_concurrent_countries` units are in flight at once; reports
/// are collected in completion order, not submission order.
pub struct FetchOrchestrator {
    unit: Arc<dyn CountryUnit>,
    config: OrchestratorConfig,
    cancel_token: CancellationToken,
}

impl FetchOrchestrator {
    /// Create an orchestrator driving `unit` under `config`.
    pub fn new(unit: Arc<dyn CountryUnit>, config: OrchestratorConfig) -> Self {
        Self {
            unit,
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Token that stops further units from launching once cancelled.
    ///
    /// Units already in flight keep their full deadline windows; countries
    /// not yet launched are reported failed with reason `"cancelled"`.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Run every country in `countries` and collect the summary.
    ///
    /// Always returns one [`CountryReport`] per country, in the order units
    /// finished. The summary alone decides the process exit status, so no
    /// unit failure surfaces as an error here.
    pub async fn run(&self, countries: &[String]) -> FetchSummary {
        let started_at = Utc::now();
        let total = countries.len();
        let completed = AtomicUsize::new(0);

        tracing::info!(
            total,
            concurrency = self.config.max_concurrent_countries,
            "starting run"
        );

        let reports: Vec<CountryReport> = stream::iter(countries.iter().cloned())
            .map(|country| {
                let unit = Arc::clone(&self.unit);
                let deadline = self.config.deadline_for(&country);
                let cancel = self.cancel_token.clone();
                let completed = &completed;
                async move {
                    let report = run_country(unit, country, deadline, cancel).await;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    match &report.outcome {
                        FetchOutcome::Success => tracing::info!(
                            country = %report.country,
                            completed = done,
                            total,
                            elapsed_secs = report.elapsed.as_secs(),
                            "country succeeded"
                        ),
                        FetchOutcome::Failed { reason } => tracing::warn!(
                            country = %report.country,
                            completed = done,
                            total,
                            reason = %reason,
                            "country failed"
                        ),
                    }
                    report
                }
            })
            .buffer_unordered(self.config.max_concurrent_countries.max(1))
            .collect()
            .await;

        let summary = FetchSummary {
            started_at,
            finished_at: Utc::now(),
            reports,
        };

        tracing::info!(
            total,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            elapsed_secs = summary.elapsed().num_seconds(),
            "run complete"
        );

        summary
    }
}

/// Drive one country's unit inside its own task and deadline window,
/// normalizing every possible ending into a [`CountryReport`].
async fn run_country(
    unit: Arc<dyn CountryUnit>,
    country: String,
    deadline: Duration,
    cancel: CancellationToken,
) -> CountryReport {
    let start = Instant::now();

    if cancel.is_cancelled() {
        return CountryReport {
            country,
            outcome: FetchOutcome::failed("cancelled"),
            elapsed: start.elapsed(),
        };
    }

    // Spawned so a panicking unit surfaces as a JoinError instead of
    // unwinding through the pool.
    let handle = tokio::spawn({
        let unit = Arc::clone(&unit);
        let country = country.clone();
        async move { unit.run(&country).await }
    });
    let abort = handle.abort_handle();

    let outcome = match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(Ok(result))) => {
            tracing::debug!(
                country = %result.country,
                users = result.users.len(),
                path = %result.output_path.display(),
                "unit finished"
            );
            FetchOutcome::Success
        }
        Ok(Ok(Err(e))) => FetchOutcome::failed(e.to_string()),
        Ok(Err(join_err)) => {
            let reason = if join_err.is_panic() {
                "worker panicked"
            } else {
                "worker cancelled"
            };
            FetchOutcome::failed(reason)
        }
        Err(_) => {
            abort.abort();
            FetchOutcome::failed(format!("timeout ({}s)", deadline.as_secs()))
        }
    };

    CountryReport {
        country,
        outcome,
        elapsed: start.elapsed(),
    }
}
