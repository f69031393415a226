//! Core types for cert-harvest

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One user row from a directory page
///
/// The directory omits fields freely and sometimes sends explicit `null`;
/// both decode to the stated defaults (empty string for names, zero for the
/// badge count, no id). `badge_count` starts as the directory's own total and
/// has the external count added on top during a country fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque user identifier; absent for anonymized listings
    #[serde(default, deserialize_with = "null_to_default")]
    pub id: Option<String>,

    /// Given name
    #[serde(default, deserialize_with = "null_to_default")]
    pub first_name: String,

    /// Middle name
    #[serde(default, deserialize_with = "null_to_default")]
    pub middle_name: String,

    /// Family name
    #[serde(default, deserialize_with = "null_to_default")]
    pub last_name: String,

    /// Badge total for this user
    #[serde(default, deserialize_with = "null_to_default")]
    pub badge_count: u64,
}

/// Terminal status of one country's fetch-and-write unit
///
/// The orchestrator always receives one of these per country; faults never
/// cross the unit boundary in any other form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FetchOutcome {
    /// Unit ran to completion and its CSV was written
    Success,

    /// Unit failed
    Failed {
        /// Free-form diagnostic (timeout, panic, or error description)
        reason: String,
    },
}

impl FetchOutcome {
    /// True for the success variant
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success)
    }

    /// Build a failure outcome from any displayable diagnostic
    pub fn failed(reason: impl Into<String>) -> Self {
        FetchOutcome::Failed {
            reason: reason.into(),
        }
    }
}

/// Product of one country's completed fetch-and-write unit
#[derive(Clone, Debug)]
pub struct CountryResult {
    /// Country name as used for the directory filter
    pub country: String,

    /// Finalized user list, in directory order
    pub users: Vec<UserRecord>,

    /// Path of the CSV that was written
    pub output_path: PathBuf,
}

/// One country's entry in the final run summary
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CountryReport {
    /// Country name
    pub country: String,

    /// Terminal status of the unit
    pub outcome: FetchOutcome,

    /// Wall-clock time the unit ran before finishing or being abandoned
    pub elapsed: Duration,
}

/// Aggregate result of a multi-country run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the last unit finished
    pub finished_at: DateTime<Utc>,

    /// Per-country reports, in completion order
    pub reports: Vec<CountryReport>,
}

impl FetchSummary {
    /// Number of countries that completed successfully
    pub fn succeeded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }

    /// Number of countries that failed
    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }

    /// Names of the failed countries, in completion order
    pub fn failed_countries(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| !r.outcome.is_success())
            .map(|r| r.country.as_str())
            .collect()
    }

    /// True when no country failed
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// Total wall-clock time of the run
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Decode a field treating explicit `null` the same as an absent field.
pub(crate) fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
