//! Configuration types for cert-harvest

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// HTTP behavior configuration (endpoint base, timeouts, identification)
///
/// Groups settings for talking to the remote directory service.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base URL of the directory API (default: the public Credly v1 API)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Organization whose directory is harvested
    #[serde(default = "default_organization_id")]
    pub organization_id: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request limit for directory page fetches (default: 30 seconds)
    #[serde(default = "default_directory_timeout", with = "duration_serde")]
    pub directory_timeout: Duration,

    /// Per-request limit for external-badge lookups (default: 10 seconds)
    ///
    /// Shorter than the page limit: these lookups are best-effort per user
    /// and must not stall a page for long.
    #[serde(default = "default_badge_timeout", with = "duration_serde")]
    pub badge_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            organization_id: default_organization_id(),
            user_agent: default_user_agent(),
            directory_timeout: default_directory_timeout(),
            badge_timeout: default_badge_timeout(),
        }
    }
}

/// Orchestration configuration (concurrency cap and per-country deadlines)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum number of countries fetched in parallel (default: 10)
    #[serde(default = "default_max_concurrent_countries")]
    pub max_concurrent_countries: usize,

    /// Deadline for one country's fetch-and-write unit (default: 120 seconds)
    #[serde(default = "default_country_deadline", with = "duration_serde")]
    pub country_deadline: Duration,

    /// Deadline for countries in `large_countries` (default: 900 seconds)
    ///
    /// Directories for populous countries run to hundreds of pages and need
    /// far more wall-clock time than the rest of the world.
    #[serde(default = "default_large_country_deadline", with = "duration_serde")]
    pub large_country_deadline: Duration,

    /// Countries granted the large deadline
    #[serde(default = "default_large_countries")]
    pub large_countries: Vec<String>,
}

impl OrchestratorConfig {
    /// Deadline for one country, honoring the large-country list.
    pub fn deadline_for(&self, country: &str) -> Duration {
        if self.large_countries.iter().any(|c| c == country) {
            self.large_country_deadline
        } else {
            self.country_deadline
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_countries: default_max_concurrent_countries(),
            country_deadline: default_country_deadline(),
            large_country_deadline: default_large_country_deadline(),
            large_countries: default_large_countries(),
        }
    }
}

/// Output configuration (where per-country CSV files land)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for per-country CSV files (default: "datasource")
    ///
    /// Created on first write if absent.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Main configuration for the harvester
///
/// Fields are organized into logical sub-configs:
/// - [`http`](HttpConfig) - endpoint base, timeouts, identification
/// - [`orchestrator`](OrchestratorConfig) - concurrency cap, deadlines
/// - [`output`](OutputConfig) - CSV output directory
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP settings for the directory service
    #[serde(default)]
    pub http: HttpConfig,

    /// Multi-country orchestration settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

// Default value functions
fn default_base_url() -> String {
    "https://www.credly.com/api/v1".to_string()
}

fn default_organization_id() -> String {
    "63074953-290b-4dce-86ce-ea04b4187219".to_string()
}

fn default_user_agent() -> String {
    "cert-harvest".to_string()
}

fn default_directory_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_badge_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_concurrent_countries() -> usize {
    10
}

fn default_country_deadline() -> Duration {
    Duration::from_secs(120)
}

fn default_large_country_deadline() -> Duration {
    Duration::from_secs(900)
}

fn default_large_countries() -> Vec<String> {
    [
        "Brazil",
        "India",
        "United States",
        "China",
        "Germany",
        "United Kingdom",
        "France",
        "Canada",
        "Japan",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("datasource")
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    // --- Defaults ---

    #[test]
    fn http_defaults_match_documented_limits() {
        let http = HttpConfig::default();

        assert_eq!(http.directory_timeout, Duration::from_secs(30));
        assert_eq!(http.badge_timeout, Duration::from_secs(10));
        assert!(
            http.base_url.starts_with("https://"),
            "default base URL must be absolute: {}",
            http.base_url
        );
        assert!(
            !http.base_url.ends_with('/'),
            "base URL must not carry a trailing slash, paths are joined with one"
        );
    }

    #[test]
    fn orchestrator_defaults_match_documented_limits() {
        let orch = OrchestratorConfig::default();

        assert_eq!(orch.max_concurrent_countries, 10);
        assert_eq!(orch.country_deadline, Duration::from_secs(120));
        assert_eq!(orch.large_country_deadline, Duration::from_secs(900));
        assert_eq!(orch.large_countries.len(), 9);
    }

    #[test]
    fn output_default_is_datasource() {
        assert_eq!(OutputConfig::default().output_dir, PathBuf::from("datasource"));
    }

    // --- Deadline selection ---

    #[test]
    fn large_countries_get_the_long_deadline() {
        let orch = OrchestratorConfig::default();

        for country in ["Brazil", "India", "United States", "Japan"] {
            assert_eq!(
                orch.deadline_for(country),
                Duration::from_secs(900),
                "{country} must get the large-country deadline"
            );
        }
    }

    #[test]
    fn everyone_else_gets_the_short_deadline() {
        let orch = OrchestratorConfig::default();

        for country in ["Iceland", "Uruguay", "New Zealand", ""] {
            assert_eq!(
                orch.deadline_for(country),
                Duration::from_secs(120),
                "{country:?} must get the default deadline"
            );
        }
    }

    #[test]
    fn deadline_selection_is_exact_match_not_substring() {
        let orch = OrchestratorConfig::default();

        // "United States Minor Outlying Islands" is not "United States"
        assert_eq!(
            orch.deadline_for("United States Minor Outlying Islands"),
            Duration::from_secs(120)
        );
    }

    // --- Serialization ---

    #[test]
    fn config_default_survives_json_round_trip() {
        let original = Config::default();

        let json = serde_json::to_string(&original).expect("Config must serialize to JSON");
        let restored: Config =
            serde_json::from_str(&json).expect("Config must deserialize from its own JSON");

        assert_eq!(restored.http.base_url, original.http.base_url);
        assert_eq!(restored.http.directory_timeout, original.http.directory_timeout);
        assert_eq!(restored.http.badge_timeout, original.http.badge_timeout);
        assert_eq!(
            restored.orchestrator.max_concurrent_countries,
            original.orchestrator.max_concurrent_countries
        );
        assert_eq!(
            restored.orchestrator.large_countries,
            original.orchestrator.large_countries
        );
        assert_eq!(restored.output.output_dir, original.output.output_dir);
    }

    #[test]
    fn durations_serialize_as_integer_seconds() {
        let json = serde_json::to_value(HttpConfig::default()).expect("serialize failed");

        assert_eq!(
            json["directory_timeout"], 30,
            "durations must serialize as integer seconds"
        );
        assert_eq!(json["badge_timeout"], 10);
    }

    #[test]
    fn empty_json_object_yields_full_defaults() {
        let config: Config = serde_json::from_str("{}").expect("empty object must deserialize");

        assert_eq!(config.http.directory_timeout, Duration::from_secs(30));
        assert_eq!(config.orchestrator.max_concurrent_countries, 10);
        assert_eq!(config.output.output_dir, PathBuf::from("datasource"));
    }

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let json = r#"{"orchestrator": {"max_concurrent_countries": 3, "country_deadline": 15}}"#;
        let config: Config = serde_json::from_str(json).expect("partial config must deserialize");

        assert_eq!(config.orchestrator.max_concurrent_countries, 3);
        assert_eq!(config.orchestrator.country_deadline, Duration::from_secs(15));
        assert_eq!(
            config.orchestrator.large_country_deadline,
            Duration::from_secs(900),
            "unset fields must fall back to defaults"
        );
        assert_eq!(config.http.badge_timeout, Duration::from_secs(10));
    }
}
