//! HTTP client for the credentialing directory.
//!
//! Two read-only operations against the remote service: one directory page
//! for a country, and one external-badge count for a user. The client is
//! stateless between calls; degradation policy (partial pages, zero counts)
//! lives with the callers.

use std::time::Duration;

use serde::Deserialize;

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::types::{UserRecord, null_to_default};

/// Issuer whose external badges count toward the secondary total.
const EXTERNAL_BADGE_ISSUER: &str = "Microsoft";

/// Substring an external badge name must contain to count.
const EXTERNAL_BADGE_NAME_PATTERN: &str = "GitHub";

/// Page size requested from the external-badge endpoint.
const EXTERNAL_BADGE_PAGE_SIZE: u32 = 48;

/// Envelope of one directory page.
#[derive(Debug, Deserialize)]
struct DirectoryPayload {
    #[serde(default)]
    data: Vec<UserRecord>,
}

/// Envelope of the external-badge listing.
#[derive(Debug, Deserialize)]
struct ExternalBadgesPayload {
    #[serde(default)]
    data: Vec<ExternalBadgeEntry>,
}

/// One entry of the external-badge listing.
#[derive(Debug, Default, Deserialize)]
struct ExternalBadgeEntry {
    #[serde(default, deserialize_with = "null_to_default")]
    external_badge: ExternalBadge,
}

/// Badge descriptor nested inside each listing entry.
#[derive(Debug, Default, Deserialize)]
struct ExternalBadge {
    #[serde(default, deserialize_with = "null_to_default")]
    badge_name: String,

    #[serde(default, deserialize_with = "null_to_default")]
    issuer_name: String,
}

impl ExternalBadge {
    /// True for a GitHub certification issued by Microsoft.
    fn is_github_cert(&self) -> bool {
        self.issuer_name == EXTERNAL_BADGE_ISSUER
            && self.badge_name.contains(EXTERNAL_BADGE_NAME_PATTERN)
    }
}

/// Client for the directory and external-badge endpoints.
///
/// Holds one shared `reqwest::Client`; the two operations apply their own
/// per-request limits (directory pages get longer than best-effort badge
/// lookups).
pub struct DirectoryClient {
    http: reqwest::Client,
    config: HttpConfig,
}

impl DirectoryClient {
    /// Create a client for the configured endpoint base.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(Error::ClientBuild)?;

        Ok(Self { http, config })
    }

    /// Fetch one directory page for a country.
    ///
    /// An empty result signals the end of pagination for that country.
    /// Transport errors, non-success statuses, and malformed payloads all
    /// surface as errors; there is no retry.
    pub async fn directory_page(&self, country: &str, page: u32) -> Result<Vec<UserRecord>> {
        let url = self.directory_url(country, page);
        let payload: DirectoryPayload = self.get_json(&url, self.config.directory_timeout).await?;
        Ok(payload.data)
    }

    /// Count a user's externally-issued badges matching the issuer and name
    /// filter.
    ///
    /// Failures surface to the caller, which maps them to zero; this lookup
    /// is best-effort per user and must never fail a page.
    pub async fn external_badge_count(&self, user_id: &str) -> Result<u64> {
        let url = self.external_badges_url(user_id);
        let payload: ExternalBadgesPayload = self.get_json(&url, self.config.badge_timeout).await?;

        let count = payload
            .data
            .iter()
            .filter(|entry| entry.external_badge.is_github_cert())
            .count();
        Ok(count as u64)
    }

    fn directory_url(&self, country: &str, page: u32) -> String {
        format!(
            "{}/directory?organization_id={}&sort=alphabetical&filter%5Blocation_name%5D={}&page={}&format=json",
            self.config.base_url,
            self.config.organization_id,
            urlencoding::encode(country),
            page,
        )
    }

    fn external_badges_url(&self, user_id: &str) -> String {
        format!(
            "{}/users/{}/external_badges/open_badges/public?page=1&page_size={}",
            self.config.base_url,
            urlencoding::encode(user_id),
            EXTERNAL_BADGE_PAGE_SIZE,
        )
    }

    /// GET a URL and decode its JSON body, bounded by `limit`.
    async fn get_json<T>(&self, url: &str, limit: Duration) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let limit_secs = limit.as_secs();

        let response = self
            .http
            .get(url)
            .timeout(limit)
            .send()
            .await
            .map_err(|e| Error::from_request(url, limit_secs, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::from_request(url, limit_secs, e))?;

        serde_json::from_str(&body).map_err(|source| Error::Payload {
            url: url.to_string(),
            source,
        })
    }
}
