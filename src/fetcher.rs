//! Per-country pagination and badge aggregation.

use std::sync::Arc;

use crate::client::DirectoryClient;
use crate::types::UserRecord;

/// Drives pagination for one country and merges the external badge count
/// into each record before accumulating it.
pub struct CountryFetcher {
    client: Arc<DirectoryClient>,
}

impl CountryFetcher {
    /// Create a fetcher over a shared directory client.
    pub fn new(client: Arc<DirectoryClient>) -> Self {
        Self { client }
    }

    /// Fetch every directory page for a country.
    ///
    /// Pagination starts at page 1 and ends on the first empty page. A failed
    /// page ends the loop early and returns whatever accumulated before it;
    /// the failure is logged, never raised. Within a page, external-badge
    /// lookups run serially; parallelism exists only across countries, never
    /// inside one, so the per-user endpoint is not hit in bursts.
    pub async fn fetch(&self, country: &str) -> Vec<UserRecord> {
        let mut all_users: Vec<UserRecord> = Vec::new();
        let mut page: u32 = 1;

        tracing::info!(country = %country, "fetching directory");

        loop {
            let users = match self.client.directory_page(country, page).await {
                Ok(users) => users,
                Err(e) => {
                    tracing::warn!(
                        country = %country,
                        page,
                        error = %e,
                        "page fetch failed, keeping partial result"
                    );
                    break;
                }
            };

            if users.is_empty() {
                break;
            }

            let page_users = users.len();
            for mut user in users {
                // A blank id would produce a malformed lookup URL; treat it
                // like a missing one.
                if let Some(id) = user.id.as_deref().filter(|id| !id.is_empty()) {
                    let external = self.external_badge_count_or_zero(id).await;
                    user.badge_count = user.badge_count.saturating_add(external);
                }
                all_users.push(user);
            }

            tracing::info!(country = %country, page, users = page_users, "page fetched");
            page += 1;
        }

        all_users
    }

    /// Best-effort external-badge lookup: any failure counts as zero.
    async fn external_badge_count_or_zero(&self, user_id: &str) -> u64 {
        match self.client.external_badge_count(user_id).await {
            Ok(count) => count,
            Err(e) => {
                tracing::debug!(
                    user_id = %user_id,
                    error = %e,
                    "external badge lookup failed, counting zero"
                );
                0
            }
        }
    }
}
