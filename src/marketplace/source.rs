//! Single-page marketplace fetches

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use tracing::{debug, warn};

use crate::config::{DEFAULT_MARKETPLACE_URL, FETCH_TIMEOUT_MS, USER_AGENT};
use crate::marketplace::types::{MarketplacePage, QueryKind};
use crate::version::error::RegistryError;

/// Trait for fetching one page of a marketplace listing
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait MarketplaceSource: Send + Sync {
    /// Fetches page `page_number` (1-based) holding at most `page_size` records
    async fn fetch_page(
        &self,
        kind: QueryKind,
        page_number: u32,
        page_size: u32,
    ) -> Result<MarketplacePage, RegistryError>;
}

/// Marketplace API client
pub struct MarketplaceClient {
    client: reqwest::Client,
    base_url: String,
}

impl MarketplaceClient {
    /// Creates a new MarketplaceClient with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for MarketplaceClient {
    fn default() -> Self {
        Self::new(DEFAULT_MARKETPLACE_URL)
    }
}

#[async_trait::async_trait]
impl MarketplaceSource for MarketplaceClient {
    async fn fetch_page(
        &self,
        kind: QueryKind,
        page_number: u32,
        page_size: u32,
    ) -> Result<MarketplacePage, RegistryError> {
        let url = format!(
            "{}/packages?{}&pageSize={}&pageNumber={}",
            self.base_url,
            kind.filters(),
            page_size,
            page_number
        );
        debug!("Fetching marketplace page {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            warn!("Marketplace returned status {}: {}", response.status(), url);
            return Err(RegistryError::from_status(&response, kind.as_str()));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse marketplace response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })
    }
}
