//! Flat version index (`{base}/{id}/index.json`) implementation

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{DEFAULT_FLAT_INDEX_URL, FETCH_TIMEOUT_MS, USER_AGENT};
use crate::version::error::RegistryError;
use crate::version::registry::Registry;

/// Response from the flat index, versions in ascending publish order
#[derive(Debug, Deserialize)]
struct FlatIndexResponse {
    versions: Vec<String>,
}

/// Registry implementation for the flat-container version index
pub struct FlatIndexRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl FlatIndexRegistry {
    /// Creates a new FlatIndexRegistry with a custom base URL
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

impl Default for FlatIndexRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_FLAT_INDEX_URL)
    }
}

#[async_trait::async_trait]
impl Registry for FlatIndexRegistry {
    async fn fetch_all_versions(&self, package: &str) -> Result<Vec<String>, RegistryError> {
        // The index is keyed by the lowercased package id
        let url = format!("{}/{}/index.json", self.base_url, package.to_lowercase());
        debug!("Fetching flat index {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            warn!("Flat index returned status {}: {}", response.status(), url);
            return Err(RegistryError::from_status(&response, package));
        }

        let index: FlatIndexResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse flat index response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        // Newest first
        let mut versions = index.versions;
        versions.reverse();

        Ok(versions)
    }
}
