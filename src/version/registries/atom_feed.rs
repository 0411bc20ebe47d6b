//! Legacy Atom feed (`{packageUrl}/atom.xml`) implementation
//!
//! Each feed entry's `id` ends with the version number as its final path
//! segment. Unlike the flat index, failures here are reported to the caller.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{FETCH_TIMEOUT_MS, USER_AGENT};
use crate::version::error::RegistryError;
use crate::version::registry::Registry;

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
}

/// Registry implementation for per-package Atom feeds.
///
/// The `package` argument of [`Registry::fetch_all_versions`] is the package
/// URL, not an identifier.
pub struct AtomFeedRegistry {
    client: reqwest::Client,
}

impl AtomFeedRegistry {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for AtomFeedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract versions from feed XML, in feed order.
fn parse_feed(xml: &str) -> Result<Vec<String>, RegistryError> {
    let feed: Feed = quick_xml::de::from_str(xml).map_err(|e| {
        warn!("Failed to parse Atom feed: {}", e);
        RegistryError::InvalidResponse(e.to_string())
    })?;

    let versions = feed
        .entries
        .iter()
        .filter_map(|entry| entry.id.trim().rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();

    Ok(versions)
}

#[async_trait::async_trait]
impl Registry for AtomFeedRegistry {
    async fn fetch_all_versions(&self, package: &str) -> Result<Vec<String>, RegistryError> {
        let url = format!("{}/atom.xml", package.trim_end_matches('/'));
        debug!("Fetching Atom feed {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            warn!("Atom feed returned status {}: {}", response.status(), url);
            return Err(RegistryError::from_status(&response, package));
        }

        let body = response.text().await?;

        parse_feed(&body)
    }
}
