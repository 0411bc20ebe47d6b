//! Registry trait for fetching package versions from various sources

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;

/// Trait for fetching the published versions of a package
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches all versions for a package from the registry
    ///
    /// # Arguments
    /// * `package` - Package identifier, or feed URL for URL-addressed registries
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Versions in the registry's meaningful order
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_all_versions(&self, package: &str) -> Result<Vec<String>, RegistryError>;
}
