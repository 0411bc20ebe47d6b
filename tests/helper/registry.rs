//! Registry test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use package_script_writer::catalog::Catalog;
use package_script_writer::marketplace::MarketplaceClient;
use package_script_writer::version::error::RegistryError;
use package_script_writer::version::lifecycle::SupportLifecycleRecord;
use package_script_writer::version::registry::Registry;

/// In-memory registry for testing
pub struct MockRegistry {
    versions: HashMap<String, Vec<String>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            versions: HashMap::new(),
        }
    }

    pub fn with_versions(mut self, package: &str, versions: Vec<&str>) -> Self {
        self.versions.insert(
            package.to_string(),
            versions.into_iter().map(|v| v.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn fetch_all_versions(&self, package: &str) -> Result<Vec<String>, RegistryError> {
        match self.versions.get(package) {
            Some(versions) => Ok(versions.clone()),
            None => Err(RegistryError::NotFound(package.to_string())),
        }
    }
}

/// Catalog reading the marketplace from `marketplace_url` and versions from
/// the given in-memory registry
pub fn create_test_catalog(marketplace_url: &str, registry: MockRegistry) -> Arc<Catalog> {
    Arc::new(Catalog::new(
        Arc::new(MarketplaceClient::new(marketplace_url)),
        Arc::new(registry),
        Arc::new(MockRegistry::new()),
        Duration::from_secs(3600),
    ))
}

pub fn lifecycle_record(
    major: u32,
    track: &str,
    release: (i32, u32, u32),
    security_end: (i32, u32, u32),
) -> SupportLifecycleRecord {
    let date = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    SupportLifecycleRecord {
        major_version: major,
        release_date: date(release),
        release_type: track.to_string(),
        support_phase: date(security_end),
        security_phase: date(security_end),
        end_of_life: date(security_end),
    }
}
