//! Cached package, template and version lookups
//!
//! Marketplace listings go through the aggregator and version lists through
//! the registries, each behind a [`TtlCache`]. Failures are never cached:
//!
//! - an empty listing is returned but not stored, so the next call retries
//! - flat-index failures yield an empty version list, not stored
//! - legacy feed failures are returned to the caller, not stored

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::marketplace::aggregator::MarketplaceAggregator;
use crate::marketplace::source::{MarketplaceClient, MarketplaceSource};
use crate::marketplace::types::{PackageRecord, QueryKind};
use crate::version::cache::TtlCache;
use crate::version::clock::{Clock, SystemClock};
use crate::version::error::RegistryError;
use crate::version::lts::VersionLookup;
use crate::version::registries::{AtomFeedRegistry, FlatIndexRegistry};
use crate::version::registry::Registry;

/// Marker for an aggregation that produced nothing worth caching
struct EmptyListing;

pub struct Catalog {
    aggregator: MarketplaceAggregator,
    flat_index: Arc<dyn Registry>,
    atom_feed: Arc<dyn Registry>,
    listings: TtlCache<Arc<Vec<PackageRecord>>>,
    versions: TtlCache<Arc<Vec<String>>>,
    ttl: Duration,
}

impl Catalog {
    pub fn new(
        marketplace: Arc<dyn MarketplaceSource>,
        flat_index: Arc<dyn Registry>,
        atom_feed: Arc<dyn Registry>,
        ttl: Duration,
    ) -> Self {
        Self::with_clock(marketplace, flat_index, atom_feed, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(
        marketplace: Arc<dyn MarketplaceSource>,
        flat_index: Arc<dyn Registry>,
        atom_feed: Arc<dyn Registry>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            aggregator: MarketplaceAggregator::new(marketplace),
            flat_index,
            atom_feed,
            listings: TtlCache::with_clock(clock.clone()),
            versions: TtlCache::with_clock(clock),
            ttl,
        }
    }

    /// Build a catalog talking to the configured upstream endpoints
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(MarketplaceClient::new(&config.registries.marketplace_url)),
            Arc::new(FlatIndexRegistry::new(&config.registries.flat_index_url)),
            Arc::new(AtomFeedRegistry::new()),
            config.cache.ttl(),
        )
    }

    /// Every marketplace record of `kind`. May be incomplete if the upstream
    /// failed part-way through.
    pub async fn listing(&self, kind: QueryKind) -> Arc<Vec<PackageRecord>> {
        let key = format!("marketplace:{}", kind.as_str());
        let aggregator = &self.aggregator;

        self.listings
            .get_or_create(&key, self.ttl, move || async move {
                let records = aggregator.fetch_all(kind).await;
                if records.is_empty() {
                    Err(EmptyListing)
                } else {
                    Ok(Arc::new(records))
                }
            })
            .await
            .unwrap_or_else(|EmptyListing| {
                debug!("Empty {} listing, not caching", kind.as_str());
                Arc::default()
            })
    }

    pub async fn all_packages(&self) -> Arc<Vec<PackageRecord>> {
        self.listing(QueryKind::Packages).await
    }

    pub async fn all_templates(&self) -> Arc<Vec<PackageRecord>> {
        self.listing(QueryKind::Templates).await
    }

    /// Published versions of `package_id` from the flat index, newest first.
    /// Empty when the index is unavailable.
    pub async fn flat_index_versions(&self, package_id: &str) -> Arc<Vec<String>> {
        let key = format!("versions:{}", package_id.to_lowercase());
        let registry = &self.flat_index;

        self.versions
            .get_or_create(&key, self.ttl, move || async move {
                registry.fetch_all_versions(package_id).await.map(Arc::new)
            })
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to fetch versions for {}: {}", package_id, e);
                Arc::default()
            })
    }

    /// Published versions listed in the legacy feed under `package_url`,
    /// in feed order
    pub async fn feed_versions(&self, package_url: &str) -> Result<Arc<Vec<String>>, RegistryError> {
        let key = format!("feed:{}", package_url);
        let registry = &self.atom_feed;

        self.versions
            .get_or_create(&key, self.ttl, move || async move {
                registry.fetch_all_versions(package_url).await.map(Arc::new)
            })
            .await
    }

    /// Attach published versions to each picked package, one lookup at a
    /// time. A package without a selected version gets the newest one.
    pub async fn enrich_versions(&self, packages: &mut [PackageRecord]) {
        for package in packages.iter_mut() {
            let versions = self.flat_index_versions(&package.package_id).await;

            if package.selected_version.is_none() {
                package.selected_version = versions.first().cloned();
            }
            package.package_versions = versions.as_ref().clone();
        }
    }
}

#[async_trait::async_trait]
impl VersionLookup for Catalog {
    async fn package_versions(&self, package_id: &str) -> Vec<String> {
        self.flat_index_versions(package_id).await.as_ref().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::source::MockMarketplaceSource;
    use crate::marketplace::types::MarketplacePage;
    use crate::version::clock::ManualClock;
    use crate::version::registry::MockRegistry;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;

    const TTL: Duration = Duration::from_secs(300);

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn single_page(ids: &[&str]) -> MarketplacePage {
        MarketplacePage {
            results: ids.iter().map(|id| Some(PackageRecord::new(id, id))).collect(),
            total_results: ids.len() as u64,
        }
    }

    fn no_registry() -> Arc<MockRegistry> {
        let mut registry = MockRegistry::new();
        registry.expect_fetch_all_versions().times(0);
        Arc::new(registry)
    }

    fn no_marketplace() -> Arc<MockMarketplaceSource> {
        let mut source = MockMarketplaceSource::new();
        source.expect_fetch_page().times(0);
        Arc::new(source)
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn listing_is_fetched_once_per_kind_within_ttl() {
        let mut source = MockMarketplaceSource::new();
        source
            .expect_fetch_page()
            .with(eq(QueryKind::Packages), eq(1), eq(50))
            .times(1)
            .returning(|_, _, _| Ok(single_page(&["Umbraco.Forms", "uSync"])));
        source
            .expect_fetch_page()
            .with(eq(QueryKind::Templates), eq(1), eq(50))
            .times(1)
            .returning(|_, _, _| Ok(single_page(&["Clean.Starter"])));

        let catalog = Catalog::new(Arc::new(source), no_registry(), no_registry(), TTL);

        assert_eq!(catalog.all_packages().await.len(), 2);
        assert_eq!(catalog.all_packages().await.len(), 2);
        assert_eq!(catalog.all_templates().await.len(), 1);
        assert_eq!(catalog.all_templates().await[0].package_id, "Clean.Starter");
    }

    #[tokio::test]
    async fn listing_is_refetched_after_ttl() {
        let mut source = MockMarketplaceSource::new();
        source
            .expect_fetch_page()
            .times(2)
            .returning(|_, _, _| Ok(single_page(&["uSync"])));

        let clock = clock();
        let catalog =
            Catalog::with_clock(Arc::new(source), no_registry(), no_registry(), TTL, clock.clone());

        catalog.all_packages().await;
        clock.advance(TTL);
        catalog.all_packages().await;
    }

    #[tokio::test]
    async fn empty_listing_is_not_cached() {
        let mut source = MockMarketplaceSource::new();
        source
            .expect_fetch_page()
            .times(2)
            .returning(|_, _, _| Err(RegistryError::InvalidResponse("down".to_string())));

        let catalog = Catalog::new(Arc::new(source), no_registry(), no_registry(), TTL);

        assert!(catalog.all_packages().await.is_empty());
        assert!(catalog.all_packages().await.is_empty());
    }

    #[tokio::test]
    async fn flat_index_versions_are_cached() {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_all_versions()
            .with(eq("Umbraco.Forms"))
            .times(1)
            .returning(|_| Ok(strings(&["14.1.0", "14.0.0"])));

        let catalog = Catalog::new(no_marketplace(), Arc::new(registry), no_registry(), TTL);

        let first = catalog.flat_index_versions("Umbraco.Forms").await;
        let second = catalog.flat_index_versions("Umbraco.Forms").await;

        assert_eq!(*first, strings(&["14.1.0", "14.0.0"]));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn flat_index_failure_yields_empty_and_is_retried() {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_all_versions()
            .times(2)
            .returning(|name| Err(RegistryError::NotFound(name.to_string())));

        let catalog = Catalog::new(no_marketplace(), Arc::new(registry), no_registry(), TTL);

        assert!(catalog.flat_index_versions("Missing").await.is_empty());
        assert!(catalog.flat_index_versions("Missing").await.is_empty());
    }

    #[tokio::test]
    async fn feed_versions_propagate_errors() {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_all_versions()
            .with(eq("https://example.test/packages/kit"))
            .times(1)
            .returning(|_| Err(RegistryError::InvalidResponse("bad xml".to_string())));

        let catalog = Catalog::new(no_marketplace(), no_registry(), Arc::new(registry), TTL);

        let result = catalog.feed_versions("https://example.test/packages/kit").await;

        assert!(matches!(result, Err(RegistryError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn feed_and_index_versions_use_separate_keys() {
        let mut index = MockRegistry::new();
        index
            .expect_fetch_all_versions()
            .times(1)
            .returning(|_| Ok(strings(&["2.0.0"])));
        let mut feed = MockRegistry::new();
        feed.expect_fetch_all_versions()
            .times(1)
            .returning(|_| Ok(strings(&["1.0.0"])));

        let catalog = Catalog::new(no_marketplace(), Arc::new(index), Arc::new(feed), TTL);

        assert_eq!(*catalog.flat_index_versions("kit").await, strings(&["2.0.0"]));
        assert_eq!(*catalog.feed_versions("kit").await.unwrap(), strings(&["1.0.0"]));
    }

    #[tokio::test]
    async fn enrich_versions_attaches_versions_and_selects_newest() {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_all_versions()
            .with(eq("Umbraco.Forms"))
            .times(1)
            .returning(|_| Ok(strings(&["14.1.0", "14.0.0"])));
        registry
            .expect_fetch_all_versions()
            .with(eq("uSync"))
            .times(1)
            .returning(|_| Ok(strings(&["14.0.2", "13.1.0"])));
        registry
            .expect_fetch_all_versions()
            .with(eq("Gone"))
            .times(1)
            .returning(|name| Err(RegistryError::NotFound(name.to_string())));

        let catalog = Catalog::new(no_marketplace(), Arc::new(registry), no_registry(), TTL);

        let mut picked = vec![
            PackageRecord::new("Umbraco.Forms", "Forms"),
            PackageRecord::new("uSync", "uSync"),
            PackageRecord::new("Gone", "Gone"),
        ];
        picked[1].selected_version = Some("13.1.0".to_string());

        catalog.enrich_versions(&mut picked).await;

        assert_eq!(picked[0].package_versions, strings(&["14.1.0", "14.0.0"]));
        assert_eq!(picked[0].selected_version.as_deref(), Some("14.1.0"));
        assert_eq!(picked[1].selected_version.as_deref(), Some("13.1.0"));
        assert!(picked[2].package_versions.is_empty());
        assert_eq!(picked[2].selected_version, None);
    }
}
