//! Recommended long-term-support version resolution
//!
//! Combines the static support lifecycle table with the live list of
//! published versions of the tracked template package.

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{debug, info};

use crate::version::clock::{Clock, SystemClock};
use crate::version::lifecycle::SupportLifecycleRecord;

/// Source of a package's published versions, newest first
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionLookup: Send + Sync {
    /// Published versions of `package_id`; empty when unknown or unavailable
    async fn package_versions(&self, package_id: &str) -> Vec<String>;
}

pub struct LtsResolver {
    lookup: Arc<dyn VersionLookup>,
    clock: Arc<dyn Clock>,
    tracked_package: String,
}

impl LtsResolver {
    pub fn new(lookup: Arc<dyn VersionLookup>, tracked_package: &str) -> Self {
        Self::with_clock(lookup, tracked_package, Arc::new(SystemClock))
    }

    pub fn with_clock(
        lookup: Arc<dyn VersionLookup>,
        tracked_package: &str,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            lookup,
            clock,
            tracked_package: tracked_package.to_string(),
        }
    }

    /// Latest stable published version of the current LTS major version
    ///
    /// Returns `None` when the table is empty, no LTS major is currently
    /// supported, or no stable version of that major has been published.
    pub async fn latest_lts(&self, lifecycle: &[SupportLifecycleRecord]) -> Option<String> {
        if lifecycle.is_empty() {
            debug!("No lifecycle records configured");
            return None;
        }

        let reference = reference_date(self.clock.now())?;
        let major = select_lts_major(lifecycle, reference)?;
        debug!("Current LTS major version is {}", major);

        let versions = self.lookup.package_versions(&self.tracked_package).await;
        let latest = latest_stable_for_major(&versions, major);

        if let Some(version) = &latest {
            info!("Resolved LTS version {} of {}", version, self.tracked_package);
        }
        latest
    }
}

/// Start of the next local calendar day, so a release effective today counts
pub fn reference_date(now: DateTime<Utc>) -> Option<NaiveDate> {
    now.with_timezone(&Local).date_naive().succ_opt()
}

/// Last LTS record, in table order, that is released and within security
/// support at `reference`
pub fn select_lts_major(
    lifecycle: &[SupportLifecycleRecord],
    reference: NaiveDate,
) -> Option<u32> {
    lifecycle
        .iter()
        .filter(|record| record.is_lts() && record.is_supported_at(reference))
        .last()
        .map(|record| record.major_version)
}

/// First version (in the given order) of `major` without a pre-release marker
pub fn latest_stable_for_major(versions: &[String], major: u32) -> Option<String> {
    let prefix = format!("{}.", major);
    let bare = major.to_string();

    versions
        .iter()
        .find(|v| (v.starts_with(&prefix) || **v == bare) && !v.contains('-'))
        .cloned()
}
