//! Sequential pager over the marketplace listing
//!
//! Pages are fetched strictly in order: the total is only known after the
//! first page, and each later page size depends on how many records have
//! been collected so far. The final page is shrunk to the exact remainder.
//!
//! Upstream failures end the walk early. The caller then receives whatever
//! was collected, which may be fewer than the reported total.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::marketplace::source::MarketplaceSource;
use crate::marketplace::types::{PackageRecord, QueryKind};

/// Progress of one aggregation walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingState {
    /// 1-based
    pub page_number: u32,
    pub page_size: u32,
    /// Reported by the first page
    pub total: u64,
    pub fetched: u64,
    pub tail_page: bool,
}

impl PagingState {
    fn new(page_size: u32) -> Self {
        Self {
            page_number: 1,
            page_size,
            total: 0,
            fetched: 0,
            tail_page: false,
        }
    }

    fn has_more(&self) -> bool {
        self.page_number == 1 || self.fetched < self.total
    }

    /// Shrink the page to the exact remainder when fewer records than a full
    /// page are left.
    fn prepare_page(&mut self) {
        if self.page_number == 1 {
            return;
        }

        let remaining = self.total.saturating_sub(self.fetched);
        if remaining < u64::from(self.page_size) {
            // remaining < page_size, so it fits in u32
            self.page_size = remaining as u32;
            self.tail_page = true;
        }
    }
}

pub struct MarketplaceAggregator {
    source: Arc<dyn MarketplaceSource>,
    page_size: u32,
}

impl MarketplaceAggregator {
    pub fn new(source: Arc<dyn MarketplaceSource>) -> Self {
        Self::with_page_size(source, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(source: Arc<dyn MarketplaceSource>, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
        }
    }

    /// Collect every record of `kind`, in upstream order
    ///
    /// Never fails: on an upstream error the records gathered so far are
    /// returned.
    pub async fn fetch_all(&self, kind: QueryKind) -> Vec<PackageRecord> {
        let mut state = PagingState::new(self.page_size);
        let mut records: Vec<PackageRecord> = Vec::new();

        while state.has_more() {
            state.prepare_page();

            let page = match self
                .source
                .fetch_page(kind, state.page_number, state.page_size)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "Failed to fetch {} page {}: {}. Returning {} of {} records",
                        kind.as_str(),
                        state.page_number,
                        e,
                        records.len(),
                        state.total
                    );
                    break;
                }
            };

            if state.page_number == 1 {
                state.total = page.total_results;
                debug!("Marketplace reports {} {}", state.total, kind.as_str());
            }

            let before = records.len();
            records.extend(page.results.into_iter().flatten());
            state.fetched = records.len() as u64;

            if state.tail_page {
                break;
            }

            // A page that adds nothing cannot make progress towards the total
            if records.len() == before && state.fetched < state.total {
                warn!(
                    "Empty {} page {} before reaching total {}; stopping at {}",
                    kind.as_str(),
                    state.page_number,
                    state.total,
                    state.fetched
                );
                break;
            }

            state.page_number += 1;
        }

        info!("Fetched {} {}", records.len(), kind.as_str());
        records
    }
}
