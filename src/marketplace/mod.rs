//! Marketplace package/template discovery
//!
//! - [`types`]: package records and page payloads
//! - [`source`]: single-page fetches from the marketplace API
//! - [`aggregator`]: sequential pager collecting every record

pub mod aggregator;
pub mod source;
pub mod types;

pub use aggregator::MarketplaceAggregator;
pub use source::{MarketplaceClient, MarketplaceSource};
pub use types::{MarketplacePage, PackageRecord, QueryKind};
