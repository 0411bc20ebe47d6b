//! Package discovery, version resolution and script validation for
//! project scaffolding.
//!
//! - [`marketplace`]: paginated package/template aggregation
//! - [`version`]: TTL cache, version registries and the LTS resolver
//! - [`catalog`]: cached lookups composed from the above
//! - [`script`]: allowlist validation of generated install scripts

pub mod catalog;
pub mod config;
pub mod logging;
pub mod marketplace;
pub mod script;
pub mod version;
