#![allow(dead_code)]

pub mod marketplace;
pub mod registry;

pub use marketplace::{mock_marketplace_page, package_json};
pub use registry::{MockRegistry, create_test_catalog, lifecycle_record};
