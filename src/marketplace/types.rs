//! Common types for marketplace queries

use serde::{Deserialize, Deserializer, Serialize};

/// Shape of a marketplace listing query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Installable packages
    Packages,
    /// Packages in the template category
    Templates,
}

impl QueryKind {
    /// Returns the string representation of the query kind
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Packages => "packages",
            QueryKind::Templates => "templates",
        }
    }

    /// Query-string filters selecting this kind
    pub fn filters(&self) -> &'static str {
        match self {
            QueryKind::Packages => "orderBy=MostDownloads",
            QueryKind::Templates => "orderBy=MostDownloads&category=Templates",
        }
    }
}

/// A package listed on the marketplace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    #[serde(alias = "id")]
    pub package_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub downloads: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Major versions of the host product this package supports
    #[serde(default, deserialize_with = "null_as_default")]
    pub supported_major_versions: Vec<u32>,
    /// Published versions, newest first; filled by version enrichment
    #[serde(default, skip_deserializing)]
    pub package_versions: Vec<String>,
    #[serde(default, skip_deserializing)]
    pub selected_version: Option<String>,
}

impl PackageRecord {
    pub fn new(package_id: &str, title: &str) -> Self {
        Self {
            package_id: package_id.to_string(),
            title: title.to_string(),
            downloads: 0,
            tags: Vec::new(),
            supported_major_versions: Vec::new(),
            package_versions: Vec::new(),
            selected_version: None,
        }
    }
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a marketplace listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplacePage {
    /// Records on this page; the API may emit `null` placeholders
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Option<PackageRecord>>,
    /// Total number of records across all pages
    pub total_results: u64,
}
