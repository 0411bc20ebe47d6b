//! Support lifecycle table consumed by the LTS resolver

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Release track label of a long-term-support major version
pub const LTS_TRACK: &str = "LTS";

/// Support lifecycle of one major version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportLifecycleRecord {
    pub major_version: u32,
    pub release_date: NaiveDate,
    /// "LTS" or another track label (e.g. "STS")
    pub release_type: String,
    /// End of active support
    pub support_phase: NaiveDate,
    /// End of security-fix support
    pub security_phase: NaiveDate,
    pub end_of_life: NaiveDate,
}

impl SupportLifecycleRecord {
    pub fn is_lts(&self) -> bool {
        self.release_type == LTS_TRACK
    }

    /// Released before `reference` and still receiving security fixes on it
    pub fn is_supported_at(&self, reference: NaiveDate) -> bool {
        self.release_date < reference && self.security_phase >= reference
    }
}
