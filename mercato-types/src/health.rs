//! Provider health records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success/error history of one provider as tracked by the health registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderHealth {
    /// Connector name.
    pub provider_id: String,
    /// Last call that returned data.
    pub last_success_time: Option<DateTime<Utc>>,
    /// Last call that failed with a provider fault.
    pub last_error_time: Option<DateTime<Utc>>,
    /// Faults since the last success or recovery reset.
    pub consecutive_error_count: u32,
    /// Live verdict used by provider selection.
    pub healthy: bool,
    /// Set while the single recovery trial is in flight; cleared by its outcome or release.
    pub half_open: bool,
}

impl ProviderHealth {
    /// A provider that has never been called.
    #[must_use]
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            last_success_time: None,
            last_error_time: None,
            consecutive_error_count: 0,
            healthy: true,
            half_open: false,
        }
    }
}
