//! Payload returned by `GET {instanceUrl}/api/stats?includeStorefront=true`
//! and the completion messages built from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::InstanceKey;

/// Query path appended to an instance URL to read its stats.
pub const STATS_PATH: &str = "/api/stats?includeStorefront=true";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub app_instance: AppInstanceStats,
    /// Real-user counts keyed by region name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub storefront_stats: BTreeMap<String, StorefrontRegionStats>,
    /// Simulated-user counts keyed by workload name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub workload_stats: BTreeMap<String, WorkloadStat>,
}

impl StatsPayload {
    /// Empty payload substituted when an instance does not answer:
    /// `{appInstance:{}, storefrontStats:{}, workloadStats:{}}`.
    #[must_use]
    pub fn sentinel() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInstanceStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_utilization: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontRegionStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_web_customer_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStat {
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_worker_limit: u64,
}

/// An instance that answers with `null` for a section has nothing to
/// report there; it still responded.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Result of one stats poll. Failures never surface as errors; they arrive
/// here as the sentinel payload with `responded == false`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsOutcome {
    pub payload: StatsPayload,
    pub responded: bool,
}

impl StatsOutcome {
    #[must_use]
    pub fn responded(payload: StatsPayload) -> Self {
        Self {
            payload,
            responded: true,
        }
    }

    #[must_use]
    pub fn not_responding() -> Self {
        Self {
            payload: StatsPayload::sentinel(),
            responded: false,
        }
    }
}

/// Message posted by a fetch task to the aggregator loop.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsCompletion {
    pub key: InstanceKey,
    pub outcome: StatsOutcome,
}
