//! Aggregate tree for the control panel: regions own their instances, and
//! each region carries one counter per workload template.
//!
//! The tree is created once from seed data and then mutated in place by
//! the aggregators. It is owned by a single caller and passed by reference;
//! there is no shared or global copy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// CPU utilization (percent) at or above which an instance is heavy-loaded.
pub const HEAVY_LOAD_CPU_THRESHOLD: f64 = 90.0;

/// Position of an instance inside [`RegionData`]. Stable for the lifetime
/// of the tree because regions and instances are never reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey {
    pub region: usize,
    pub instance: usize,
}

/// Workload template metadata as published by the stats API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadInfo {
    pub name: String,
    /// Upper bound for the simulated user count, when the workload has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<i64>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// A workload template replicated as a counter of simulated users.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadCounter {
    pub workload: WorkloadInfo,
    pub active_worker_limit: u64,
}

impl WorkloadCounter {
    #[must_use]
    pub fn new(workload: WorkloadInfo) -> Self {
        Self {
            workload,
            active_worker_limit: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.workload.name
    }
}

/// One running deployment of the storefront.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub uuid: String,
    pub url: String,
    pub is_refreshing: bool,
    pub not_responding: bool,
    pub heavy_load: bool,
    /// Last reported simulated worker count per workload name.
    pub workload_stats: BTreeMap<String, u64>,
}

impl Instance {
    #[must_use]
    pub fn new(uuid: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            url: url.into(),
            is_refreshing: false,
            not_responding: false,
            heavy_load: false,
            workload_stats: BTreeMap::new(),
        }
    }
}

/// A named group of instances.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub region_name: String,
    pub instances: Vec<Instance>,
    pub is_refreshing: bool,
    pub heavy_load: bool,
    pub not_responding: bool,
    /// Real users, as last reported for this region by any instance.
    pub web_customer_count: u64,
    pub workloads: Vec<WorkloadCounter>,
    pub instance_count_label: String,
}

impl Region {
    /// Sum of real and simulated users currently attributed to the region.
    #[must_use]
    pub fn user_count(&self) -> u64 {
        self.workloads
            .iter()
            .fold(self.web_customer_count, |acc, w| {
                acc.saturating_add(w.active_worker_limit)
            })
    }
}

/// Aggregate root threaded through every aggregator call.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionData {
    pub regions: Vec<Region>,
    /// Fleet-wide counter per workload template, in template order.
    pub workloads: Vec<WorkloadCounter>,
    pub region_summary_label: String,
    pub product_info: Value,
}

impl RegionData {
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.regions.iter().map(|r| r.instances.len()).sum()
    }

    #[must_use]
    pub fn instance(&self, key: InstanceKey) -> Option<&Instance> {
        self.regions.get(key.region)?.instances.get(key.instance)
    }

    /// Keys of every instance, regions in order, instances in order.
    #[must_use]
    pub fn instance_keys(&self) -> Vec<InstanceKey> {
        self.regions
            .iter()
            .enumerate()
            .flat_map(|(region, r)| {
                (0..r.instances.len()).map(move |instance| InstanceKey { region, instance })
            })
            .collect()
    }

    #[must_use]
    pub fn find_instance(&self, uuid: &str) -> Option<InstanceKey> {
        self.instance_keys()
            .into_iter()
            .find(|key| self.instance(*key).is_some_and(|i| i.uuid == uuid))
    }

    /// Number of instances with a request still in flight.
    #[must_use]
    pub fn outstanding_requests(&self) -> usize {
        self.regions
            .iter()
            .flat_map(|r| r.instances.iter())
            .filter(|i| i.is_refreshing)
            .count()
    }
}
