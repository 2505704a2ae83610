//! Seed document handed to the console at startup and the construction of
//! the aggregate tree from it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::Value;

use crate::error::SeedError;
use crate::format::pluralize;
use crate::model::{Instance, Region, RegionData, WorkloadCounter, WorkloadInfo};

/// `{regions: [...], productInfo: {...}, stats: {workloadStats: {...}}}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDocument {
    pub regions: Vec<SeedRegion>,
    #[serde(default)]
    pub product_info: Value,
    #[serde(default)]
    pub stats: SeedStats,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRegion {
    pub region_name: String,
    #[serde(default)]
    pub instances: Vec<SeedInstance>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedInstance {
    pub uuid: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedStats {
    #[serde(default)]
    pub workload_stats: BTreeMap<String, SeedWorkloadStat>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedWorkloadStat {
    pub workload: WorkloadInfo,
    #[serde(default)]
    pub active_worker_limit: u64,
}

pub fn parse_seed(raw: &str) -> Result<SeedDocument, SeedError> {
    Ok(serde_json::from_str(raw)?)
}

/// Workload templates sorted by workload name.
#[must_use]
pub fn workload_templates(stats: &SeedStats) -> Vec<WorkloadInfo> {
    let mut templates: Vec<WorkloadInfo> = stats
        .workload_stats
        .values()
        .map(|stat| stat.workload.clone())
        .collect();
    templates.sort_by(|a, b| a.name.cmp(&b.name));
    templates
}

/// Builds the aggregate root. Regions keep the order the server supplied.
pub fn initialize_region_data(seed: SeedDocument) -> Result<RegionData, SeedError> {
    let templates = workload_templates(&seed.stats);
    let mut seen_regions = BTreeSet::new();
    let mut seen_instances = BTreeSet::new();
    let mut regions = Vec::with_capacity(seed.regions.len());

    for (index, seed_region) in seed.regions.into_iter().enumerate() {
        let region_name = seed_region.region_name.trim().to_string();
        if region_name.is_empty() {
            return Err(SeedError::MissingRegionName { index });
        }
        if !seen_regions.insert(region_name.clone()) {
            return Err(SeedError::DuplicateRegion { region_name });
        }

        let mut instances = Vec::with_capacity(seed_region.instances.len());
        for (idx, seed_instance) in seed_region.instances.into_iter().enumerate() {
            let uuid = seed_instance.uuid.trim().to_string();
            if uuid.is_empty() {
                return Err(SeedError::MissingInstanceUuid {
                    region_name,
                    index: idx,
                });
            }
            let url = seed_instance.url.trim().trim_end_matches('/').to_string();
            if url.is_empty() {
                return Err(SeedError::MissingInstanceUrl { region_name, uuid });
            }
            if !seen_instances.insert(uuid.clone()) {
                return Err(SeedError::DuplicateInstance { uuid });
            }
            instances.push(Instance::new(uuid, url));
        }

        regions.push(Region {
            instance_count_label: pluralize(instances.len() as u64, "instance"),
            region_name,
            instances,
            is_refreshing: false,
            heavy_load: false,
            not_responding: false,
            web_customer_count: 0,
            workloads: templates.iter().cloned().map(WorkloadCounter::new).collect(),
        });
    }

    let instance_count: usize = regions.iter().map(|r| r.instances.len()).sum();
    let region_summary_label = format!(
        "{} across {}",
        pluralize(instance_count as u64, "Storefront instance"),
        pluralize(regions.len() as u64, "region")
    );

    Ok(RegionData {
        regions,
        workloads: templates.into_iter().map(WorkloadCounter::new).collect(),
        region_summary_label,
        product_info: seed.product_info,
    })
}

/// Parses and initializes in one step.
pub fn load_region_data(raw: &str) -> Result<RegionData, SeedError> {
    initialize_region_data(parse_seed(raw)?)
}

#[cfg(test)]
mod tests {
    use super::{initialize_region_data, load_region_data, parse_seed};
    use crate::error::SeedError;

    const SEED: &str = r#"{
        "regions": [
            {"regionName": "us-west", "instances": [
                {"uuid": "w1", "url": "http://w1:8080/storefront/"}
            ]},
            {"regionName": "us-east", "instances": [
                {"uuid": "e1", "url": "http://e1:8080/storefront"},
                {"uuid": "e2", "url": "http://e2:8080/storefront", "cpuUtilization": 3}
            ]}
        ],
        "productInfo": {"productCount": 120, "categories": 8},
        "stats": {"workloadStats": {
            "multi-shop": {"workload": {"name": "multi-shop", "maxWorkers": 50}, "activeWorkerLimit": 2},
            "browse": {"workload": {"name": "browse", "avgThinkTimeMs": 500}, "activeWorkerLimit": 0}
        }}
    }"#;

    #[test]
    fn regions_keep_server_order_and_get_labels() {
        let data = match load_region_data(SEED) {
            Ok(value) => value,
            Err(err) => panic!("seed: {err}"),
        };
        let names: Vec<&str> = data
            .regions
            .iter()
            .map(|r| r.region_name.as_str())
            .collect();
        assert_eq!(names, vec!["us-west", "us-east"]);
        assert_eq!(data.regions[0].instance_count_label, "1 instance");
        assert_eq!(data.regions[1].instance_count_label, "2 instances");
        assert_eq!(
            data.region_summary_label,
            "3 Storefront instances across 2 regions"
        );
        assert_eq!(data.regions[0].instances[0].url, "http://w1:8080/storefront");
    }

    #[test]
    fn workload_counters_are_sorted_zeroed_and_replicated() {
        let data = match load_region_data(SEED) {
            Ok(value) => value,
            Err(err) => panic!("seed: {err}"),
        };
        for region in &data.regions {
            let names: Vec<&str> = region.workloads.iter().map(|w| w.name()).collect();
            assert_eq!(names, vec!["browse", "multi-shop"]);
            assert!(region.workloads.iter().all(|w| w.active_worker_limit == 0));
            assert_eq!(region.web_customer_count, 0);
        }
        assert_eq!(data.workloads.len(), 2);
        assert_eq!(data.workloads[1].workload.max_workers, Some(50));
        assert_eq!(
            data.workloads[0].workload.metadata.get("avgThinkTimeMs"),
            Some(&serde_json::json!(500))
        );
    }

    #[test]
    fn duplicate_instance_is_rejected() {
        let raw = r#"{"regions": [
            {"regionName": "a", "instances": [{"uuid": "x", "url": "http://x"}]},
            {"regionName": "b", "instances": [{"uuid": "x", "url": "http://y"}]}
        ]}"#;
        let seed = match parse_seed(raw) {
            Ok(value) => value,
            Err(err) => panic!("parse: {err}"),
        };
        assert!(matches!(
            initialize_region_data(seed),
            Err(SeedError::DuplicateInstance { .. })
        ));
    }

    #[test]
    fn empty_region_name_is_rejected() {
        let raw = r#"{"regions": [{"regionName": " ", "instances": []}]}"#;
        assert!(matches!(
            load_region_data(raw),
            Err(SeedError::MissingRegionName { index: 0 })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            load_region_data("{\"regions\": 3}"),
            Err(SeedError::Parse(_))
        ));
    }
}
