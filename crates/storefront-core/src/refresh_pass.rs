//! Start of a refresh pass: decide which instances get a new request.

use crate::model::{InstanceKey, RegionData};
use crate::region_aggregator::recompute_region_flags;

/// Marks every idle instance as refreshing and returns the keys that need
/// a stats request. An instance whose previous request is still in flight
/// is skipped on its own; the rest of its region is still refreshed.
pub fn begin_refresh_pass(data: &mut RegionData) -> Vec<InstanceKey> {
    let mut keys = Vec::new();
    for (region_index, region) in data.regions.iter_mut().enumerate() {
        for (instance_index, instance) in region.instances.iter_mut().enumerate() {
            if instance.is_refreshing {
                continue;
            }
            instance.is_refreshing = true;
            keys.push(InstanceKey {
                region: region_index,
                instance: instance_index,
            });
        }
        recompute_region_flags(region);
    }
    keys
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::begin_refresh_pass;
    use crate::model::{Instance, InstanceKey, Region, RegionData};

    fn region(name: &str, uuids: &[&str]) -> Region {
        Region {
            region_name: name.to_string(),
            instances: uuids.iter().map(|u| Instance::new(*u, "http://x")).collect(),
            is_refreshing: false,
            heavy_load: false,
            not_responding: false,
            web_customer_count: 0,
            workloads: Vec::new(),
            instance_count_label: String::new(),
        }
    }

    #[test]
    fn first_pass_requests_every_instance() {
        let mut data = RegionData {
            regions: vec![region("a", &["1", "2"]), region("b", &["3"])],
            workloads: Vec::new(),
            region_summary_label: String::new(),
            product_info: Value::Null,
        };
        let keys = begin_refresh_pass(&mut data);
        assert_eq!(keys.len(), 3);
        assert!(data.regions.iter().all(|r| r.is_refreshing));
        assert_eq!(data.outstanding_requests(), 3);
    }

    #[test]
    fn in_flight_instance_is_skipped_without_skipping_its_neighbours() {
        let mut data = RegionData {
            regions: vec![region("a", &["1", "2", "3"])],
            workloads: Vec::new(),
            region_summary_label: String::new(),
            product_info: Value::Null,
        };
        data.regions[0].instances[0].is_refreshing = true;
        let keys = begin_refresh_pass(&mut data);
        assert_eq!(
            keys,
            vec![
                InstanceKey {
                    region: 0,
                    instance: 1
                },
                InstanceKey {
                    region: 0,
                    instance: 2
                },
            ]
        );
        assert!(begin_refresh_pass(&mut data).is_empty());
    }
}
