//! Region status flags derived from the region's instances.

use crate::model::Region;

/// Rescans every instance and sets each region flag to the OR of the
/// matching instance flag. Flags are independent: a region can be
/// not-responding and heavy-loaded at once.
pub fn recompute_region_flags(region: &mut Region) {
    region.is_refreshing = region.instances.iter().any(|i| i.is_refreshing);
    region.not_responding = region.instances.iter().any(|i| i.not_responding);
    region.heavy_load = region.instances.iter().any(|i| i.heavy_load);
}

#[cfg(test)]
mod tests {
    use super::recompute_region_flags;
    use crate::model::{Instance, Region};

    fn region(instances: Vec<Instance>) -> Region {
        Region {
            region_name: "r".into(),
            instances,
            is_refreshing: true,
            heavy_load: true,
            not_responding: true,
            web_customer_count: 0,
            workloads: Vec::new(),
            instance_count_label: String::new(),
        }
    }

    #[test]
    fn flags_clear_when_no_instance_sets_them() {
        let mut r = region(vec![Instance::new("a", "u"), Instance::new("b", "u")]);
        recompute_region_flags(&mut r);
        assert!(!r.is_refreshing);
        assert!(!r.not_responding);
        assert!(!r.heavy_load);
    }

    #[test]
    fn flags_are_non_exclusive() {
        let mut down = Instance::new("a", "u");
        down.not_responding = true;
        let mut hot = Instance::new("b", "u");
        hot.heavy_load = true;
        let mut r = region(vec![down, hot, Instance::new("c", "u")]);
        recompute_region_flags(&mut r);
        assert!(r.not_responding);
        assert!(r.heavy_load);
        assert!(!r.is_refreshing);
    }

    #[test]
    fn empty_region_has_no_flags() {
        let mut r = region(Vec::new());
        recompute_region_flags(&mut r);
        assert!(!r.is_refreshing && !r.not_responding && !r.heavy_load);
    }
}
