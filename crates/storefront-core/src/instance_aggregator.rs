//! Folds one instance's stats outcome into the instance and its region.

use crate::model::{Region, HEAVY_LOAD_CPU_THRESHOLD};
use crate::stats::StatsOutcome;

/// Applies `outcome` to `region.instances[instance_index]`.
///
/// Returns `false` without touching anything when the index is out of
/// range. Region flags are not recomputed here; see
/// [`crate::region_aggregator::recompute_region_flags`].
pub fn apply_instance_stats(
    region: &mut Region,
    instance_index: usize,
    outcome: StatsOutcome,
) -> bool {
    let Some(instance) = region.instances.get_mut(instance_index) else {
        return false;
    };
    let StatsOutcome { payload, responded } = outcome;

    instance.not_responding = !responded;
    instance.is_refreshing = false;
    instance.heavy_load = payload
        .app_instance
        .cpu_utilization
        .is_some_and(|cpu| cpu >= HEAVY_LOAD_CPU_THRESHOLD);
    instance.workload_stats = payload
        .workload_stats
        .into_iter()
        .map(|(name, stat)| (name, stat.active_worker_limit))
        .collect();

    // Last writer wins: whichever instance answers reports the region total.
    if let Some(region_stats) = payload.storefront_stats.get(&region.region_name) {
        region.web_customer_count = region_stats.active_web_customer_count;
    }
    true
}
