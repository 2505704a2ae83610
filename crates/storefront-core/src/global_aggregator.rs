//! Fleet-wide tallies over every region.
//!
//! Two independent passes: instance status classification, and user
//! counts (real users per region, simulated users per workload). Workload
//! counters are zeroed and rebuilt on every call.

use crate::model::RegionData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstanceStatusTally {
    pub active: usize,
    pub heavy_load: usize,
    pub not_responding: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadTotal {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCountTally {
    pub total_simulated_users: u64,
    pub total_real_users: u64,
    /// Largest per-region (real + simulated) total, never below 1.
    pub max_region_user_count: u64,
    pub workload_totals: Vec<WorkloadTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSummary {
    pub instances: InstanceStatusTally,
    pub users: UserCountTally,
}

/// Classifies every instance exactly once: not-responding first, then
/// heavy-load, otherwise active.
#[must_use]
pub fn tally_instance_status(data: &RegionData) -> InstanceStatusTally {
    let mut tally = InstanceStatusTally::default();
    for instance in data.regions.iter().flat_map(|r| r.instances.iter()) {
        if instance.not_responding {
            tally.not_responding += 1;
        } else if instance.heavy_load {
            tally.heavy_load += 1;
        } else {
            tally.active += 1;
        }
    }
    tally
}

/// Rebuilds region and fleet workload counters from instance stats and
/// returns the user totals.
pub fn tally_user_counts(data: &mut RegionData) -> UserCountTally {
    let mut total_simulated_users: u64 = 0;
    let mut total_real_users: u64 = 0;
    let mut max_region_user_count: u64 = 0;

    for global in &mut data.workloads {
        global.active_worker_limit = 0;
    }

    for region in &mut data.regions {
        total_real_users = total_real_users.saturating_add(region.web_customer_count);
        let mut region_user_count = region.web_customer_count;

        for workload in &mut region.workloads {
            let count = region
                .instances
                .iter()
                .filter_map(|instance| instance.workload_stats.get(workload.name()))
                .fold(0u64, |acc, n| acc.saturating_add(*n));
            workload.active_worker_limit = count;
            region_user_count = region_user_count.saturating_add(count);
            total_simulated_users = total_simulated_users.saturating_add(count);

            if let Some(global) = data
                .workloads
                .iter_mut()
                .find(|g| g.workload.name == workload.workload.name)
            {
                global.active_worker_limit = global.active_worker_limit.saturating_add(count);
            }
        }

        max_region_user_count = max_region_user_count.max(region_user_count);
    }

    UserCountTally {
        total_simulated_users,
        total_real_users,
        max_region_user_count: max_region_user_count.max(1),
        workload_totals: data
            .workloads
            .iter()
            .map(|w| WorkloadTotal {
                name: w.workload.name.clone(),
                count: w.active_worker_limit,
            })
            .collect(),
    }
}

/// Runs both passes.
pub fn recalculate(data: &mut RegionData) -> GlobalSummary {
    let instances = tally_instance_status(data);
    let users = tally_user_counts(data);
    GlobalSummary { instances, users }
}
