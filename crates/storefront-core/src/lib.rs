//! storefront-core: aggregate model and projections for the storefront
//! control panel.
//!
//! Holds the region/instance tree seeded at startup, the stats payload
//! shapes returned by instance endpoints, the aggregators that fold fetch
//! results into region and fleet summaries, and the presenter that turns
//! the aggregate into display widgets. Everything here is synchronous and
//! owned by a single caller; transport lives in `storefront-poller`.

pub mod completion;
pub mod error;
pub mod format;
pub mod global_aggregator;
pub mod instance_aggregator;
pub mod model;
pub mod presenter;
pub mod refresh_pass;
pub mod region_aggregator;
pub mod seed;
pub mod stats;
pub mod workload_form;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "storefront-core"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "storefront-core");
    }

    #[test]
    fn modules_are_accessible() {
        let _ = presenter::StatusBadge::Refreshing;
        let _ = stats::StatsPayload::sentinel();
        let _ = model::InstanceKey {
            region: 0,
            instance: 0,
        };
        let _ = format::pluralize(2, "region");
    }
}
