//! Projection of the aggregate onto display widgets.
//!
//! Nothing here mutates aggregator state. The view holds status badges,
//! proportional bar segments with tooltips, and count labels.

use serde_json::Value;

use crate::format::{format_count, pluralize, tooltip_with_count};
use crate::global_aggregator::GlobalSummary;
use crate::model::{Instance, Region, RegionData};

/// Label of the bar segment that counts real users.
pub const WEB_USER_SEGMENT_LABEL: &str = "Web browser user";

/// Visual status of a region or instance. Exactly one applies, chosen in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBadge {
    Refreshing,
    NotResponding,
    HeavyLoad,
    Success,
}

impl StatusBadge {
    #[must_use]
    pub fn resolve(is_refreshing: bool, not_responding: bool, heavy_load: bool) -> Self {
        if is_refreshing {
            Self::Refreshing
        } else if not_responding {
            Self::NotResponding
        } else if heavy_load {
            Self::HeavyLoad
        } else {
            Self::Success
        }
    }

    #[must_use]
    pub fn for_region(region: &Region) -> Self {
        Self::resolve(region.is_refreshing, region.not_responding, region.heavy_load)
    }

    #[must_use]
    pub fn for_instance(instance: &Instance) -> Self {
        Self::resolve(
            instance.is_refreshing,
            instance.not_responding,
            instance.heavy_load,
        )
    }

    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Refreshing => "label-refreshing",
            Self::NotResponding => "label-important",
            Self::HeavyLoad => "label-warning",
            Self::Success => "label-success",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Refreshing => "refreshing",
            Self::NotResponding => "not responding",
            Self::HeavyLoad => "heavy load",
            Self::Success => "ok",
        }
    }
}

impl std::fmt::Display for StatusBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSegment {
    pub label: String,
    pub count: u64,
    /// Share of the busiest region, in percent.
    pub width_percent: f64,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRow {
    pub uuid: String,
    pub url: String,
    pub badge: StatusBadge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionPanel {
    pub region_name: String,
    pub badge: StatusBadge,
    pub instance_count_label: String,
    pub user_count: u64,
    pub user_count_label: String,
    /// One segment per workload, then the web browser user segment.
    pub segments: Vec<BarSegment>,
    pub instances: Vec<InstanceRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadLabel {
    pub name: String,
    pub count: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub region_summary_label: String,
    pub product_info: Vec<(String, String)>,
    pub active_label: String,
    pub heavy_load_label: String,
    pub not_responding_label: String,
    pub workload_labels: Vec<WorkloadLabel>,
    pub simulated_users_label: String,
    pub real_users_label: String,
    pub web_user_count_label: String,
    pub regions: Vec<RegionPanel>,
}

#[must_use]
pub fn bar_segment(label: &str, count: u64, max_region_user_count: u64) -> BarSegment {
    let scale = max_region_user_count.max(1) as f64;
    BarSegment {
        label: label.to_string(),
        count,
        width_percent: count as f64 / scale * 100.0,
        tooltip: tooltip_with_count(label, count),
    }
}

#[must_use]
pub fn region_panel(region: &Region, max_region_user_count: u64) -> RegionPanel {
    let mut segments: Vec<BarSegment> = region
        .workloads
        .iter()
        .map(|w| bar_segment(w.name(), w.active_worker_limit, max_region_user_count))
        .collect();
    segments.push(bar_segment(
        WEB_USER_SEGMENT_LABEL,
        region.web_customer_count,
        max_region_user_count,
    ));

    let user_count = region.user_count();
    RegionPanel {
        region_name: region.region_name.clone(),
        badge: StatusBadge::for_region(region),
        instance_count_label: region.instance_count_label.clone(),
        user_count,
        user_count_label: format_count(user_count),
        segments,
        instances: region
            .instances
            .iter()
            .map(|i| InstanceRow {
                uuid: i.uuid.clone(),
                url: i.url.clone(),
                badge: StatusBadge::for_instance(i),
            })
            .collect(),
    }
}

#[must_use]
pub fn present(data: &RegionData, summary: &GlobalSummary) -> DashboardView {
    let users = &summary.users;
    DashboardView {
        region_summary_label: data.region_summary_label.clone(),
        product_info: product_info_lines(&data.product_info),
        active_label: summary.instances.active.to_string(),
        heavy_load_label: summary.instances.heavy_load.to_string(),
        not_responding_label: summary.instances.not_responding.to_string(),
        workload_labels: users
            .workload_totals
            .iter()
            .map(|w| WorkloadLabel {
                name: w.name.clone(),
                count: w.count,
                text: format_count(w.count),
            })
            .collect(),
        simulated_users_label: pluralize(users.total_simulated_users, "simulated user"),
        real_users_label: pluralize(users.total_real_users, "real user"),
        web_user_count_label: format_count(users.total_real_users),
        regions: data
            .regions
            .iter()
            .map(|r| region_panel(r, users.max_region_user_count))
            .collect(),
    }
}

fn product_info_lines(info: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = info else {
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => "-".to_string(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{bar_segment, StatusBadge};

    #[test]
    fn badge_priority_is_strict() {
        assert_eq!(
            StatusBadge::resolve(true, true, true),
            StatusBadge::Refreshing
        );
        assert_eq!(
            StatusBadge::resolve(false, true, true),
            StatusBadge::NotResponding
        );
        assert_eq!(
            StatusBadge::resolve(false, false, true),
            StatusBadge::HeavyLoad
        );
        assert_eq!(
            StatusBadge::resolve(false, false, false),
            StatusBadge::Success
        );
    }

    #[test]
    fn badge_css_classes() {
        assert_eq!(StatusBadge::Refreshing.css_class(), "label-refreshing");
        assert_eq!(StatusBadge::NotResponding.css_class(), "label-important");
        assert_eq!(StatusBadge::HeavyLoad.css_class(), "label-warning");
        assert_eq!(StatusBadge::Success.css_class(), "label-success");
    }

    #[test]
    fn segment_width_is_share_of_max() {
        let seg = bar_segment("checkout", 8, 32);
        assert!((seg.width_percent - 25.0).abs() < f64::EPSILON);
        assert_eq!(seg.tooltip, "checkout (8)");
    }

    #[test]
    fn zero_max_is_treated_as_one() {
        let seg = bar_segment("browse", 0, 0);
        assert!(seg.width_percent.abs() < f64::EPSILON);
    }
}
