//! Applies one fetch completion through every aggregation stage:
//! instance, then region, then the fleet-wide tallies.

use crate::error::UnknownInstance;
use crate::global_aggregator::{recalculate, GlobalSummary};
use crate::instance_aggregator::apply_instance_stats;
use crate::model::RegionData;
use crate::region_aggregator::recompute_region_flags;
use crate::stats::StatsCompletion;

pub fn apply_completion(
    data: &mut RegionData,
    completion: StatsCompletion,
) -> Result<GlobalSummary, UnknownInstance> {
    let key = completion.key;
    let region = data
        .regions
        .get_mut(key.region)
        .ok_or(UnknownInstance { key })?;
    if !apply_instance_stats(region, key.instance, completion.outcome) {
        return Err(UnknownInstance { key });
    }
    recompute_region_flags(region);
    Ok(recalculate(data))
}

#[cfg(test)]
mod tests {
    use super::apply_completion;
    use crate::model::InstanceKey;
    use crate::seed::load_region_data;
    use crate::stats::{StatsCompletion, StatsOutcome};

    #[test]
    fn unknown_key_is_an_error() {
        let mut data = match load_region_data(
            r#"{"regions": [{"regionName": "a", "instances": [{"uuid": "x", "url": "http://x"}]}]}"#,
        ) {
            Ok(value) => value,
            Err(err) => panic!("seed: {err}"),
        };
        let missing = StatsCompletion {
            key: InstanceKey {
                region: 0,
                instance: 3,
            },
            outcome: StatsOutcome::not_responding(),
        };
        assert!(apply_completion(&mut data, missing).is_err());

        let missing_region = StatsCompletion {
            key: InstanceKey {
                region: 2,
                instance: 0,
            },
            outcome: StatsOutcome::not_responding(),
        };
        assert!(apply_completion(&mut data, missing_region).is_err());
    }
}
