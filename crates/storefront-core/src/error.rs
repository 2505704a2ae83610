//! Error types for seed loading and completion routing.

use crate::model::InstanceKey;

/// Failure to build the aggregate tree from seed input.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("parse seed document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("region {index} has an empty regionName")]
    MissingRegionName { index: usize },
    #[error("duplicate region {region_name:?}")]
    DuplicateRegion { region_name: String },
    #[error("instance {index} in region {region_name:?} has an empty uuid")]
    MissingInstanceUuid { region_name: String, index: usize },
    #[error("instance {uuid:?} in region {region_name:?} has an empty url")]
    MissingInstanceUrl { region_name: String, uuid: String },
    #[error("duplicate instance {uuid:?}")]
    DuplicateInstance { uuid: String },
}

/// A completion addressed an instance the aggregate does not own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no instance at region {} index {}", .key.region, .key.instance)]
pub struct UnknownInstance {
    pub key: InstanceKey,
}
