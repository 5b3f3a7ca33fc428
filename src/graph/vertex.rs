//! Graph vertex implementation

use crate::core::{Attributes, GroupKey};
use crate::group::Group;
use serde::{Deserialize, Serialize};

/// Graph vertex, one per distinct attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Grouping key
    pub key: GroupKey,
    /// Display label
    pub label: String,
    /// Number of features carrying the key
    pub feature_count: usize,
    /// Attributes of a representative feature
    pub attributes: Attributes,
}

impl Vertex {
    /// Create a bare vertex
    pub fn new(key: GroupKey) -> Self {
        Self {
            label: key.label(),
            key,
            feature_count: 0,
            attributes: Attributes::new(),
        }
    }
}

impl From<&Group> for Vertex {
    fn from(group: &Group) -> Self {
        Self {
            key: group.key.clone(),
            label: group.key.label(),
            feature_count: group.feature_count,
            attributes: group.attributes.clone(),
        }
    }
}
