//! Graph edge implementation

use crate::core::GroupKey;
use serde::{Deserialize, Serialize};

/// Undirected edge between two distinct vertices
///
/// Always stored with `source < target`, so `{A, B}` and `{B, A}` are the
/// same value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Smaller endpoint
    pub source: GroupKey,
    /// Larger endpoint
    pub target: GroupKey,
}

impl Edge {
    /// Create a canonical edge, `None` for a self-loop
    pub fn new(a: GroupKey, b: GroupKey) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { source: a, target: b }),
            std::cmp::Ordering::Greater => Some(Self { source: b, target: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Check if `key` is an endpoint
    pub fn touches(&self, key: &GroupKey) -> bool {
        &self.source == key || &self.target == key
    }

    /// The endpoint opposite `key`
    pub fn other(&self, key: &GroupKey) -> Option<&GroupKey> {
        if &self.source == key {
            Some(&self.target)
        } else if &self.target == key {
            Some(&self.source)
        } else {
            None
        }
    }
}
