//! Grouping of layer features by attribute value
//!
//! Every feature lands in exactly one group keyed by the typed value of the
//! grouping field, or is excluded under [`NullPolicy::Skip`]. Groups keep the
//! individual polygons; nothing is unioned.

use crate::core::{AttributeValue, Attributes, Error, Feature, FeatureId, GeometryError, GroupKey, Layer, NullPolicy, Result};
use crate::graph::index;
use crate::system::metrics::Metrics;
use geo::{BoundingRect, Polygon, Rect};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// One polygon of a grouped feature
#[derive(Debug, Clone)]
pub struct GroupMember {
    /// Feature the polygon came from
    pub feature_id: FeatureId,
    /// The polygon itself
    pub polygon: Polygon<f64>,
    /// Cached bounding rectangle of `polygon`
    pub bounds: Rect<f64>,
}

/// All polygons sharing one attribute value
#[derive(Debug, Clone)]
pub struct Group {
    /// Grouping key
    pub key: GroupKey,
    /// Member polygons in layer order
    pub members: Vec<GroupMember>,
    /// Union of the members' bounding rectangles
    pub bounds: Option<Rect<f64>>,
    /// Number of features in the group
    pub feature_count: usize,
    /// Attributes of the first feature in the group
    pub attributes: Attributes,
}

impl Group {
    fn new(key: GroupKey, mut attributes: Attributes) -> Self {
        // JSON has no NaN or infinity; store them as null so graphs reload
        for value in attributes.values_mut() {
            if value.is_non_finite() {
                *value = AttributeValue::Null;
            }
        }
        Self {
            key,
            members: Vec::new(),
            bounds: None,
            feature_count: 0,
            attributes,
        }
    }

    fn push_feature(&mut self, feature: &Feature) {
        self.feature_count += 1;
        for polygon in feature.polygons() {
            let Some(bounds) = polygon.bounding_rect() else {
                continue;
            };
            self.bounds = Some(match self.bounds {
                Some(current) => index::union(current, bounds),
                None => bounds,
            });
            self.members.push(GroupMember {
                feature_id: feature.id,
                polygon: polygon.clone(),
                bounds,
            });
        }
    }

    /// Check if the group holds no polygons
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Grouped layer, ordered by key
#[derive(Debug, Clone)]
pub struct Groups {
    /// Name of the grouping field
    pub field: String,
    /// Groups sorted by key
    pub groups: Vec<Group>,
    /// Features excluded by the null policy
    pub skipped: usize,
}

impl Groups {
    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if there are no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over groups in key order
    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    /// Find a group by key
    pub fn get(&self, key: &GroupKey) -> Option<&Group> {
        self.groups
            .binary_search_by(|g| g.key.cmp(key))
            .ok()
            .map(|i| &self.groups[i])
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.groups.iter().map(|g| &g.key)
    }
}

/// Partitions a layer into groups by attribute value
#[derive(Debug, Clone)]
pub struct Grouper {
    field: String,
    null_policy: NullPolicy,
}

impl Grouper {
    /// Group by `field`, skipping null values
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            null_policy: NullPolicy::Skip,
        }
    }

    /// Set the null policy
    pub fn with_null_policy(mut self, null_policy: NullPolicy) -> Self {
        self.null_policy = null_policy;
        self
    }

    /// Grouping field name
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Partition `layer` into groups
    pub fn group(&self, layer: &Layer) -> Result<Groups> {
        if self.field.trim().is_empty() {
            return Err(Error::invalid_input("attribute field name is empty"));
        }
        if layer.is_empty() {
            return Err(Error::invalid_input("layer has no features"));
        }
        if !layer.has_field(&self.field) {
            return Err(Error::invalid_input(format!(
                "field '{}' not found in layer (available: {})",
                self.field,
                layer.fields.join(", ")
            )));
        }

        let metrics = Metrics::global();
        let mut by_key: BTreeMap<GroupKey, Group> = BTreeMap::new();
        let mut skipped = 0usize;

        for feature in &layer.features {
            validate_geometry(feature)?;
            metrics.features_read.inc();

            let value = feature.attribute(&self.field);
            if value.is_non_finite() {
                return Err(Error::invalid_input(format!(
                    "feature {} has a non-finite value for field '{}'",
                    feature.id, self.field
                )));
            }

            let key = match (value.to_group_key(), self.null_policy) {
                (Some(key), _) => key,
                (None, NullPolicy::Unclassified) => GroupKey::Unclassified,
                (None, NullPolicy::Skip) => {
                    debug!(feature_id = feature.id, "Skipping feature with null '{}'", self.field);
                    metrics.features_skipped.inc();
                    skipped += 1;
                    continue;
                }
            };

            by_key
                .entry(key)
                .or_insert_with_key(|key| Group::new(key.clone(), feature.attributes.clone()))
                .push_feature(feature);
        }

        if skipped > 0 {
            warn!("Skipped {} feature(s) with no value for field '{}'", skipped, self.field);
        }
        if by_key.is_empty() {
            return Err(Error::invalid_input(format!(
                "no feature has a value for field '{}'",
                self.field
            )));
        }

        let groups: Vec<Group> = by_key.into_values().collect();
        metrics.groups_built.inc_by(groups.len() as u64);
        info!(
            "Grouped {} features into {} groups by '{}'",
            layer.len() - skipped,
            groups.len(),
            self.field
        );

        Ok(Groups {
            field: self.field.clone(),
            groups,
            skipped,
        })
    }
}

/// Reject empty geometry and non-finite coordinates
fn validate_geometry(feature: &Feature) -> std::result::Result<(), GeometryError> {
    let mut has_ring = false;
    for polygon in feature.polygons() {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for ring in rings {
            if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
                return Err(GeometryError::NonFinite { feature_id: feature.id });
            }
        }
        has_ring |= !polygon.exterior().0.is_empty();
    }

    if has_ring {
        Ok(())
    } else {
        Err(GeometryError::Empty { feature_id: feature.id })
    }
}
