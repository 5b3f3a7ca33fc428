//! Core type definitions for polygon-graph
//!
//! Features, their attribute values and the typed keys that vertices are
//! labelled with.

use geo::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Feature identifier within a layer
pub type FeatureId = u64;

/// Attribute map of a single feature, keyed by field name
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Scalar attribute value carried by a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Missing or explicit null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Unsigned integer above `i64::MAX`
    UInt(u64),
    /// Floating point value
    Float(f64),
    /// String value
    Text(String),
}

impl AttributeValue {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Check if this is a NaN or infinite float
    pub fn is_non_finite(&self) -> bool {
        matches!(self, AttributeValue::Float(f) if !f.is_finite())
    }

    /// Extract the grouping key for this value, `None` for null
    pub fn to_group_key(&self) -> Option<GroupKey> {
        match self {
            AttributeValue::Null => None,
            AttributeValue::Bool(b) => Some(GroupKey::Bool(*b)),
            AttributeValue::Int(i) => Some(GroupKey::Int(*i)),
            AttributeValue::UInt(u) => Some(GroupKey::UInt(*u)),
            AttributeValue::Float(f) => Some(GroupKey::Float(FloatKey::new(*f))),
            AttributeValue::Text(s) => Some(GroupKey::Text(s.clone())),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => AttributeValue::Int(i),
            Err(_) => AttributeValue::UInt(value),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// Float wrapper with total equality, ordering and hashing
///
/// `-0.0` and `0.0` are the same key and every NaN is the same key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloatKey(f64);

impl FloatKey {
    /// Wrap a float value
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// The wrapped value
    pub fn value(&self) -> f64 {
        self.0
    }

    fn canonical(&self) -> f64 {
        if self.0.is_nan() {
            f64::NAN
        } else if self.0 == 0.0 {
            0.0
        } else {
            self.0
        }
    }
}

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatKey {}

impl PartialOrd for FloatKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().total_cmp(&other.canonical())
    }
}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().to_bits().hash(state);
    }
}

/// Typed grouping key; one vertex per distinct key
///
/// `Unclassified` collects null-valued features when the null policy asks
/// for it and never equals a real attribute value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    /// Boolean key
    Bool(bool),
    /// Integer key
    Int(i64),
    /// Unsigned integer key above `i64::MAX`
    UInt(u64),
    /// Float key
    Float(FloatKey),
    /// String key
    Text(String),
    /// Features without a value for the grouping field
    Unclassified,
}

impl GroupKey {
    /// Human readable vertex label
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Bool(b) => write!(f, "{}", b),
            GroupKey::Int(i) => write!(f, "{}", i),
            GroupKey::UInt(u) => write!(f, "{}", u),
            // Debug keeps the fraction so `1.0` and `1` read differently
            GroupKey::Float(x) => write!(f, "{:?}", x.value()),
            GroupKey::Text(s) => f.write_str(s),
            GroupKey::Unclassified => f.write_str("<unclassified>"),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        GroupKey::Text(value.to_string())
    }
}

impl From<i64> for GroupKey {
    fn from(value: i64) -> Self {
        GroupKey::Int(value)
    }
}

/// Input record: one polygon geometry plus its attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature identifier
    pub id: FeatureId,
    /// Polygon geometry; a single polygon is a one-member multipolygon
    pub geometry: MultiPolygon<f64>,
    /// Attribute values by field name
    pub attributes: Attributes,
}

impl Feature {
    /// Create a feature without attributes
    pub fn new(id: FeatureId, geometry: impl Into<MultiPolygon<f64>>) -> Self {
        Self {
            id,
            geometry: geometry.into(),
            attributes: Attributes::new(),
        }
    }

    /// Set an attribute value
    pub fn with_attribute(mut self, field: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }

    /// Value of `field`, treating an absent field as null
    pub fn attribute(&self, field: &str) -> &AttributeValue {
        static NULL: AttributeValue = AttributeValue::Null;
        self.attributes.get(field).unwrap_or(&NULL)
    }

    /// Iterate over the member polygons
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon<f64>> {
        self.geometry.0.iter()
    }
}

/// A vector layer: field schema plus features
#[derive(Debug, Clone, Default)]
pub struct Layer {
    /// Field names in schema order
    pub fields: Vec<String>,
    /// Features in layer order
    pub features: Vec<Feature>,
}

impl Layer {
    /// Create a layer with an explicit schema
    pub fn new(fields: Vec<String>, features: Vec<Feature>) -> Self {
        Self { fields, features }
    }

    /// Create a layer whose schema is the union of the features' attribute
    /// names, in first-seen order
    pub fn from_features(features: Vec<Feature>) -> Self {
        let mut fields: Vec<String> = Vec::new();
        for feature in &features {
            for name in feature.attributes.keys() {
                if !fields.iter().any(|f| f == name) {
                    fields.push(name.clone());
                }
            }
        }
        Self { fields, features }
    }

    /// Check if the schema contains `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if the layer has no features
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
