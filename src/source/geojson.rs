//! GeoJSON layer reader
//!
//! Accepts a `FeatureCollection` or a single `Feature`. Only `Polygon` and
//! `MultiPolygon` geometries are supported; the schema is the union of all
//! property names.
//!
//! Integers keep their exact value: anything that fits `i64` reads as
//! [`AttributeValue::Int`], larger unsigned values as [`AttributeValue::UInt`].
//! Array and object properties are not scalars; they read as
//! [`AttributeValue::Text`] holding their compact JSON, so two such values
//! group together only when their JSON text is identical.

use crate::core::{AttributeValue, Attributes, Error, Feature, FeatureId, Layer, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Read a layer from a GeoJSON file
pub fn read_layer(path: impl AsRef<Path>) -> Result<Layer> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let layer = parse_layer(&text)?;
    debug!("Read {} features from {:?}", layer.len(), path);
    Ok(layer)
}

/// Parse a layer from GeoJSON text
pub fn parse_layer(text: &str) -> Result<Layer> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| Error::invalid_input(format!("malformed GeoJSON: {}", e)))?;

    let features = match document.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let items = document
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| Error::invalid_input("FeatureCollection has no 'features' array"))?;
            items
                .iter()
                .enumerate()
                .map(|(index, item)| parse_feature(index, item))
                .collect::<Result<Vec<_>>>()?
        }
        Some("Feature") => vec![parse_feature(0, &document)?],
        Some(other) => {
            return Err(Error::invalid_input(format!(
                "unsupported GeoJSON document type '{}'",
                other
            )))
        }
        None => return Err(Error::invalid_input("GeoJSON document has no 'type'")),
    };

    Ok(Layer::from_features(features))
}

fn parse_feature(index: usize, value: &Value) -> Result<Feature> {
    if value.get("type").and_then(Value::as_str) != Some("Feature") {
        return Err(Error::invalid_input(format!("feature {} is not a GeoJSON Feature", index)));
    }

    let id: FeatureId = value
        .get("id")
        .and_then(Value::as_u64)
        .unwrap_or(index as FeatureId);

    let geometry = match value.get("geometry") {
        Some(Value::Object(geometry)) => parse_geometry(index, geometry)?,
        _ => return Err(Error::invalid_input(format!("feature {} has no geometry", index))),
    };

    let attributes = match value.get("properties") {
        Some(Value::Object(properties)) => parse_properties(index, properties)?,
        Some(Value::Null) | None => Attributes::new(),
        Some(_) => {
            return Err(Error::invalid_input(format!(
                "feature {} has non-object properties",
                index
            )))
        }
    };

    Ok(Feature { id, geometry, attributes })
}

fn parse_properties(index: usize, properties: &Map<String, Value>) -> Result<Attributes> {
    properties
        .iter()
        .map(|(name, value)| {
            let value = attribute_value(value).map_err(|e| {
                Error::invalid_input(format!("feature {} property '{}': {}", index, name, e))
            })?;
            Ok((name.clone(), value))
        })
        .collect()
}

/// Map a JSON property to an attribute value
pub fn attribute_value(value: &Value) -> Result<AttributeValue> {
    let value = match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttributeValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                AttributeValue::UInt(u)
            } else {
                let f = n
                    .as_f64()
                    .ok_or_else(|| Error::invalid_input(format!("number {} is not representable", n)))?;
                AttributeValue::Float(f)
            }
        }
        Value::String(s) => AttributeValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => AttributeValue::Text(value.to_string()),
    };
    Ok(value)
}

fn parse_geometry(index: usize, geometry: &Map<String, Value>) -> Result<MultiPolygon<f64>> {
    let kind = geometry.get("type").and_then(Value::as_str).unwrap_or("");
    let coordinates = geometry
        .get("coordinates")
        .ok_or_else(|| Error::invalid_input(format!("feature {} geometry has no coordinates", index)))?;

    match kind {
        "Polygon" => Ok(MultiPolygon(vec![parse_polygon(index, coordinates)?])),
        "MultiPolygon" => {
            let polygons = as_array(index, coordinates)?
                .iter()
                .map(|p| parse_polygon(index, p))
                .collect::<Result<Vec<_>>>()?;
            Ok(MultiPolygon(polygons))
        }
        other => Err(Error::invalid_input(format!(
            "feature {} has unsupported geometry type '{}' (only Polygon and MultiPolygon)",
            index, other
        ))),
    }
}

fn parse_polygon(index: usize, value: &Value) -> Result<Polygon<f64>> {
    let mut rings = as_array(index, value)?
        .iter()
        .map(|ring| parse_ring(index, ring))
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString(Vec::new()));
    Ok(Polygon::new(exterior, rings.collect()))
}

fn parse_ring(index: usize, value: &Value) -> Result<LineString<f64>> {
    let coords = as_array(index, value)?
        .iter()
        .map(|position| parse_position(index, position))
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString(coords))
}

fn parse_position(index: usize, value: &Value) -> Result<Coord<f64>> {
    let position = as_array(index, value)?;
    match (position.first().and_then(Value::as_f64), position.get(1).and_then(Value::as_f64)) {
        (Some(x), Some(y)) => Ok(Coord { x, y }),
        _ => Err(Error::invalid_input(format!("feature {} has a malformed position", index))),
    }
}

fn as_array(index: usize, value: &Value) -> Result<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::invalid_input(format!("feature {} has malformed coordinates", index)))
}
