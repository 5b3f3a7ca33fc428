//! Graph encoding and decoding
//!
//! Three formats share the same serde model of [`Graph`]. Decoding checks
//! `format_version` before handing the graph back.

use crate::core::{OutputFormat, Result, SerializationError};
use crate::graph::{Graph, GRAPH_FORMAT_VERSION};
use std::path::Path;

/// Concrete on-disk format of a graph file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    /// Pretty printed JSON
    Json,
    /// MessagePack with named fields
    MessagePack,
    /// Bincode
    Bincode,
}

impl GraphFormat {
    /// Infer the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("msgpack") | Some("mp") => GraphFormat::MessagePack,
            Some("bin") | Some("bincode") => GraphFormat::Bincode,
            _ => GraphFormat::Json,
        }
    }

    /// Resolve a configured format against an output path
    pub fn resolve(format: OutputFormat, path: &Path) -> Self {
        match format {
            OutputFormat::Auto => Self::from_path(path),
            OutputFormat::Json => GraphFormat::Json,
            OutputFormat::Msgpack => GraphFormat::MessagePack,
            OutputFormat::Bincode => GraphFormat::Bincode,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            GraphFormat::Json => "json",
            GraphFormat::MessagePack => "msgpack",
            GraphFormat::Bincode => "bincode",
        }
    }
}

/// Encode a graph
pub fn encode(graph: &Graph, format: GraphFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        GraphFormat::Json => serde_json::to_vec_pretty(graph).map_err(SerializationError::from)?,
        GraphFormat::MessagePack => rmp_serde::to_vec_named(graph).map_err(SerializationError::from)?,
        GraphFormat::Bincode => bincode::serialize(graph).map_err(SerializationError::from)?,
    };
    Ok(bytes)
}

/// Decode a graph and check its layout version
pub fn decode(bytes: &[u8], format: GraphFormat) -> Result<Graph> {
    let graph: Graph = match format {
        GraphFormat::Json => serde_json::from_slice(bytes).map_err(SerializationError::from)?,
        GraphFormat::MessagePack => rmp_serde::from_slice(bytes).map_err(SerializationError::from)?,
        GraphFormat::Bincode => bincode::deserialize(bytes).map_err(SerializationError::from)?,
    };

    if graph.format_version != GRAPH_FORMAT_VERSION {
        return Err(SerializationError::UnsupportedVersion {
            found: graph.format_version,
            expected: GRAPH_FORMAT_VERSION,
        }
        .into());
    }
    Ok(graph)
}
