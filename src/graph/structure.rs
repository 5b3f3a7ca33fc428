//! The finished adjacency graph
//!
//! A [`Graph`] is assembled once by the builder and never mutated after.
//! Vertices are sorted by key and edges lexicographically, so two graphs
//! built from the same input compare equal.

use super::{Edge, Vertex};
use crate::core::GroupKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the serialized graph layout
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// Undirected graph of attribute values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Serialized layout version
    pub format_version: u32,
    /// Field the vertices were grouped by
    pub field: String,
    /// Vertices sorted by key
    pub vertices: Vec<Vertex>,
    /// Edges sorted by `(source, target)`
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Assemble a graph, sorting vertices and deduplicating edges
    pub fn from_parts(
        field: impl Into<String>,
        mut vertices: Vec<Vertex>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Self {
        vertices.sort_by(|a, b| a.key.cmp(&b.key));
        vertices.dedup_by(|a, b| a.key == b.key);

        let mut edges: Vec<Edge> = edges.into_iter().collect();
        edges.sort();
        edges.dedup();

        Self {
            format_version: GRAPH_FORMAT_VERSION,
            field: field.into(),
            vertices,
            edges,
        }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Find a vertex by key
    pub fn vertex(&self, key: &GroupKey) -> Option<&Vertex> {
        self.vertices
            .binary_search_by(|v| v.key.cmp(key))
            .ok()
            .map(|i| &self.vertices[i])
    }

    /// Check if a vertex exists
    pub fn contains_vertex(&self, key: &GroupKey) -> bool {
        self.vertex(key).is_some()
    }

    /// Check if `a` and `b` are adjacent, in either order
    pub fn contains_edge(&self, a: &GroupKey, b: &GroupKey) -> bool {
        match Edge::new(a.clone(), b.clone()) {
            Some(edge) => self.edges.binary_search(&edge).is_ok(),
            None => false,
        }
    }

    /// Keys adjacent to `key`, in key order
    pub fn neighbors(&self, key: &GroupKey) -> Vec<&GroupKey> {
        let mut out: Vec<&GroupKey> = self.edges.iter().filter_map(|e| e.other(key)).collect();
        out.sort();
        out
    }

    /// Number of edges incident to `key`
    pub fn degree(&self, key: &GroupKey) -> usize {
        self.edges.iter().filter(|e| e.touches(key)).count()
    }

    /// Adjacency lists for every vertex, isolated vertices included
    pub fn adjacency(&self) -> BTreeMap<&GroupKey, Vec<&GroupKey>> {
        let mut adjacency: BTreeMap<&GroupKey, Vec<&GroupKey>> =
            self.vertices.iter().map(|v| (&v.key, Vec::new())).collect();
        for edge in &self.edges {
            if let Some(list) = adjacency.get_mut(&edge.source) {
                list.push(&edge.target);
            }
            if let Some(list) = adjacency.get_mut(&edge.target) {
                list.push(&edge.source);
            }
        }
        for list in adjacency.values_mut() {
            list.sort();
        }
        adjacency
    }

    /// Check if both graphs have the same vertex keys and edge set
    pub fn same_structure(&self, other: &Graph) -> bool {
        self.edges == other.edges
            && self.vertices.len() == other.vertices.len()
            && self.vertices.iter().zip(&other.vertices).all(|(a, b)| a.key == b.key)
    }
}
