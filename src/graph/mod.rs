//! Graph data structures and construction
//!
//! This module contains the vertex, edge and graph types together with the
//! intersection graph builder and its predicates.

pub mod vertex;
pub mod edge;
pub mod index;
pub mod predicate;
pub mod builder;
mod structure;

// Re-export main graph types
pub use vertex::Vertex;
pub use edge::Edge;
pub use structure::{Graph, GRAPH_FORMAT_VERSION};
pub use builder::{BuildStats, IntersectionGraphBuilder};
pub use predicate::{IntersectionPredicate, InteriorOverlap, PolygonIntersects};
