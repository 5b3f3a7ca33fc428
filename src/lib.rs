//! polygon-graph - Attribute Adjacency Graphs from Polygon Layers
//!
//! Groups the polygons of a vector layer by an attribute value and builds an
//! undirected graph with one vertex per distinct value and an edge between
//! two values whenever any of their polygons intersect.
//!
//! ```no_run
//! use polygon_graph::{source, Config, Grouper, IntersectionGraphBuilder};
//!
//! # fn main() -> polygon_graph::Result<()> {
//! let layer = source::read_layer("parcels.geojson")?;
//! let groups = Grouper::new("zone").group(&layer)?;
//! let graph = IntersectionGraphBuilder::from_config(&Config::default()).build(&groups)?;
//! println!("{} vertices, {} edges", graph.vertex_count(), graph.edge_count());
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

// Core foundational modules
pub mod core;

// Main functional modules
pub mod group;
pub mod graph;
pub mod source;
pub mod storage;
pub mod pipeline;
pub mod system;

// Re-export commonly used items for convenience
pub use crate::core::{AttributeValue, Config, Error, Feature, GroupKey, Layer, NullPolicy, Result, TouchSemantics};
pub use crate::graph::{Edge, Graph, IntersectionGraphBuilder, Vertex};
pub use crate::group::{Grouper, Groups};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize tracing and metrics for a process embedding the library
///
/// `level` is used when `RUST_LOG` is not set.
pub fn init(level: &str, compact: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = if compact {
        builder.compact().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!("Initializing {} v{}", NAME, VERSION);

    system::metrics::init_registry();

    Ok(())
}
