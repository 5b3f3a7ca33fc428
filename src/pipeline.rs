//! End-to-end run: read a layer, group it, build the graph, write it out
//!
//! The graph file is only written once the graph has been built; any input
//! or predicate failure ends the run with no output.

use crate::core::{Config, Layer, Result};
use crate::graph::{BuildStats, Graph, IntersectionGraphBuilder};
use crate::group::Grouper;
use crate::source;
use crate::storage::{self, GraphFormat};
use crate::system::metrics::{Metrics, Timer};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Outcome of an in-memory transform
#[derive(Debug, Clone)]
pub struct Transformed {
    /// The finished graph
    pub graph: Graph,
    /// Sweep counters
    pub stats: BuildStats,
    /// Features excluded by the null policy
    pub skipped: usize,
}

/// Outcome of a full run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Features in the input layer
    pub features: usize,
    /// Features excluded by the null policy
    pub skipped: usize,
    /// Vertices in the written graph
    pub vertices: usize,
    /// Edges in the written graph
    pub edges: usize,
    /// Sweep counters
    pub stats: BuildStats,
    /// Format the graph was written in
    pub format: GraphFormat,
    /// Bytes written
    pub bytes: usize,
    /// Wall time of the run
    pub elapsed: Duration,
}

/// Group `layer` by `field` and build its intersection graph
pub fn transform(layer: &Layer, field: &str, config: &Config) -> Result<Transformed> {
    let groups = Grouper::new(field)
        .with_null_policy(config.grouping.null_policy)
        .group(layer)?;
    let (graph, stats) = IntersectionGraphBuilder::from_config(config).build_with_stats(&groups)?;

    Ok(Transformed {
        graph,
        stats,
        skipped: groups.skipped,
    })
}

/// Read `input`, build the graph grouped by `field` and write it to `output`
pub fn run(input: &Path, field: &str, output: &Path, config: &Config) -> Result<RunSummary> {
    let timer = Timer::start(Metrics::global().run_duration.clone());
    info!("Reading layer {:?}", input);
    let layer = source::read_layer(input)?;

    let transformed = transform(&layer, field, config)?;

    let format = GraphFormat::resolve(config.output.format, output);
    let bytes = storage::write_graph(&transformed.graph, output, format)?;

    Ok(RunSummary {
        features: layer.len(),
        skipped: transformed.skipped,
        vertices: transformed.graph.vertex_count(),
        edges: transformed.graph.edge_count(),
        stats: transformed.stats,
        format,
        bytes,
        elapsed: timer.finish(),
    })
}
