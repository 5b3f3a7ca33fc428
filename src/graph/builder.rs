//! Intersection graph builder
//!
//! Tests every unordered pair of distinct groups `(i, j)` with `i < j` and
//! emits an edge when any polygon of one group intersects any polygon of the
//! other. Enumerating only `i < j` over the key-sorted groups yields
//! canonical edges, so neither self-loops nor duplicates can be produced.
//!
//! With the bounding-box filter enabled, a pair of groups is compared only
//! when their group rectangles overlap, and then only members whose own
//! rectangle reaches into the overlap window are handed to the exact
//! predicate. Every rectangle test is closed, so the filter never changes
//! the result.

use super::predicate::{self, IntersectionPredicate};
use super::{index, Edge, Graph, Vertex};
use crate::core::{Config, Error, GeometryError, Result, TouchSemantics};
use crate::group::{Group, GroupMember, Groups};
use crate::system::metrics::Metrics;
use std::ops::AddAssign;
use std::time::Instant;
use tracing::{debug, info};

/// Counters collected during a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Group pairs considered
    pub pairs_considered: u64,
    /// Group pairs rejected by the bounding-box filter
    pub bbox_rejections: u64,
    /// Exact predicate evaluations
    pub predicate_evaluations: u64,
    /// Edges emitted
    pub edges: u64,
}

impl AddAssign for BuildStats {
    fn add_assign(&mut self, other: Self) {
        self.pairs_considered += other.pairs_considered;
        self.bbox_rejections += other.bbox_rejections;
        self.predicate_evaluations += other.predicate_evaluations;
        self.edges += other.edges;
    }
}

/// Builds a [`Graph`] from grouped polygons
pub struct IntersectionGraphBuilder {
    predicate: Box<dyn IntersectionPredicate>,
    use_bbox_index: bool,
    workers: usize,
}

impl Default for IntersectionGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IntersectionGraphBuilder {
    /// Sequential builder with standard intersects semantics and the
    /// bounding-box filter enabled
    pub fn new() -> Self {
        Self {
            predicate: predicate::for_semantics(TouchSemantics::Intersects),
            use_bbox_index: true,
            workers: 1,
        }
    }

    /// Builder matching the `build` section of a configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_touch(config.build.touch)
            .with_bbox_index(config.build.use_bbox_index)
            .with_workers(config.effective_worker_threads())
    }

    /// Use the built-in predicate for `touch`
    pub fn with_touch(self, touch: TouchSemantics) -> Self {
        Self {
            predicate: predicate::for_semantics(touch),
            ..self
        }
    }

    /// Use a custom predicate
    pub fn with_predicate(self, predicate: impl IntersectionPredicate + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            ..self
        }
    }

    /// Enable or disable the bounding-box filter
    pub fn with_bbox_index(mut self, enabled: bool) -> Self {
        self.use_bbox_index = enabled;
        self
    }

    /// Number of sweep workers; values below 1 mean sequential
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Build the graph
    pub fn build(&self, groups: &Groups) -> Result<Graph> {
        self.build_with_stats(groups).map(|(graph, _)| graph)
    }

    /// Build the graph and report sweep counters
    pub fn build_with_stats(&self, groups: &Groups) -> Result<(Graph, BuildStats)> {
        let started = Instant::now();
        validate_members(groups)?;

        let n = groups.len();
        let workers = self.workers.min(n.saturating_sub(1)).max(1);
        let (edges, stats) = if workers == 1 {
            self.sweep_rows(&groups.groups, 0..n)?
        } else {
            self.sweep_parallel(&groups.groups, workers)?
        };

        let vertices: Vec<Vertex> = groups.iter().map(Vertex::from).collect();
        let graph = Graph::from_parts(groups.field.clone(), vertices, edges);

        let metrics = Metrics::global();
        metrics.pairs_considered.inc_by(stats.pairs_considered);
        metrics.bbox_rejections.inc_by(stats.bbox_rejections);
        metrics.predicate_evaluations.inc_by(stats.predicate_evaluations);
        metrics.edges_emitted.inc_by(stats.edges);
        metrics.build_duration.observe(started.elapsed().as_secs_f64());

        info!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            pairs = stats.pairs_considered,
            bbox_rejections = stats.bbox_rejections,
            predicate_evaluations = stats.predicate_evaluations,
            workers,
            "Built intersection graph in {:?}",
            started.elapsed()
        );

        Ok((graph, stats))
    }

    /// Deal rows round-robin to scoped workers, then merge their edge lists
    fn sweep_parallel(&self, groups: &[Group], workers: usize) -> Result<(Vec<Edge>, BuildStats)> {
        let n = groups.len();
        let results = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| scope.spawn(move |_| self.sweep_rows(groups, (worker..n).step_by(workers))))
                .collect();
            handles.into_iter().map(|handle| handle.join()).collect::<Vec<_>>()
        })
        .map_err(|_| Error::internal("pair sweep scope panicked"))?;

        let mut edges = Vec::new();
        let mut stats = BuildStats::default();
        for result in results {
            let (worker_edges, worker_stats) =
                result.map_err(|_| Error::internal("pair sweep worker panicked"))??;
            edges.extend(worker_edges);
            stats += worker_stats;
        }
        Ok((edges, stats))
    }

    /// Test row `i` against every `j > i` for each row in `rows`
    fn sweep_rows(
        &self,
        groups: &[Group],
        rows: impl Iterator<Item = usize>,
    ) -> Result<(Vec<Edge>, BuildStats)> {
        let mut edges = Vec::new();
        let mut stats = BuildStats::default();

        for i in rows {
            let left = &groups[i];
            for right in &groups[i + 1..] {
                stats.pairs_considered += 1;
                if self.groups_intersect(left, right, &mut stats)? {
                    debug!("Edge {} -- {}", left.key, right.key);
                    if let Some(edge) = Edge::new(left.key.clone(), right.key.clone()) {
                        edges.push(edge);
                        stats.edges += 1;
                    }
                }
            }
        }

        Ok((edges, stats))
    }

    /// Short-circuits on the first intersecting member pair
    fn groups_intersect(&self, a: &Group, b: &Group, stats: &mut BuildStats) -> Result<bool> {
        if a.is_empty() || b.is_empty() {
            return Ok(false);
        }

        if !self.use_bbox_index {
            return self.any_pair(a.members.iter(), b.members.iter().collect(), stats);
        }

        let window = match (&a.bounds, &b.bounds) {
            (Some(ra), Some(rb)) => index::overlap_window(ra, rb),
            _ => None,
        };
        let Some(window) = window else {
            stats.bbox_rejections += 1;
            return Ok(false);
        };

        let right: Vec<&GroupMember> = b
            .members
            .iter()
            .filter(|m| index::overlaps(&m.bounds, &window))
            .collect();
        let left = a.members.iter().filter(|m| index::overlaps(&m.bounds, &window));
        self.any_pair(left, right, stats)
    }

    fn any_pair<'a>(
        &self,
        left: impl Iterator<Item = &'a GroupMember>,
        right: Vec<&'a GroupMember>,
        stats: &mut BuildStats,
    ) -> Result<bool> {
        for l in left {
            for r in &right {
                if self.use_bbox_index && !index::overlaps(&l.bounds, &r.bounds) {
                    continue;
                }
                stats.predicate_evaluations += 1;
                if self.predicate.intersects(l, r)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// Groups can be assembled by hand, so coordinates are rechecked before
/// any predicate sees them
fn validate_members(groups: &Groups) -> std::result::Result<(), GeometryError> {
    for member in groups.iter().flat_map(|g| g.members.iter()) {
        let polygon = &member.polygon;
        let finite = std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .flat_map(|ring| ring.0.iter())
            .all(|c| c.x.is_finite() && c.y.is_finite());
        if !finite {
            return Err(GeometryError::NonFinite { feature_id: member.feature_id });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Feature, GroupKey, Layer};
    use crate::group::Grouper;
    use geo::{polygon, BoundingRect, Polygon};

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        polygon![(x: x, y: y), (x: x + size, y: y), (x: x + size, y: y + size), (x: x, y: y + size)]
    }

    fn groups(items: &[(&str, Polygon<f64>)]) -> Groups {
        let features = items
            .iter()
            .enumerate()
            .map(|(i, (k, p))| Feature::new(i as u64, p.clone()).with_attribute("zone", *k))
            .collect();
        Grouper::new("zone").group(&Layer::from_features(features)).unwrap()
    }

    fn key(s: &str) -> GroupKey {
        GroupKey::from(s)
    }

    struct Failing;

    impl IntersectionPredicate for Failing {
        fn intersects(&self, left: &GroupMember, right: &GroupMember) -> std::result::Result<bool, GeometryError> {
            Err(GeometryError::Predicate {
                left: left.feature_id,
                right: right.feature_id,
                reason: "unsupported".to_string(),
            })
        }
    }

    #[test]
    fn test_chain_of_overlaps() {
        let groups = groups(&[
            ("A", square(0.0, 0.0, 2.0)),
            ("B", square(1.0, 0.0, 2.0)),
            ("C", square(2.5, 0.0, 2.0)),
        ]);
        let graph = IntersectionGraphBuilder::new().build(&groups).unwrap();

        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains_edge(&key("A"), &key("B")));
        assert!(graph.contains_edge(&key("B"), &key("C")));
        assert!(!graph.contains_edge(&key("A"), &key("C")));
    }

    #[test]
    fn test_multiple_hits_make_one_edge() {
        let groups = groups(&[
            ("A", square(0.0, 0.0, 1.0)),
            ("A", square(5.0, 0.0, 1.0)),
            ("B", square(0.5, 0.0, 1.0)),
            ("B", square(5.5, 0.0, 1.0)),
        ]);
        let (graph, stats) = IntersectionGraphBuilder::new().build_with_stats(&groups).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(stats.pairs_considered, 1);
        // Short-circuits after the first hit
        assert_eq!(stats.predicate_evaluations, 1);
    }

    #[test]
    fn test_bbox_rejection_counted() {
        let groups = groups(&[("A", square(0.0, 0.0, 1.0)), ("B", square(10.0, 10.0, 1.0))]);
        let (graph, stats) = IntersectionGraphBuilder::new().build_with_stats(&groups).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(stats.bbox_rejections, 1);
        assert_eq!(stats.predicate_evaluations, 0);
    }

    #[test]
    fn test_overlapping_bounds_without_contact() {
        // L-shaped pair whose group rectangles overlap but polygons do not
        let groups = groups(&[
            ("A", polygon![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 1.0), (x: 1.0, y: 1.0), (x: 1.0, y: 4.0), (x: 0.0, y: 4.0)]),
            ("B", square(2.0, 2.0, 1.0)),
        ]);
        for use_index in [true, false] {
            let graph = IntersectionGraphBuilder::new()
                .with_bbox_index(use_index)
                .build(&groups)
                .unwrap();
            assert_eq!(graph.edge_count(), 0);
        }
    }

    #[test]
    fn test_touch_semantics() {
        let groups = groups(&[("A", square(0.0, 0.0, 1.0)), ("B", square(1.0, 0.0, 1.0))]);

        let touching = IntersectionGraphBuilder::new().build(&groups).unwrap();
        assert!(touching.contains_edge(&key("A"), &key("B")));

        let interior = IntersectionGraphBuilder::new()
            .with_touch(TouchSemantics::Interior)
            .build(&groups)
            .unwrap();
        assert_eq!(interior.edge_count(), 0);
        assert_eq!(interior.vertex_count(), 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let items: Vec<(String, Polygon<f64>)> = (0..24)
            .map(|i| (format!("g{}", i % 8), square((i % 6) as f64 * 0.9, (i / 6) as f64 * 0.9, 1.0)))
            .collect();
        let refs: Vec<(&str, Polygon<f64>)> = items.iter().map(|(k, p)| (k.as_str(), p.clone())).collect();
        let groups = groups(&refs);

        let sequential = IntersectionGraphBuilder::new().build(&groups).unwrap();
        let parallel = IntersectionGraphBuilder::new().with_workers(4).build(&groups).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_predicate_error_aborts() {
        let groups = groups(&[("A", square(0.0, 0.0, 1.0)), ("B", square(0.5, 0.0, 1.0))]);
        let result = IntersectionGraphBuilder::new().with_predicate(Failing).build(&groups);
        assert!(matches!(result, Err(Error::Geometry(GeometryError::Predicate { .. }))));

        let result = IntersectionGraphBuilder::new()
            .with_predicate(Failing)
            .with_workers(2)
            .build(&groups);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_group_has_vertex_but_no_edges() {
        let mut groups = groups(&[("A", square(0.0, 0.0, 1.0))]);
        groups.groups.push(Group {
            key: key("Z"),
            members: Vec::new(),
            bounds: None,
            feature_count: 0,
            attributes: Default::default(),
        });
        let graph = IntersectionGraphBuilder::new().with_bbox_index(false).build(&groups).unwrap();
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_non_finite_member_rejected() {
        let mut groups = groups(&[("A", square(0.0, 0.0, 1.0)), ("B", square(3.0, 0.0, 1.0))]);
        let bad = polygon![(x: 0.0, y: 0.0), (x: f64::INFINITY, y: 0.0), (x: 1.0, y: 1.0)];
        let bounds = square(0.0, 0.0, 1.0).bounding_rect().unwrap();
        groups.groups[1].members.push(GroupMember { feature_id: 99, polygon: bad, bounds });

        let result = IntersectionGraphBuilder::new().build(&groups);
        assert!(matches!(result, Err(Error::Geometry(GeometryError::NonFinite { feature_id: 99 }))));
    }
}
