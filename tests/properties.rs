use geo::coordinate_position::CoordPos;
use geo::dimensions::Dimensions;
use geo::{polygon, Intersects, Polygon, Relate};
use polygon_graph::core::{Feature, GroupKey, Layer, TouchSemantics};
use polygon_graph::{Graph, Grouper, IntersectionGraphBuilder};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
struct Parcel {
    key: u8,
    polygon: Polygon<f64>,
}

fn parcel() -> impl Strategy<Value = Parcel> {
    // Integer grid coordinates make shared edges and corners common
    (0u8..6, 0i32..12, 0i32..12, 1i32..4, 1i32..4).prop_map(|(key, x, y, w, h)| {
        let (x0, y0, x1, y1) = (x as f64, y as f64, (x + w) as f64, (y + h) as f64);
        Parcel {
            key,
            polygon: polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)],
        }
    })
}

fn layer(parcels: &[Parcel]) -> Layer {
    let features = parcels
        .iter()
        .enumerate()
        .map(|(i, p)| Feature::new(i as u64, p.polygon.clone()).with_attribute("zone", p.key as i64))
        .collect();
    Layer::new(vec!["zone".to_string()], features)
}

fn build(parcels: &[Parcel], builder: IntersectionGraphBuilder) -> Graph {
    let groups = Grouper::new("zone").group(&layer(parcels)).unwrap();
    builder.build(&groups).unwrap()
}

fn brute_force_edges(parcels: &[Parcel], touch: TouchSemantics) -> BTreeSet<(i64, i64)> {
    let mut edges = BTreeSet::new();
    for a in parcels {
        for b in parcels {
            if a.key >= b.key {
                continue;
            }
            let hit = match touch {
                TouchSemantics::Intersects => a.polygon.intersects(&b.polygon),
                TouchSemantics::Interior => {
                    let m = a.polygon.relate(&b.polygon);
                    m.get(CoordPos::Inside, CoordPos::Inside) != Dimensions::Empty
                }
            };
            if hit {
                edges.insert((a.key as i64, b.key as i64));
            }
        }
    }
    edges
}

fn edge_pairs(graph: &Graph) -> BTreeSet<(i64, i64)> {
    graph
        .edges
        .iter()
        .map(|e| match (&e.source, &e.target) {
            (GroupKey::Int(a), GroupKey::Int(b)) => (*a, *b),
            other => panic!("unexpected keys {:?}", other),
        })
        .collect()
}

proptest! {
    #[test]
    fn one_vertex_per_distinct_value(parcels in prop::collection::vec(parcel(), 1..20)) {
        let graph = build(&parcels, IntersectionGraphBuilder::new());
        let distinct: BTreeSet<u8> = parcels.iter().map(|p| p.key).collect();
        prop_assert_eq!(graph.vertex_count(), distinct.len());
    }

    #[test]
    fn edges_are_canonical_and_unique(parcels in prop::collection::vec(parcel(), 1..20)) {
        let graph = build(&parcels, IntersectionGraphBuilder::new());
        for edge in &graph.edges {
            prop_assert!(edge.source < edge.target);
        }
        for pair in graph.edges.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn edges_match_exact_predicate(parcels in prop::collection::vec(parcel(), 1..20)) {
        for touch in [TouchSemantics::Intersects, TouchSemantics::Interior] {
            let graph = build(&parcels, IntersectionGraphBuilder::new().with_touch(touch));
            prop_assert_eq!(edge_pairs(&graph), brute_force_edges(&parcels, touch));
        }
    }

    #[test]
    fn index_and_workers_do_not_change_result(parcels in prop::collection::vec(parcel(), 1..24)) {
        let reference = build(&parcels, IntersectionGraphBuilder::new().with_bbox_index(false));
        let indexed = build(&parcels, IntersectionGraphBuilder::new());
        let parallel = build(&parcels, IntersectionGraphBuilder::new().with_workers(3));
        prop_assert_eq!(&reference, &indexed);
        prop_assert_eq!(&reference, &parallel);
    }
}
