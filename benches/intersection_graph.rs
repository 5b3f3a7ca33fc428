use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::polygon;
use polygon_graph::core::{Feature, Layer};
use polygon_graph::{Grouper, IntersectionGraphBuilder};

/// Grid of slightly overlapping unit squares, `groups` distinct values
fn grid_layer(side: usize, groups: usize) -> Layer {
    let features = (0..side * side)
        .map(|i| {
            let (x, y) = ((i % side) as f64 * 0.95, (i / side) as f64 * 0.95);
            let square = polygon![(x: x, y: y), (x: x + 1.0, y: y), (x: x + 1.0, y: y + 1.0), (x: x, y: y + 1.0)];
            Feature::new(i as u64, square).with_attribute("zone", (i % groups) as i64)
        })
        .collect();
    Layer::new(vec!["zone".to_string()], features)
}

fn criterion_benchmark(c: &mut Criterion) {
    let layer = grid_layer(40, 64);
    let groups = Grouper::new("zone").group(&layer).unwrap();

    let mut group = c.benchmark_group("intersection_graph");
    for (name, builder) in [
        ("naive", IntersectionGraphBuilder::new().with_bbox_index(false)),
        ("bbox", IntersectionGraphBuilder::new()),
        ("bbox_4_workers", IntersectionGraphBuilder::new().with_workers(4)),
    ] {
        group.bench_with_input(BenchmarkId::new("build", name), &groups, |b, groups| {
            b.iter(|| black_box(builder.build(groups).unwrap()))
        });
    }
    group.finish();

    c.bench_function("group_1600_features", |b| {
        b.iter(|| black_box(Grouper::new("zone").group(&layer).unwrap()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
