use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use mesh_regrid::prelude::*;

fn warped_mesh(n: usize, seed: u64) -> GridTopology {
    let mut rng = SmallRng::seed_from_u64(seed);
    let stride = n + 1;
    let mut xs = Vec::with_capacity(stride * stride);
    let mut ys = Vec::with_capacity(stride * stride);
    for j in 0..=n {
        for i in 0..=n {
            let interior = i > 0 && i < n && j > 0 && j < n;
            let (dx, dy) = if interior {
                (rng.gen_range(-0.25..0.25), rng.gen_range(-0.25..0.25))
            } else {
                (0.0, 0.0)
            };
            xs.push(i as f64 + dx);
            ys.push(j as f64 + dy);
        }
    }
    let faces: Vec<[usize; 4]> = (0..n)
        .flat_map(|j| {
            (0..n).map(move |i| {
                let k = j * stride + i;
                [k, k + 1, k + 1 + stride, k + stride]
            })
        })
        .collect();
    GridTopology::new(&xs, &ys, &faces).expect("warped mesh is valid")
}

fn raster(n: usize, extent: f64) -> GridTopology {
    let edges: Vec<f64> = (0..=n).map(|i| i as f64 * extent / n as f64).collect();
    RasterGrid::from_edges(edges.clone(), edges)
        .and_then(|r| r.to_topology())
        .expect("raster is valid")
}

fn bench_spatial_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_index");
    for &n in &[64usize, 128] {
        let grid = warped_mesh(n, 7);
        let mut rng = SmallRng::seed_from_u64(11);
        let points: Vec<Point2> = (0..10_000)
            .map(|_| Point2::new(rng.gen_range(0.0..n as f64), rng.gen_range(0.0..n as f64)))
            .collect();

        // The face hierarchy is cached on the grid, so each build gets a fresh one.
        group.bench_with_input(BenchmarkId::new("build", n), &n, |b, &n| {
            b.iter_batched(
                || warped_mesh(n, 7),
                |fresh| black_box(SpatialIndex::build(&fresh).len()),
                BatchSize::LargeInput,
            );
        });

        let index = SpatialIndex::build(&grid);
        group.bench_with_input(BenchmarkId::new("locate_10k", n), &n, |b, _| {
            b.iter(|| black_box(index.locate_points(&points)));
        });
    }
    group.finish();
}

fn bench_weights(c: &mut Criterion) {
    let mut group = c.benchmark_group("weights");
    group.sample_size(20);
    for &n in &[32usize, 64] {
        let source = warped_mesh(n, 3);
        let target = raster(n / 2 + 3, n as f64);
        let index = SpatialIndex::build(&source);
        for method in [
            RegridMethod::CentroidLocator,
            RegridMethod::Overlap,
            RegridMethod::Barycentric,
        ] {
            group.bench_with_input(BenchmarkId::new(format!("{method:?}"), n), &n, |b, _| {
                b.iter(|| {
                    let w = method
                        .build_weights(&index, &target, OutOfBoundsPolicy::FillMissing)
                        .expect("weights");
                    black_box(w);
                });
            });
        }

        let regridder = Regridder::new(&source, &target, RegridMethod::Overlap).expect("regridder");
        let shape = [8, source.n_faces()];
        let values: Vec<f64> = (0..shape[0] * shape[1]).map(|i| i as f64).collect();
        group.bench_with_input(BenchmarkId::new("apply_8_layers", n), &n, |b, _| {
            b.iter(|| black_box(regridder.apply_shaped(&values, &shape).expect("apply")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_spatial_index, bench_weights);
criterion_main!(benches);
