//! Benchmarks for gridding and grid analysis.
//!
//! Run with: cargo bench --package terrain-analysis --bench terrain_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use terrain_analysis::{
    extract_profile, flood_fill, ExtremumDetector, ExtremumMode, GradientMode, GradientOperator,
    GridGeometry, PointGridder, ScalarGrid, WeightFunction,
};
use terrain_common::{Point3, Polyline};
use test_utils::{create_cone_grid, create_scattered_points};

fn cone(size: usize) -> ScalarGrid {
    let geometry = GridGeometry::new(size, size, 0.0, 0.0, 1.0, 1.0).unwrap();
    ScalarGrid::from_values(geometry, &create_cone_grid(size, size, 1.0, size as f64)).unwrap()
}

// =============================================================================
// GRIDDING BENCHMARKS
// =============================================================================

fn bench_gridding(c: &mut Criterion) {
    let mut group = c.benchmark_group("gridding");

    let size = 128;
    let geometry = GridGeometry::new(size, size, 0.0, 0.0, 1.0, 1.0).unwrap();
    let extent = (size - 1) as f64;

    for count in [1_000, 10_000] {
        let samples: Vec<Point3> = create_scattered_points(count, extent, extent, 7)
            .into_iter()
            .map(Point3::from)
            .collect();
        group.throughput(Throughput::Elements(count as u64));

        for kernel in [WeightFunction::NearestNeighbor, WeightFunction::InverseDistance] {
            let gridder = PointGridder::with_radius(geometry.clone(), 3.0, kernel).unwrap();
            group.bench_with_input(
                BenchmarkId::new(kernel.as_str(), count),
                &samples,
                |b, samples| {
                    b.iter(|| gridder.grid(black_box(samples)));
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// GRADIENT BENCHMARKS
// =============================================================================

fn bench_gradient(c: &mut Criterion) {
    let mut group = c.benchmark_group("gradient");

    for size in [64, 256] {
        let grid = cone(size);
        group.throughput(Throughput::Elements((size * size) as u64));

        for mode in [
            GradientMode::Slope,
            GradientMode::AspectDegrees,
            GradientMode::PlanCurvature,
        ] {
            let operator = GradientOperator::new(mode);
            group.bench_with_input(
                BenchmarkId::new(mode.as_str(), format!("{}x{}", size, size)),
                &grid,
                |b, grid| {
                    b.iter(|| operator.transform(black_box(grid)));
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// FLOOD FILL, EXTREMA AND PROFILE BENCHMARKS
// =============================================================================

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    let size = 256;
    let grid = cone(size);
    let center = (size / 2) as f64;

    group.bench_function("flood_fill_half_height", |b| {
        let seed = Point3::new(0.0, 0.0, center);
        b.iter(|| flood_fill(black_box(&grid), black_box(&seed)));
    });

    group.bench_function("local_max", |b| {
        let detector = ExtremumDetector::new(ExtremumMode::LocalMax);
        b.iter(|| detector.detect(black_box(&grid)));
    });

    group.bench_function("profile_diagonal", |b| {
        let extent = (size - 1) as f64;
        let line = Polyline::from_xy(&[(0.3, 0.1), (center, extent), (extent, 0.7)]);
        b.iter(|| extract_profile(black_box(&grid), black_box(&line)));
    });

    group.finish();
}

criterion_group!(benches, bench_gridding, bench_gradient, bench_analysis);
criterion_main!(benches);
