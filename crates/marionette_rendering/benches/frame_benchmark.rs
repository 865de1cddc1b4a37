//! # Frame Coordinator Benchmark
//!
//! Measures coordinator overhead per frame against the recording engine:
//! lock, swap, apply, update, draw, stats.
//!
//! Target: coordinator overhead for a 40-parameter frame is a small fraction
//! of a 16.6ms budget.

#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use marionette_rendering::engine::mock::{RecordingEngine, RecordingTarget};
use marionette_rendering::{CoordinatorConfig, DrawableSize, FrameCoordinator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn loaded_coordinator() -> FrameCoordinator<RecordingEngine> {
    let config = CoordinatorConfig {
        validate_paths: false,
        ..CoordinatorConfig::default()
    };
    let coordinator = FrameCoordinator::with_config(RecordingEngine::new().counters_only(), Arc::new(()), config);
    coordinator
        .load_model("bench", "bench.model3.json")
        .expect("recording engine accepts every load");
    coordinator
}

fn bench_render_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for params in [0usize, 8, 40] {
        let coordinator = loaded_coordinator();
        let ids: Vec<String> = (0..params).map(|i| format!("Param{i:02}")).collect();
        let mut target = RecordingTarget::new(1);
        let size = DrawableSize::new(1920, 1080);

        group.bench_with_input(BenchmarkId::new("staged", params), &params, |b, _| {
            b.iter(|| {
                coordinator.set_parameters(ids.iter().map(|id| (id.as_str(), rng.gen_range(-30.0..30.0))));
                black_box(coordinator.render_frame(0.016, &mut target, size));
            });
        });
    }

    group.finish();
}

fn bench_set_parameter_uncontended(c: &mut Criterion) {
    let coordinator = loaded_coordinator();

    c.bench_function("set_parameter_immediate", |b| {
        b.iter(|| coordinator.set_parameter(black_box("ParamAngleX"), black_box(12.5)));
    });
}

criterion_group!(benches, bench_render_frame, bench_set_parameter_uncontended);
criterion_main!(benches);
