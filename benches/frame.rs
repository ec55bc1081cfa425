//! Benchmarks for the per-frame simulation and CPU drawing.
//!
//! Run with: `cargo bench --bench frame`

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use morphfield::config::{AmbientConfig, MorphConfig};
use morphfield::pool::ParticlePool;
use morphfield::prelude::*;
use morphfield::spawn::SpawnContext;

const FRAME: Duration = Duration::from_millis(16);
const SURFACE: Vec2 = Vec2::new(1280.0, 720.0);

fn bench_ambient_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("ambient_update");
    let params = AmbientConfig::default();

    for count in [300usize, 1000, 6000] {
        let mut ctx = SpawnContext::from_seed(1);
        let mut pool = ParticlePool::new(count, &mut ctx, SURFACE);
        let cursor = Some(SURFACE / 2.0);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                pool.update_ambient(&params, count, SURFACE, cursor, &mut ctx);
                black_box(pool.visible_count())
            })
        });
    }

    group.finish();
}

fn bench_morph_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("morph_update");
    let params = MorphConfig::default();

    for count in [1000usize, 6000] {
        let mut ctx = SpawnContext::from_seed(2);
        let mut pool = ParticlePool::new(count, &mut ctx, SURFACE);
        pool.scatter_targets(&mut ctx, SURFACE);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                pool.update_morph(&params, Some(Vec2::new(640.0, 360.0)));
                black_box(pool.len())
            })
        });
    }

    group.finish();
}

/// Full ambient frames, connections included, once the field has grown.
fn bench_ambient_frame(c: &mut Criterion) {
    let config = EngineConfig::new().with_pool_size(6000).with_seed(3);
    let mut engine = Engine::new(config, 1280, 720, Arc::new(FontRasterizer::new()));
    let mut canvas = Canvas::new(1280, 720);
    for _ in 0..600 {
        engine.update(FRAME);
    }

    c.bench_function("ambient_frame_canvas", |b| {
        b.iter(|| {
            engine.frame(&mut canvas, FRAME);
            black_box(engine.active_count())
        })
    });
    engine.shutdown();
}

criterion_group!(
    benches,
    bench_ambient_update,
    bench_morph_update,
    bench_ambient_frame,
);
criterion_main!(benches);
