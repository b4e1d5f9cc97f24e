//! Stroke Pipeline Benchmarks
//!
//! Measures batch ingestion + commit throughput and full raster rebuilds at
//! various stroke lengths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ink_canvas::{
    CanvasEngine, ContactId, EngineConfig, InputObservation, Point, SampleFlag, Size, Stroke,
};

/// Generate a wandering stroke of `count` observations
fn generate_observations(count: usize, width: f64, height: f64) -> Vec<InputObservation> {
    (0..count)
        .map(|i| {
            let t = i as f64 / count.max(1) as f64;
            let x = width * (0.05 + 0.9 * t);
            let y = height * (0.5 + 0.4 * (t * 20.0).sin());
            InputObservation::stylus(Point::new(x, y), 0.3 + 0.6 * (t * 7.0).cos().abs())
                .at(i as f64 / 240.0)
        })
        .collect()
}

fn demo_engine() -> CanvasEngine<ink_canvas::SoftwareBackend> {
    let mut config = EngineConfig::default();
    config.surface.width = 1024.0;
    config.surface.height = 768.0;
    config.surface.scale = 1.0;
    CanvasEngine::software(config).expect("surface allocation")
}

/// Ingest-only throughput of the stroke aggregator
fn bench_stroke_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("stroke_ingest");

    for count in [64usize, 512, 4096] {
        let observations = generate_observations(count, 1024.0, 768.0);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &observations,
            |b, observations| {
                b.iter(|| {
                    let mut stroke = Stroke::new(Default::default());
                    stroke.ingest_batch(black_box(observations), SampleFlag::Coalesced.into());
                    black_box(stroke.len())
                });
            },
        );
    }

    group.finish();
}

/// Full engine path: batched dispatches with commits and raster bakes
fn bench_engine_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_batches");
    group.sample_size(20);

    for count in [240usize, 1920] {
        let observations = generate_observations(count, 1024.0, 768.0);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &observations,
            |b, observations| {
                b.iter(|| {
                    let mut engine = demo_engine();
                    for batch in observations.chunks(3) {
                        black_box(engine.on_input_batch(ContactId(1), batch, &[]));
                    }
                    engine.on_contact_end(ContactId(1), false);
                    black_box(engine.stats().samples_committed)
                });
            },
        );
    }

    group.finish();
}

/// Wholesale rebuild cost after a resize
fn bench_raster_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("raster_rebuild");
    group.sample_size(20);

    let mut engine = demo_engine();
    for stroke_index in 0..8u64 {
        let observations = generate_observations(480, 1024.0, 768.0);
        for batch in observations.chunks(4) {
            engine.on_input_batch(ContactId(stroke_index), batch, &[]);
        }
        engine.on_contact_end(ContactId(stroke_index), false);
    }

    group.bench_function("8_strokes_480_samples", |b| {
        b.iter(|| {
            engine
                .resize(Size::new(1024.0, 768.0), 1.0)
                .expect("resize");
            engine.rebuild_raster();
            black_box(engine.stats().full_rebuilds)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_stroke_ingest,
    bench_engine_batches,
    bench_raster_rebuild
);
criterion_main!(benches);
