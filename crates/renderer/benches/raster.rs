use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use field::{FieldParams, Palette};
use renderer::rasterize;

const SIZES: [u32; 4] = [64, 200, 400, 800];

fn bench_rasterize(c: &mut Criterion) {
    let params = FieldParams::default();
    let palette = Palette::default();

    let mut group = c.benchmark_group("rasterize");
    for size in SIZES {
        group.throughput(Throughput::Elements(u64::from(size) * u64::from(size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let image = rasterize(size, size, black_box(0.37), &params, &palette)
                    .expect("non-empty frame");
                black_box(image);
            });
        });
    }
    group.finish();
}

fn bench_shade(c: &mut Criterion) {
    let params = FieldParams::default();
    let palette = Palette::default();
    c.bench_function("shade_pixel", |b| {
        b.iter(|| params.shade(black_box(0.25), black_box(-0.4), black_box(1.2), &palette));
    });
}

criterion_group!(benches, bench_rasterize, bench_shade);
criterion_main!(benches);
