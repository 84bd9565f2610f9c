use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mentor_gateway::services::notation_formatter::{format, format_with_tokens};

const SHORT: &str = "v0 = u + a t";
const PARAGRAPH: &str = "The rms speed v rms = sqrt(3RT/M). For H2 at T = 300 K, \
    v rms is about 1.9 x 10 power 3 m/s. Kinetic energy is 1/2 m v squared, \
    and delta H for 2H2 + O2 -> 2H2O is negative; lambda max shifts as T half changes.";

fn bench_format(c: &mut Criterion) {
    c.bench_function("format_short", |b| b.iter(|| format(black_box(SHORT))));
    c.bench_function("format_paragraph", |b| b.iter(|| format(black_box(PARAGRAPH))));
    c.bench_function("format_with_tokens_paragraph", |b| {
        b.iter(|| format_with_tokens(black_box(PARAGRAPH)))
    });
}

criterion_group!(benches, bench_format);
criterion_main!(benches);
