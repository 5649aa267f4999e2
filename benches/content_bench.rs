use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pooled_interchange::{BufferPool, ContentWriter, Date, DateTime, Decimal};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn bench_integers(c: &mut Criterion) {
    let pool = Arc::new(BufferPool::default());
    let values: Vec<i64> = lcg(3).take(1_000).map(|x| x as i64 >> (x % 60)).collect();

    c.bench_function("content_put_i64_1k", |b| {
        b.iter(|| {
            let mut w = pool.byte_content();
            for &v in &values {
                w.put_i64(v);
                w.put_char(',');
            }
            black_box(w.len())
        })
    });

    c.bench_function("string_write_i64_1k", |b| {
        b.iter(|| {
            let mut s = String::with_capacity(4 * 1024);
            for &v in &values {
                let _ = write!(s, "{v},");
            }
            black_box(s.len())
        })
    });
}

fn bench_decimals_and_dates(c: &mut Criterion) {
    let pool = Arc::new(BufferPool::default());
    let decimals: Vec<Decimal> = lcg(5)
        .take(1_000)
        .map(|x| Decimal::new((x >> 20) as i64 - (1 << 42), (x % 5) as u32).unwrap())
        .collect();
    let stamp = DateTime::new(Date::new(2024, 3, 7).unwrap(), 12, 30, 0).unwrap();

    c.bench_function("content_put_decimal_1k", |b| {
        b.iter(|| {
            let mut w = pool.byte_content();
            for &d in &decimals {
                w.put_decimal(d);
            }
            black_box(w.len())
        })
    });

    c.bench_function("content_put_datetime_1k", |b| {
        b.iter(|| {
            let mut w = pool.char_content();
            for _ in 0..1_000 {
                w.put_datetime(black_box(stamp), true);
            }
            black_box(w.len())
        })
    });
}

fn bench_utf8(c: &mut Criterion) {
    let pool = Arc::new(BufferPool::default());
    let text = "naïve café, 日本語 and plain ascii ".repeat(64);
    c.bench_function("content_put_str_utf8", |b| {
        b.iter(|| {
            let mut w = pool.byte_content();
            w.put_str(&text);
            black_box(w.etag().len())
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_integers, bench_decimals_and_dates, bench_utf8
}
criterion_main!(benches);
