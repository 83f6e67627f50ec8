#[macro_use]
extern crate criterion;

use criterion::Criterion;
use xcroute_rs::{optimize_flight, Fix};

// A jittered triangular flight, spaced like a one second logger.
fn synthetic_flight(n: usize) -> Vec<Fix> {
    let corners = [(0.0, 0.0), (0.0, 0.6), (0.5, 0.3)];
    let per_leg = n / corners.len();
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut jitter = move || {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        0.002 * ((seed >> 11) as f64 / (1u64 << 53) as f64 - 0.5)
    };
    let mut fixes = Vec::with_capacity(n + 1);
    let mut time = 0i64;
    for corner in 0..corners.len() {
        let from = corners[corner];
        let to = corners[(corner + 1) % corners.len()];
        for step in 0..per_leg {
            let t = step as f64 / per_leg as f64;
            fixes.push(Fix::from_degrees(
                from.0 + t * (to.0 - from.0) + jitter(),
                from.1 + t * (to.1 - from.1) + jitter(),
                time,
            ));
            time += 1;
        }
    }
    fixes.push(Fix::from_degrees(corners[0].0, corners[0].1, time));
    fixes
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("flight", |b| {
        let fixes = synthetic_flight(5000);
        b.iter(|| optimize_flight(&fixes).unwrap())
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10);

    targets = criterion_benchmark
}
criterion_main!(benches);
