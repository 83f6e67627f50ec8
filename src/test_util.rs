//! Synthetic tracks for the test suites. A tiny deterministic generator
//! keeps the fixtures reproducible without carrying recorded flights.

use crate::point::Fix;
use crate::track::Track;

pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Lcg {
        Lcg(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1)
    }

    pub fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Random walk near 45N 8E, one fix per second.
pub fn wander(n: usize, seed: u64) -> Vec<Fix> {
    let mut rng = Lcg::new(seed);
    let mut lat = 45.0;
    let mut lon = 8.0;
    (0..n)
        .map(|i| {
            lat += 0.01 * (rng.next_f64() - 0.5);
            lon += 0.01 * (rng.next_f64() - 0.5);
            Fix::from_degrees(lat, lon, i as i64)
        })
        .collect()
}

/// A jittered tour of the given corners that ends exactly on the first
/// one, so the loop always closes.
pub fn closed_loop(corners: &[(f64, f64)], per_leg: usize, jitter: f64, seed: u64) -> Vec<Fix> {
    let mut rng = Lcg::new(seed);
    let mut fixes = Vec::new();
    let mut time = 0i64;
    for (from, to) in corners
        .iter()
        .zip(corners.iter().cycle().skip(1))
        .take(corners.len())
    {
        for step in 0..per_leg {
            let t = step as f64 / per_leg as f64;
            let lat = from.0 + t * (to.0 - from.0) + jitter * (rng.next_f64() - 0.5);
            let lon = from.1 + t * (to.1 - from.1) + jitter * (rng.next_f64() - 0.5);
            fixes.push(Fix::from_degrees(lat, lon, time));
            time += 1;
        }
    }
    fixes.push(Fix::from_degrees(corners[0].0, corners[0].1, time));
    fixes
}

pub fn leg_sum(track: &Track, path: &[usize]) -> f64 {
    path.windows(2).map(|pair| track.delta(pair[0], pair[1])).sum()
}
