use itertools::Itertools;

use crate::circuit::CircuitTables;
use crate::error::TrackError;
use crate::parallel::*;
use crate::point::Point;

/// Furthest reachable fix per index, one column per field so the hot
/// loops touch only the array they need.
pub(crate) struct Limits {
    pub index: Vec<usize>,
    pub distance: Vec<f64>,
}

impl Limits {
    fn with_capacity(n: usize) -> Limits {
        Limits {
            index: Vec::with_capacity(n),
            distance: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, index: usize, distance: f64) {
        self.index.push(index);
        self.distance.push(distance);
    }
}

/// An immutable flight track with the lookup tables the route searches
/// run on. Angular distances throughout; multiply by the Earth radius
/// to get kilometres.
pub struct Track {
    sin_lat: Vec<f64>,
    cos_lat: Vec<f64>,
    lon: Vec<f64>,
    times: Vec<i64>,
    pub(crate) sigma_delta: Vec<f64>,
    max_delta: f64,
    pub(crate) before: Limits,
    pub(crate) after: Limits,
    circuit: Option<CircuitTables>,
}

impl Track {
    pub fn new<T: Point>(points: &[T]) -> Result<Track, TrackError> {
        if points.is_empty() {
            return Err(TrackError::Empty);
        }
        if let Some(index) = points
            .iter()
            .position(|p| p.latitude().abs() > 90.0 || p.longitude().abs() > 180.0)
        {
            return Err(TrackError::CoordinateOutOfRange(index));
        }
        if let Some(index) = points
            .iter()
            .tuple_windows()
            .position(|(a, b)| b.time() <= a.time())
        {
            return Err(TrackError::NonMonotonicTime(index + 1));
        }

        let coords: Vec<(f64, f64, f64)> = opt_par_iter(points)
            .map(|p| {
                let lat = p.latitude().to_radians();
                (lat.sin(), lat.cos(), p.longitude().to_radians())
            })
            .collect();

        Ok(Track::from_arrays(
            coords.iter().map(|c| c.0).collect(),
            coords.iter().map(|c| c.1).collect(),
            coords.iter().map(|c| c.2).collect(),
            points.iter().map(Point::time).collect(),
        ))
    }

    fn from_arrays(sin_lat: Vec<f64>, cos_lat: Vec<f64>, lon: Vec<f64>, times: Vec<i64>) -> Track {
        let mut track = Track {
            sin_lat,
            cos_lat,
            lon,
            times,
            sigma_delta: Vec::new(),
            max_delta: 0.0,
            before: Limits::with_capacity(0),
            after: Limits::with_capacity(0),
            circuit: None,
        };
        track.compute_sigma_delta();
        track.compute_limits();
        track
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn time_of(&self, index: usize) -> i64 {
        self.times[index]
    }

    pub fn times_of(&self, path: &[usize]) -> Vec<i64> {
        path.iter().map(|&index| self.times[index]).collect()
    }

    /// Great circle angular distance between two fixes. The spherical law
    /// of cosines on the precomputed trig columns; the argument is clamped
    /// so near coincident fixes come out as exactly zero instead of NaN.
    pub fn delta(&self, i: usize, j: usize) -> f64 {
        let x = self.sin_lat[i] * self.sin_lat[j]
            + self.cos_lat[i] * self.cos_lat[j] * (self.lon[i] - self.lon[j]).cos();
        if x < 1.0 {
            x.max(-1.0).acos()
        } else {
            0.0
        }
    }

    fn compute_sigma_delta(&mut self) {
        let n = self.len();
        let mut sigma_delta = Vec::with_capacity(n);
        sigma_delta.push(0.0);
        let mut max_delta: f64 = 0.0;
        for i in 1..n {
            let delta = self.delta(i - 1, i);
            sigma_delta.push(sigma_delta[i - 1] + delta);
            if delta > max_delta {
                max_delta = delta;
            }
        }
        self.sigma_delta = sigma_delta;
        self.max_delta = max_delta;
    }

    // The furthest-point-before and furthest-point-after tables. Each
    // entry is warm started from its neighbour: the best distance cannot
    // drop by more than max_delta from one fix to the next, so the
    // neighbour's distance minus max_delta is a valid lower bound. When
    // nothing strictly beats that bound the neighbour's pick attains it
    // exactly and is re-used.
    fn compute_limits(&mut self) {
        let n = self.len();

        let mut before = Limits::with_capacity(n);
        before.push(0, 0.0);
        for i in 1..n {
            let bound = before.distance[i - 1] - self.max_delta;
            match self.furthest_from(i, 0, i, bound) {
                Some((index, distance)) => before.push(index, distance),
                None => {
                    let index = before.index[i - 1];
                    before.push(index, self.delta(i, index));
                }
            }
        }
        self.before = before;

        let mut after = Limits::with_capacity(n);
        if n == 1 {
            after.push(0, 0.0);
        } else {
            match self.furthest_from(0, 1, n, 0.0) {
                Some((index, distance)) => after.push(index, distance),
                None => after.push(1, 0.0),
            }
            for i in 1..n - 1 {
                let bound = after.distance[i - 1] - self.max_delta;
                match self.furthest_from(i, i + 1, n, bound) {
                    Some((index, distance)) => after.push(index, distance),
                    None => {
                        let index = after.index[i - 1].max(i + 1);
                        after.push(index, self.delta(i, index));
                    }
                }
            }
            after.push(n - 1, 0.0);
        }
        self.after = after;
    }

    /// A decimated copy keeping only fixes further than `threshold` from
    /// the last kept fix. All tables are rebuilt on the shorter sequence.
    pub fn downsample(&self, threshold: f64) -> Track {
        let n = self.len();
        let mut kept = vec![0];
        let mut last = 0;
        for j in 1..n {
            if self.delta(last, j) > threshold {
                kept.push(j);
                last = j;
            }
        }
        Track::from_arrays(
            kept.iter().map(|&j| self.sin_lat[j]).collect(),
            kept.iter().map(|&j| self.cos_lat[j]).collect(),
            kept.iter().map(|&j| self.lon[j]).collect(),
            kept.iter().map(|&j| self.times[j]).collect(),
        )
    }

    pub fn compute_circuit_tables(&mut self, tolerance: f64) {
        let stale = match &self.circuit {
            Some(tables) => tables.tolerance() != tolerance,
            None => true,
        };
        if stale {
            let tables = CircuitTables::new(self, tolerance);
            self.circuit = Some(tables);
        }
    }

    pub(crate) fn circuit(&self) -> Option<&CircuitTables> {
        self.circuit.as_ref()
    }

    // Index jump that cannot overshoot a fix within angular distance d of
    // i, because no consecutive pair is further apart than max_delta.
    fn forward(&self, i: usize, d: f64) -> usize {
        let step = d / self.max_delta;
        if step >= (self.len() - i) as f64 {
            self.len()
        } else if step >= 1.0 {
            i + step as usize
        } else {
            i + 1
        }
    }

    /// Smallest index j with `sigma_delta[j] >= sigma_delta[i] + d`, found
    /// by repeated bounded jumps. Returns `len()` when the track runs out.
    pub(crate) fn fast_forward(&self, i: usize, d: f64) -> usize {
        let target = self.sigma_delta[i] + d;
        let mut i = self.forward(i, d);
        loop {
            if i >= self.len() {
                return i;
            }
            let error = target - self.sigma_delta[i];
            if error <= 0.0 {
                return i;
            }
            i = self.forward(i, error);
        }
    }

    fn backward(&self, i: usize, d: f64) -> Option<usize> {
        let step = d / self.max_delta;
        if step >= 1.0 {
            if step > i as f64 {
                None
            } else {
                Some(i - step as usize)
            }
        } else {
            i.checked_sub(1)
        }
    }

    /// Mirror of [Track::fast_forward] for decreasing indices. `None`
    /// stands in for running off the front of the track.
    pub(crate) fn fast_backward(&self, i: usize, d: f64) -> Option<usize> {
        let target = self.sigma_delta[i] - d;
        let mut i = self.backward(i, d)?;
        loop {
            let error = self.sigma_delta[i] - target;
            if error <= 0.0 {
                return Some(i);
            }
            i = self.backward(i, error)?;
        }
    }

    /// The fix in `[begin, end)` furthest from `i`, provided it is
    /// strictly further than `bound`. Candidates that fall short by `s`
    /// allow a fast forward jump of `s`: no skipped fix can do better.
    pub(crate) fn furthest_from(
        &self,
        i: usize,
        begin: usize,
        end: usize,
        mut bound: f64,
    ) -> Option<(usize, f64)> {
        let mut result = None;
        let mut j = begin;
        while j < end {
            let d = self.delta(i, j);
            if d > bound {
                bound = d;
                result = Some((j, d));
                j += 1;
            } else {
                j = self.fast_forward(j, bound - d);
            }
        }
        result
    }

    /// Two anchor variant: maximises `delta(i, k) + delta(k, j)`. The sum
    /// moves at most twice as fast as a single leg, hence the halved jump.
    pub(crate) fn furthest_from2(
        &self,
        i: usize,
        j: usize,
        begin: usize,
        end: usize,
        mut bound: f64,
    ) -> Option<(usize, f64)> {
        let mut result = None;
        let mut k = begin;
        while k < end {
            let d = self.delta(i, k) + self.delta(k, j);
            if d > bound {
                bound = d;
                result = Some((k, d));
                k += 1;
            } else {
                k = self.fast_forward(k, 0.5 * (bound - d));
            }
        }
        result
    }

    pub(crate) fn first_at_least(
        &self,
        i: usize,
        begin: usize,
        end: usize,
        bound: f64,
    ) -> Option<usize> {
        let mut j = begin;
        while j < end {
            let d = self.delta(i, j);
            if d > bound {
                return Some(j);
            }
            j = self.fast_forward(j, bound - d);
        }
        None
    }

    pub(crate) fn last_at_least(
        &self,
        i: usize,
        begin: usize,
        end: usize,
        bound: f64,
    ) -> Option<usize> {
        if end <= begin {
            return None;
        }
        let mut j = end - 1;
        loop {
            if j < begin {
                return None;
            }
            let d = self.delta(i, j);
            if d > bound {
                return Some(j);
            }
            j = self.fast_backward(j, bound - d)?;
        }
    }

    // Left anchored binary search, so a path can be translated one index
    // at a time without rescanning the prefix.
    pub(crate) fn index_of_time(&self, time: i64, left: usize) -> Option<usize> {
        let mut left = left;
        let mut right = self.len() - 1;
        while left <= right {
            let middle = (left + right) / 2;
            if self.times[middle] > time {
                if middle == 0 {
                    return None;
                }
                right = middle - 1;
            } else if self.times[middle] == time {
                return Some(middle);
            } else {
                left = middle + 1;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Fix;
    use crate::test_util::wander;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_empty_track_is_rejected() {
        let fixes: Vec<Fix> = Vec::new();
        assert_eq!(Track::new(&fixes).err(), Some(TrackError::Empty));
    }

    #[test]
    fn test_out_of_range_coordinate_is_rejected() {
        let fixes = vec![
            Fix::from_degrees(45.0, 8.0, 0),
            Fix::from_degrees(91.0, 8.0, 1),
        ];
        assert_eq!(
            Track::new(&fixes).err(),
            Some(TrackError::CoordinateOutOfRange(1))
        );
    }

    #[test]
    fn test_non_monotonic_time_is_rejected() {
        let fixes = vec![
            Fix::from_degrees(45.0, 8.0, 10),
            Fix::from_degrees(45.1, 8.0, 11),
            Fix::from_degrees(45.2, 8.0, 11),
        ];
        assert_eq!(
            Track::new(&fixes).err(),
            Some(TrackError::NonMonotonicTime(2))
        );
    }

    #[test]
    fn test_single_fix_track_builds() {
        let track = Track::new(&[Fix::from_degrees(45.0, 8.0, 0)]).unwrap();
        assert_eq!(track.len(), 1);
        assert_eq!(track.before.index, vec![0]);
        assert_eq!(track.after.index, vec![0]);
    }

    #[test]
    fn test_delta_is_a_metric_on_fixes() {
        let track = Track::new(&wander(50, 1)).unwrap();
        for i in 0..track.len() {
            // The trig cache rounds, so the diagonal is only near zero.
            assert!(track.delta(i, i) < 2e-8);
            for j in 0..track.len() {
                assert!(track.delta(i, j) >= 0.0);
                assert_approx_eq!(track.delta(i, j), track.delta(j, i), 1e-15);
            }
        }
    }

    #[test]
    fn test_delta_of_one_degree_on_the_equator() {
        let track = Track::new(&[
            Fix::from_degrees(0.0, 0.0, 0),
            Fix::from_degrees(0.0, 1.0, 1),
        ])
        .unwrap();
        assert_approx_eq!(track.delta(0, 1), 1f64.to_radians(), 1e-12);
    }

    #[test]
    fn test_sigma_delta_dominates_direct_distance() {
        let track = Track::new(&wander(80, 2)).unwrap();
        for i in 0..track.len() - 1 {
            assert!(track.sigma_delta[i + 1] >= track.sigma_delta[i]);
            assert_approx_eq!(
                track.sigma_delta[i + 1] - track.sigma_delta[i],
                track.delta(i, i + 1),
                1e-12
            );
            for j in i + 1..track.len() {
                assert!(track.sigma_delta[j] - track.sigma_delta[i] >= track.delta(i, j) - 1e-12);
            }
        }
    }

    #[test]
    fn test_fast_forward_finds_the_first_index_past_the_target() {
        let track = Track::new(&wander(60, 3)).unwrap();
        for i in 0..track.len() {
            for d in [1e-6, 1e-4, 1e-3, 5e-3] {
                let j = track.fast_forward(i, d);
                let expected = (i + 1..track.len())
                    .find(|&k| track.sigma_delta[k] >= track.sigma_delta[i] + d)
                    .unwrap_or(track.len());
                assert_eq!(j, expected, "fast_forward({}, {})", i, d);
            }
        }
    }

    #[test]
    fn test_fast_backward_finds_the_first_index_before_the_target() {
        let track = Track::new(&wander(60, 4)).unwrap();
        for i in 0..track.len() {
            for d in [1e-6, 1e-4, 1e-3, 5e-3] {
                let j = track.fast_backward(i, d);
                let expected = (0..i)
                    .rev()
                    .find(|&k| track.sigma_delta[k] <= track.sigma_delta[i] - d);
                assert_eq!(j, expected, "fast_backward({}, {})", i, d);
            }
        }
    }

    #[test]
    fn test_stepper_survives_a_stationary_track() {
        // All fixes coincident: max_delta is zero and every jump must
        // still terminate.
        let fixes: Vec<Fix> = (0..5).map(|t| Fix::from_degrees(0.0, 8.0, t)).collect();
        let track = Track::new(&fixes).unwrap();
        assert_eq!(track.max_delta, 0.0);
        assert_eq!(track.fast_forward(0, 0.1), track.len());
        assert_eq!(track.fast_backward(4, 0.1), None);
    }

    #[test]
    fn test_before_and_after_tables_match_a_full_scan() {
        let track = Track::new(&wander(120, 5)).unwrap();
        for i in 0..track.len() {
            let best_before = (0..i)
                .map(|j| track.delta(i, j))
                .fold(0.0f64, f64::max);
            let best_after = (i + 1..track.len())
                .map(|j| track.delta(i, j))
                .fold(0.0f64, f64::max);
            assert_approx_eq!(track.before.distance[i], best_before, 1e-12);
            assert_approx_eq!(track.after.distance[i], best_after, 1e-12);
            if i > 0 {
                assert_approx_eq!(
                    track.delta(i, track.before.index[i]),
                    track.before.distance[i],
                    1e-12
                );
            }
            if i < track.len() - 1 {
                assert_approx_eq!(
                    track.delta(i, track.after.index[i]),
                    track.after.distance[i],
                    1e-12
                );
            }
        }
    }

    #[test]
    fn test_furthest_from_matches_a_full_scan() {
        let track = Track::new(&wander(90, 6)).unwrap();
        for i in [0, 17, 44, 89] {
            let result = track.furthest_from(i, 0, track.len(), 0.0);
            let expected = (0..track.len())
                .map(|j| track.delta(i, j))
                .fold(0.0f64, f64::max);
            match result {
                Some((_, distance)) => assert_approx_eq!(distance, expected, 1e-12),
                None => assert_eq!(expected, 0.0),
            }
        }
    }

    #[test]
    fn test_downsample_keeps_the_first_fix_and_spreads_the_rest() {
        let threshold = 0.5 / crate::EARTH_RADIUS;
        let track = Track::new(&wander(300, 7)).unwrap();
        let coarse = track.downsample(threshold);
        assert!(coarse.len() <= track.len());
        assert_eq!(coarse.time_of(0), track.time_of(0));
        for i in 1..coarse.len() {
            assert!(coarse.delta(i - 1, i) > threshold);
        }
    }

    #[test]
    fn test_times_round_trip_through_a_path() {
        let fixes = wander(40, 8);
        let track = Track::new(&fixes).unwrap();
        let path = vec![0, 7, 21, 39];
        let times = track.times_of(&path);
        let mut left = 0;
        for (&index, &time) in path.iter().zip(times.iter()) {
            let found = track.index_of_time(time, left).unwrap();
            assert_eq!(found, index);
            left = found;
        }
    }

    #[test]
    fn test_index_of_time_misses_cleanly() {
        let track = Track::new(&wander(10, 9)).unwrap();
        assert_eq!(track.index_of_time(-5, 0), None);
        assert_eq!(track.index_of_time(i64::MAX, 0), None);
    }
}
