//! Closed routes share two lookup tables: for every fix the furthest
//! finish that still closes a loop started there, and for every anchor
//! the start whose loop reaches furthest past it.

use crate::parallel::*;
use crate::result::OptimizationResult;
use crate::track::Track;

/// Weight of the gap between start and finish in the closing penalty.
/// Empirical: heavy enough that closure tightness dominates the two
/// connecting legs. Tunable, but changing it changes reported routes.
const CIRCUIT_WEIGHT: f64 = 256.0;

pub struct CircuitTables {
    tolerance: f64,
    last_finish: Vec<i32>,
    best_start: Vec<usize>,
}

impl CircuitTables {
    pub fn new(track: &Track, tolerance: f64) -> CircuitTables {
        let n = track.len();

        // Walk j down from the end; a fix that misses the tolerance by e
        // allows a backward jump of e.
        let last_finish: Vec<i32> = opt_into_par_iter(0..n)
            .map(|i| {
                let mut j = n - 1;
                loop {
                    if j < i {
                        return -1;
                    }
                    let error = track.delta(i, j);
                    if error < tolerance {
                        return j as i32;
                    }
                    match track.fast_backward(j, error - tolerance) {
                        Some(previous) => j = previous,
                        None => return -1,
                    }
                }
            })
            .collect();

        let mut best_start = Vec::with_capacity(n);
        let mut current = 0;
        for i in 0..n {
            if last_finish[i] > last_finish[current] {
                current = i;
            }
            if last_finish[current] < i as i32 {
                // The widest loop so far ends before i; rescan the prefix.
                current = (0..=i).fold(0, |best, j| {
                    if last_finish[j] > last_finish[best] {
                        j
                    } else {
                        best
                    }
                });
            }
            best_start.push(current);
        }

        CircuitTables {
            tolerance,
            last_finish,
            best_start,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn best_start(&self, i: usize) -> usize {
        self.best_start[i]
    }

    pub fn finish_for(&self, start: usize) -> Option<usize> {
        match self.last_finish[start] {
            finish if finish < 0 => None,
            finish => Some(finish as usize),
        }
    }
}

// Wiggle start and finish of a found circuit towards the tightest
// closure that does not give up too much connecting distance. Starts
// scan forward, finishes backward, and only a strictly smaller penalty
// replaces the running best, so the first candidate seen wins a tie.
pub(crate) fn circuit_close(track: &Track, indexes: &mut [i32], tolerance: f64) {
    if indexes.first().map_or(true, |&index| index < 0) {
        return;
    }
    let n = indexes.len();
    let start0 = indexes[0] as usize;
    let tp_first = indexes[1] as usize;
    let tp_last = indexes[n - 2] as usize;
    let finish0 = indexes[n - 1] as usize;

    let mut bound = track.delta(tp_first, start0)
        + CIRCUIT_WEIGHT * track.delta(start0, finish0)
        + track.delta(finish0, tp_last);
    for start in start0..=tp_first {
        let leg1 = track.delta(tp_first, start);
        for finish in (tp_last..=finish0).rev() {
            let leg2 = track.delta(start, finish);
            if leg2 < tolerance {
                let leg3 = track.delta(finish, tp_last);
                let penalty = leg1 + CIRCUIT_WEIGHT * leg2 + leg3;
                if penalty < bound {
                    indexes[0] = start as i32;
                    indexes[n - 1] = finish as i32;
                    bound = penalty;
                }
            }
        }
    }
}

/// Furthest point reachable from any fix whose loop closes again. The
/// scored distance is the round trip, twice the out leg.
pub fn out_and_return(
    track: &Track,
    circuit: &CircuitTables,
    bound: f64,
) -> Option<OptimizationResult> {
    let n = track.len();
    if n < 3 {
        return None;
    }
    let mut indexes = [-1i32; 4];
    let mut out_leg = 0.5 * bound;
    for tp1 in 0..n - 2 {
        let start = circuit.best_start(tp1);
        let finish = match circuit.finish_for(start) {
            Some(finish) => finish,
            None => continue,
        };
        if let Some((tp2, leg)) = track.furthest_from(tp1, tp1 + 1, finish + 1, out_leg) {
            indexes = [start as i32, tp1 as i32, tp2 as i32, finish as i32];
            out_leg = leg;
        }
    }
    circuit_close(track, &mut indexes, circuit.tolerance());
    OptimizationResult::from_indexes(2.0 * out_leg, &indexes)
}
