//! Triangle circuits: three turnpoints inside a closed loop, scored by
//! the perimeter. The FAI variant additionally requires every leg to
//! carry at least 28 percent of the total.

use crate::circuit::{circuit_close, CircuitTables};
use crate::result::OptimizationResult;
use crate::track::Track;

const FAI_MIN_LEG: f64 = 0.28;

pub fn triangle(track: &Track, circuit: &CircuitTables, bound: f64) -> Option<OptimizationResult> {
    let n = track.len();
    if n < 3 {
        return None;
    }
    let mut bound = bound;
    let mut indexes = [-1i32; 5];
    for tp1 in 0..n - 1 {
        // The whole remaining track is an upper bound on any perimeter
        // anchored at tp1 or later.
        if track.sigma_delta[n - 1] - track.sigma_delta[tp1] < bound {
            break;
        }
        let start = circuit.best_start(tp1);
        let finish = match circuit.finish_for(start) {
            Some(finish) => finish,
            None => continue,
        };
        if track.sigma_delta[finish] - track.sigma_delta[tp1] < bound {
            continue;
        }
        let mut tp3 = finish;
        while tp3 > tp1 + 1 {
            let closing_leg = track.delta(tp3, tp1);
            let out_bound = bound - closing_leg;
            if let Some((tp2, out_legs)) =
                track.furthest_from2(tp1, tp3, tp1 + 1, tp3, out_bound)
            {
                bound = closing_leg + out_legs;
                indexes = [
                    start as i32,
                    tp1 as i32,
                    tp2 as i32,
                    tp3 as i32,
                    finish as i32,
                ];
            }
            tp3 -= 1;
        }
    }
    circuit_close(track, &mut indexes, circuit.tolerance());
    OptimizationResult::from_indexes(bound, &indexes)
}

pub fn triangle_fai(
    track: &Track,
    circuit: &CircuitTables,
    bound: f64,
) -> Option<OptimizationResult> {
    let n = track.len();
    if n < 3 {
        return None;
    }
    let mut bound = bound;
    let mut legbound = FAI_MIN_LEG * bound;
    let mut indexes = [-1i32; 5];
    for tp1 in 0..n - 2 {
        let start = circuit.best_start(tp1);
        let finish = match circuit.finish_for(start) {
            Some(finish) => finish,
            None => continue,
        };
        // The closing leg tp3 -> tp1 must itself make the leg minimum, which
        // brackets the candidate range for tp3.
        let tp3first = match track.first_at_least(tp1, tp1 + 2, finish + 1, legbound) {
            Some(index) => index,
            None => continue,
        };
        let tp3last = match track.last_at_least(tp1, tp3first, finish + 1, legbound) {
            Some(index) => index,
            None => continue,
        };
        let mut tp3 = tp3last;
        loop {
            if tp3 < tp3first {
                break;
            }
            let leg3 = track.delta(tp3, tp1);
            if leg3 < legbound {
                match track.fast_backward(tp3, legbound - leg3) {
                    Some(previous) => {
                        tp3 = previous;
                        continue;
                    }
                    None => break,
                }
            }
            // With the closing leg fixed, the other two legs are boxed in:
            // each is at least 28% and at most 44% of a perimeter whose
            // 44% share leg3 cannot exceed.
            let shortest = FAI_MIN_LEG * leg3 / (1.0 - 2.0 * FAI_MIN_LEG);
            let tp2first = match track.first_at_least(tp1, tp1 + 1, tp3 - 1, shortest) {
                Some(index) => index,
                None => {
                    tp3 -= 1;
                    continue;
                }
            };
            let tp2last = match track.last_at_least(tp3, tp2first, tp3, shortest) {
                Some(index) => index,
                None => {
                    tp3 -= 1;
                    continue;
                }
            };
            let longest = (1.0 - 2.0 * FAI_MIN_LEG) * leg3 / FAI_MIN_LEG;
            let mut tp2 = tp2first;
            while tp2 <= tp2last {
                let mut shortfall = 0.0;
                let leg1 = track.delta(tp1, tp2);
                if leg1 < shortest {
                    shortfall = shortest - leg1;
                }
                if leg1 > longest && leg1 - longest > shortfall {
                    shortfall = leg1 - longest;
                }
                let leg2 = track.delta(tp2, tp3);
                if leg2 < shortest && shortest - leg2 > shortfall {
                    shortfall = shortest - leg2;
                }
                if leg2 > longest && leg2 - longest > shortfall {
                    shortfall = leg2 - longest;
                }
                if shortfall > 0.0 {
                    tp2 = track.fast_forward(tp2, shortfall);
                    continue;
                }
                let total = leg1 + leg2 + leg3;
                let this_legbound = FAI_MIN_LEG * total;
                if leg1 < this_legbound {
                    shortfall = this_legbound - leg1;
                }
                if leg2 < this_legbound && this_legbound - leg2 > shortfall {
                    shortfall = this_legbound - leg2;
                }
                if leg3 < this_legbound && this_legbound - leg3 > shortfall {
                    shortfall = this_legbound - leg3;
                }
                if shortfall > 0.0 {
                    tp2 = track.fast_forward(tp2, 0.5 * shortfall);
                    continue;
                }
                if total <= bound {
                    tp2 = track.fast_forward(tp2, 0.5 * (bound - total));
                    continue;
                }
                bound = total;
                legbound = this_legbound;
                indexes = [
                    start as i32,
                    tp1 as i32,
                    tp2 as i32,
                    tp3 as i32,
                    finish as i32,
                ];
                tp2 += 1;
            }
            tp3 -= 1;
        }
    }
    circuit_close(track, &mut indexes, circuit.tolerance());
    OptimizationResult::from_indexes(bound, &indexes)
}
