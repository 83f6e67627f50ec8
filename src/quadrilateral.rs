//! Four turnpoint circuits, each leg at least 15 percent of the total.
//! By far the most expensive shape; the flight driver only runs it when
//! the `quadrilateral` feature is enabled.

use crate::circuit::{circuit_close, CircuitTables};
use crate::result::OptimizationResult;
use crate::track::Track;

const QUAD_MIN_LEG: f64 = 0.15;

pub fn quadrilateral(
    track: &Track,
    circuit: &CircuitTables,
    bound: f64,
) -> Option<OptimizationResult> {
    let n = track.len();
    if n < 4 {
        return None;
    }
    let mut bound = bound;
    let mut legbound = QUAD_MIN_LEG * bound;
    let mut indexes = [-1i32; 6];
    for tp1 in 0..n - 3 {
        let start = circuit.best_start(tp1);
        let finish = match circuit.finish_for(start) {
            Some(finish) => finish,
            None => continue,
        };
        let tp4first = match track.first_at_least(tp1, tp1 + 2, finish + 1, legbound) {
            Some(index) => index,
            None => continue,
        };
        let tp4last = match track.last_at_least(tp1, tp4first, finish + 1, legbound) {
            Some(index) => index,
            None => continue,
        };
        let mut tp4 = tp4last;
        loop {
            if tp4 < tp4first {
                break;
            }
            let leg4 = track.delta(tp4, tp1);
            if leg4 < legbound {
                match track.fast_backward(tp4, legbound - leg4) {
                    Some(previous) => {
                        tp4 = previous;
                        continue;
                    }
                    None => break,
                }
            }
            // Bracket the inner turnpoints: with the closing leg fixed,
            // no leg can fall below 15% or rise above 55% of any total
            // that closing leg fits into.
            let shortest = QUAD_MIN_LEG * leg4 / (1.0 - 3.0 * QUAD_MIN_LEG);
            let tp2first = match track.first_at_least(tp1, tp1 + 1, tp4 - 1, shortest) {
                Some(index) => index,
                None => {
                    tp4 -= 1;
                    continue;
                }
            };
            let tp3last = match track.last_at_least(tp4, tp2first + 1, tp4, shortest) {
                Some(index) => index,
                None => {
                    tp4 -= 1;
                    continue;
                }
            };
            let tp2last = match track.last_at_least(tp4, tp2first + 1, tp3last - 1, shortest) {
                Some(index) => index,
                None => {
                    tp4 -= 1;
                    continue;
                }
            };
            let longest = (1.0 - 3.0 * QUAD_MIN_LEG) * leg4 / QUAD_MIN_LEG;
            let mut tp2 = tp2first;
            while tp2 <= tp2last {
                let leg1 = track.delta(tp1, tp2);
                let shortest2 =
                    (QUAD_MIN_LEG * (leg1 + leg4) / (1.0 - 2.0 * QUAD_MIN_LEG)).min(shortest);
                let longest2 =
                    ((1.0 - 3.0 * QUAD_MIN_LEG) * (leg1 + leg4) / (2.0 * QUAD_MIN_LEG)).max(longest);
                let tp3first = match track.first_at_least(tp2, tp2 + 1, tp3last + 1, shortest2) {
                    Some(index) => index,
                    None => {
                        tp2 += 1;
                        continue;
                    }
                };
                let mut tp3 = tp3last;
                loop {
                    if tp3 < tp3first {
                        break;
                    }
                    let mut shortfall = 0.0;
                    let leg2 = track.delta(tp2, tp3);
                    if leg2 < shortest2 {
                        shortfall = shortest2 - leg2;
                    }
                    if leg2 > longest2 && leg2 - longest2 > shortfall {
                        shortfall = leg2 - longest2;
                    }
                    let leg3 = track.delta(tp3, tp4);
                    if leg3 < shortest2 && shortest2 - leg3 > shortfall {
                        shortfall = shortest2 - leg3;
                    }
                    if leg3 > longest2 && leg3 - longest2 > shortfall {
                        shortfall = leg3 - longest2;
                    }
                    if shortfall > 0.0 {
                        match track.fast_backward(tp3, shortfall) {
                            Some(previous) => {
                                tp3 = previous;
                                continue;
                            }
                            None => break,
                        }
                    }
                    let total = leg1 + leg2 + leg3 + leg4;
                    let this_legbound = QUAD_MIN_LEG * total;
                    if leg1 < this_legbound {
                        shortfall = this_legbound - leg1;
                    }
                    if leg2 < this_legbound && this_legbound - leg2 > shortfall {
                        shortfall = this_legbound - leg2;
                    }
                    if leg3 < this_legbound && this_legbound - leg3 > shortfall {
                        shortfall = this_legbound - leg3;
                    }
                    if leg4 < this_legbound && this_legbound - leg4 > shortfall {
                        shortfall = this_legbound - leg4;
                    }
                    if shortfall > 0.0 {
                        match track.fast_backward(tp3, 0.5 * shortfall) {
                            Some(previous) => {
                                tp3 = previous;
                                continue;
                            }
                            None => break,
                        }
                    }
                    if total <= bound {
                        match track.fast_backward(tp3, 0.5 * (bound - total)) {
                            Some(previous) => {
                                tp3 = previous;
                                continue;
                            }
                            None => break,
                        }
                    }
                    bound = total;
                    legbound = this_legbound;
                    indexes = [
                        start as i32,
                        tp1 as i32,
                        tp2 as i32,
                        tp3 as i32,
                        tp4 as i32,
                        finish as i32,
                    ];
                    tp3 -= 1;
                }
                tp2 += 1;
            }
            tp4 -= 1;
        }
    }
    circuit_close(track, &mut indexes, circuit.tolerance());
    OptimizationResult::from_indexes(bound, &indexes)
}
