//! Open distance routes: a start, a finish, and up to three turnpoints
//! in between, scored by the sum of the legs.

use crate::result::OptimizationResult;
use crate::track::Track;

pub fn open_distance(track: &Track, bound: f64) -> Option<OptimizationResult> {
    let n = track.len();
    if n < 2 {
        return None;
    }
    let mut bound = bound;
    let mut indexes = [-1i32; 2];
    for start in 0..n - 1 {
        if let Some((finish, distance)) = track.furthest_from(start, start + 1, n, bound) {
            indexes = [start as i32, finish as i32];
            bound = distance;
        }
    }
    OptimizationResult::from_indexes(bound, &indexes)
}

// The turnpoint total can grow by at most twice the skipped track length
// (both legs move with tp1), so a shortfall of s allows a jump of s / 2.
pub fn open_distance_one_point(track: &Track, bound: f64) -> Option<OptimizationResult> {
    let n = track.len();
    if n < 3 {
        return None;
    }
    let mut bound = bound;
    let mut indexes = [-1i32; 3];
    let mut tp1 = 1;
    while tp1 < n - 1 {
        let total = track.before.distance[tp1] + track.after.distance[tp1];
        if total > bound {
            indexes = [
                track.before.index[tp1] as i32,
                tp1 as i32,
                track.after.index[tp1] as i32,
            ];
            bound = total;
            tp1 += 1;
        } else {
            tp1 = track.fast_forward(tp1, 0.5 * (bound - total));
        }
    }
    OptimizationResult::from_indexes(bound, &indexes)
}

pub fn open_distance_two_points(track: &Track, bound: f64) -> Option<OptimizationResult> {
    let n = track.len();
    if n < 4 {
        return None;
    }
    let mut bound = bound;
    let mut indexes = [-1i32; 4];
    for tp1 in 1..n - 2 {
        let leg1 = track.before.distance[tp1];
        let mut bound23 = bound - leg1;
        let mut tp2 = tp1 + 1;
        while tp2 < n - 1 {
            let legs23 = track.delta(tp1, tp2) + track.after.distance[tp2];
            if legs23 > bound23 {
                indexes = [
                    track.before.index[tp1] as i32,
                    tp1 as i32,
                    tp2 as i32,
                    track.after.index[tp2] as i32,
                ];
                bound23 = legs23;
                tp2 += 1;
            } else {
                tp2 = track.fast_forward(tp2, 0.5 * (bound23 - legs23));
            }
        }
        bound = leg1 + bound23;
    }
    OptimizationResult::from_indexes(bound, &indexes)
}

pub fn open_distance_three_points(track: &Track, bound: f64) -> Option<OptimizationResult> {
    let n = track.len();
    if n < 5 {
        return None;
    }
    let mut bound = bound;
    let mut indexes = [-1i32; 5];
    for tp1 in 1..n - 3 {
        let leg1 = track.before.distance[tp1];
        let mut bound234 = bound - leg1;
        for tp2 in tp1 + 1..n - 2 {
            let leg2 = track.delta(tp1, tp2);
            let mut bound34 = bound234 - leg2;
            let mut tp3 = tp2 + 1;
            while tp3 < n - 1 {
                let legs34 = track.delta(tp2, tp3) + track.after.distance[tp3];
                if legs34 > bound34 {
                    indexes = [
                        track.before.index[tp1] as i32,
                        tp1 as i32,
                        tp2 as i32,
                        tp3 as i32,
                        track.after.index[tp3] as i32,
                    ];
                    bound34 = legs34;
                    tp3 += 1;
                } else {
                    tp3 = track.fast_forward(tp3, 0.5 * (bound34 - legs34));
                }
            }
            bound234 = leg2 + bound34;
        }
        bound = leg1 + bound234;
    }
    OptimizationResult::from_indexes(bound, &indexes)
}
