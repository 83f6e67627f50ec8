use log::trace;
use ord_subset::OrdVar;

pub mod circuit;
pub mod error;
pub mod free;
pub mod parallel;
pub mod point;
pub mod quadrilateral;
pub mod result;
#[cfg(test)]
mod test_util;
pub mod track;
pub mod triangle;

pub use crate::circuit::CircuitTables;
pub use crate::error::TrackError;
pub use crate::point::{Fix, Point};
pub use crate::result::{OptimizationResult, Path, RouteShape};
pub use crate::track::Track;

/// Mean Earth radius in kilometres; angular distances times this.
pub const EARTH_RADIUS: f64 = 6371.0;

/// How far apart start and finish of a circuit may be: three kilometres.
pub const CIRCUIT_TOLERANCE: f64 = 3.0 / EARTH_RADIUS;

/// Coarse pass decimation: drop fixes closer than half a kilometre.
pub const DOWNSAMPLE_THRESHOLD: f64 = 0.5 / EARTH_RADIUS;

/// Routes below fifteen kilometres are not worth reporting.
pub const MINIMUM_BOUND: f64 = 15.0 / EARTH_RADIUS;

/// Search one route shape. Routes are only reported when they beat
/// `bound`, so chaining calls with the best distance so far skips work
/// a previous shape already ruled out. Circuit tables are built on
/// first use at [CIRCUIT_TOLERANCE].
pub fn optimize(track: &mut Track, shape: RouteShape, bound: f64) -> Option<OptimizationResult> {
    if shape.is_circuit() {
        track.compute_circuit_tables(CIRCUIT_TOLERANCE);
    }
    let track = &*track;
    match shape {
        RouteShape::Open0 => free::open_distance(track, bound),
        RouteShape::Open1 => free::open_distance_one_point(track, bound),
        RouteShape::Open2 => free::open_distance_two_points(track, bound),
        RouteShape::Open3 => free::open_distance_three_points(track, bound),
        RouteShape::OutAndReturn => track
            .circuit()
            .and_then(|tables| circuit::out_and_return(track, tables, bound)),
        RouteShape::FlatTriangle => track
            .circuit()
            .and_then(|tables| triangle::triangle(track, tables, bound)),
        RouteShape::FaiTriangle => track
            .circuit()
            .and_then(|tables| triangle::triangle_fai(track, tables, bound)),
        RouteShape::Quadrilateral => track
            .circuit()
            .and_then(|tables| quadrilateral::quadrilateral(track, tables, bound)),
    }
}

/// Score a whole flight: every open shape on an escalating bound, then
/// the circuits, with the triangles run coarse first and at full
/// resolution second.
pub fn optimize_flight<T: Point>(
    points: &[T],
) -> Result<Vec<(RouteShape, OptimizationResult)>, TrackError> {
    let track = Track::new(points)?;
    let mut routes = Vec::new();

    let mut bound = 0.0;
    if let Some(result) = free::open_distance(&track, bound) {
        trace!("open distance {:.1} km", result.distance_km());
        bound = result.distance;
        routes.push((RouteShape::Open0, result));
    }
    if bound < MINIMUM_BOUND {
        bound = MINIMUM_BOUND;
    }
    if let Some(result) = free::open_distance_one_point(&track, bound) {
        bound = result.distance;
        routes.push((RouteShape::Open1, result));
    }
    if let Some(result) = free::open_distance_two_points(&track, bound) {
        bound = result.distance;
        routes.push((RouteShape::Open2, result));
    }
    if let Some(result) = free::open_distance_three_points(&track, bound) {
        routes.push((RouteShape::Open3, result));
    }

    let tables = CircuitTables::new(&track, CIRCUIT_TOLERANCE);
    if let Some(result) = circuit::out_and_return(&track, &tables, MINIMUM_BOUND) {
        trace!("out and return {:.1} km", result.distance_km());
        routes.push((RouteShape::OutAndReturn, result));
    }

    let coarse = track.downsample(DOWNSAMPLE_THRESHOLD);
    let coarse_tables = CircuitTables::new(&coarse, CIRCUIT_TOLERANCE);
    trace!("downsampled {} fixes to {}", track.len(), coarse.len());

    let fai = two_pass(
        &track,
        &tables,
        &coarse,
        &coarse_tables,
        MINIMUM_BOUND,
        triangle::triangle_fai,
    );
    let triangle_bound = fai.as_ref().map_or(MINIMUM_BOUND, |result| result.distance);
    // An unconstrained triangle is never shorter than the best FAI one,
    // so the FAI result both seeds the bound and backstops the route.
    // The two distances are never equal: the flat pass only reports a
    // route that strictly beats the seed.
    let flat = two_pass(
        &track,
        &tables,
        &coarse,
        &coarse_tables,
        triangle_bound,
        triangle::triangle,
    )
    .into_iter()
    .chain(fai.clone())
    .max_by_key(|result| OrdVar::new_checked(result.distance));
    if let Some(result) = flat {
        routes.push((RouteShape::FlatTriangle, result));
    }
    if let Some(result) = fai {
        routes.push((RouteShape::FaiTriangle, result));
    }

    #[cfg(feature = "quadrilateral")]
    if let Some(result) = quadrilateral::quadrilateral(&coarse, &coarse_tables, MINIMUM_BOUND)
        .and_then(|result| remap(&track, &coarse, result))
    {
        routes.push((RouteShape::Quadrilateral, result));
    }

    Ok(routes)
}

// Establish a bound cheaply on the decimated track, then search the full
// track against it. A coarse route that the full pass cannot beat is
// translated back through the fix times.
fn two_pass<F>(
    track: &Track,
    tables: &CircuitTables,
    coarse: &Track,
    coarse_tables: &CircuitTables,
    bound: f64,
    search: F,
) -> Option<OptimizationResult>
where
    F: Fn(&Track, &CircuitTables, f64) -> Option<OptimizationResult>,
{
    let rough = search(coarse, coarse_tables, bound);
    let bound = rough.as_ref().map_or(bound, |result| result.distance);
    match search(track, tables, bound) {
        Some(fine) => Some(fine),
        None => rough.and_then(|result| remap(track, coarse, result)),
    }
}

fn remap(track: &Track, coarse: &Track, result: OptimizationResult) -> Option<OptimizationResult> {
    let mut path = Path::with_capacity(result.path.len());
    let mut left = 0;
    for &index in &result.path {
        let found = track.index_of_time(coarse.time_of(index), left)?;
        path.push(found);
        left = found;
    }
    Some(OptimizationResult {
        distance: result.distance,
        path,
    })
}
