//! Coarse admission filter: does a candidate boundary share interior with
//! any boundary already on the map?
//!
//! Boundaries that only touch along an edge or at a vertex are not
//! overlapping.

use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Centroid, Polygon};

use super::ring::{segments_cross, vertices, Extent};

/// Anything with an id and a boundary can take part in the check
pub trait Footprint {
    fn id(&self) -> i64;
    fn polygon(&self) -> &Polygon<f64>;

    /// Display name used in rejection messages
    fn name(&self) -> &str {
        ""
    }
}

impl Footprint for (i64, Polygon<f64>) {
    fn id(&self) -> i64 {
        self.0
    }

    fn polygon(&self) -> &Polygon<f64> {
        &self.1
    }
}

/// True when the candidate overlaps any footprint other than `exclude_id`
pub fn overlaps<F: Footprint>(
    candidate: &Polygon<f64>,
    existing: &[F],
    exclude_id: Option<i64>,
) -> bool {
    first_overlap(candidate, existing, exclude_id).is_some()
}

/// First footprint (other than `exclude_id`) the candidate overlaps
pub fn first_overlap<'a, F: Footprint>(
    candidate: &Polygon<f64>,
    existing: &'a [F],
    exclude_id: Option<i64>,
) -> Option<&'a F> {
    let candidate_extent = Extent::of(candidate)?;
    existing
        .iter()
        .filter(|f| Some(f.id()) != exclude_id)
        .find(|f| {
            Extent::of(f.polygon()).is_some_and(|e| e.intersects(&candidate_extent))
                && polygons_overlap(candidate, f.polygon())
        })
}

/// Interior overlap test between two boundaries
pub fn polygons_overlap(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    edges_cross(a, b)
        || polygon_within(a, b)
        || polygon_within(b, a)
        || probe_inside(a, b)
        || probe_inside(b, a)
}

/// Some exterior edge of `a` properly crosses some exterior edge of `b`
pub fn edges_cross(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    a.exterior()
        .lines()
        .any(|p| b.exterior().lines().any(|q| segments_cross(p, q)))
}

/// Every vertex of `inner` is inside or on `outer`, and `inner` is not
/// just lying along its boundary
pub fn polygon_within(inner: &Polygon<f64>, outer: &Polygon<f64>) -> bool {
    let pts = vertices(inner);
    if pts.is_empty()
        || pts
            .iter()
            .any(|c| outer.coordinate_position(c) == CoordPos::Outside)
    {
        return false;
    }
    inner
        .centroid()
        .is_some_and(|c| outer.coordinate_position(&c.0) == CoordPos::Inside)
}

/// A vertex or edge midpoint of `a` strictly inside `b`. Catches partial
/// overlaps whose edges only run along each other.
fn probe_inside(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    let midpoints = a.exterior().lines().map(|l| (l.start + l.end) / 2.0);
    vertices(a)
        .iter()
        .copied()
        .chain(midpoints)
        .any(|c| b.coordinate_position(&c) == CoordPos::Inside)
}
