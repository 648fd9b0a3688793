use geo::Polygon;

use crate::error::Rejection;
use crate::geometry::{area_m2, distinct_vertex_count, first_overlap, Footprint};

/// Smallest boundary accepted, in square metres
pub const MIN_AREA_M2: f64 = 2.0;
/// Largest boundary accepted (5 km²)
pub const MAX_AREA_M2: f64 = 5_000_000.0;

/// Run the admission check on a candidate boundary.
///
/// Returns the candidate's area on success. `exclude_id` is the landmark
/// being edited, which must not be compared against itself.
pub fn admit<F: Footprint>(
    candidate: &Polygon<f64>,
    existing: &[F],
    exclude_id: Option<i64>,
) -> Result<f64, Rejection> {
    if distinct_vertex_count(candidate) < 3 {
        return Err(Rejection::Degenerate);
    }

    let area_m2 = area_m2(candidate);
    if area_m2 < MIN_AREA_M2 {
        return Err(Rejection::TooSmall {
            area_m2,
            min_m2: MIN_AREA_M2,
        });
    }
    if area_m2 > MAX_AREA_M2 {
        return Err(Rejection::TooLarge {
            area_m2,
            max_m2: MAX_AREA_M2,
        });
    }

    if let Some(hit) = first_overlap(candidate, existing, exclude_id) {
        return Err(Rejection::Overlaps {
            id: hit.id(),
            name: hit.name().to_string(),
        });
    }

    Ok(area_m2)
}
