//! Boundary geometry on top of `geo`: extents, spherical area and the
//! overlap admission test.

mod area;
pub mod mercator;
mod overlap;
mod ring;

pub use area::{area_m2, EARTH_RADIUS_M};
pub use overlap::{
    edges_cross, first_overlap, overlaps, polygon_within, polygons_overlap, Footprint,
};
pub use ring::{distinct_vertex_count, segments_cross, vertices, Extent};
