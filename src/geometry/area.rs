use geo::{ChamberlainDuquetteArea, Polygon};

/// Radius of the Web Mercator sphere in metres
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Area of a lon/lat boundary in square metres, on the same 6 378 137 m
/// sphere the Web Mercator projection uses. Winding does not matter.
pub fn area_m2(polygon: &Polygon<f64>) -> f64 {
    polygon.chamberlain_duquette_unsigned_area()
}
