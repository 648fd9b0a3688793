use std::f64::consts::PI;

use super::area::EARTH_RADIUS_M;

/// Latitude where Web Mercator becomes square
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project lon/lat to normalized Web Mercator: x and y in [0, 1], y growing south
pub fn to_unit(lon: f64, lat: f64) -> (f64, f64) {
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lon + 180.0) / 360.0;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    (x, y)
}

/// Inverse of [`to_unit`]
pub fn from_unit(x: f64, y: f64) -> (f64, f64) {
    let lon = x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    (lon, lat)
}

/// Project lon/lat to Web Mercator metres (EPSG:3857)
pub fn to_meters(lon: f64, lat: f64) -> (f64, f64) {
    let (x, y) = to_unit(lon, lat);
    let world = 2.0 * PI * EARTH_RADIUS_M;
    ((x - 0.5) * world, (0.5 - y) * world)
}

/// Inverse of [`to_meters`]
pub fn from_meters(x: f64, y: f64) -> (f64, f64) {
    let world = 2.0 * PI * EARTH_RADIUS_M;
    from_unit(x / world + 0.5, 0.5 - y / world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin() {
        assert_eq!(to_unit(0.0, 0.0), (0.5, 0.5));
        let (x, y) = to_meters(0.0, 0.0);
        assert_relative_eq!(x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let (x, y) = to_meters(76.9366, 8.5241);
        let (lon, lat) = from_meters(x, y);
        assert_relative_eq!(lon, 76.9366, epsilon = 1e-9);
        assert_relative_eq!(lat, 8.5241, epsilon = 1e-9);
    }

    #[test]
    fn test_known_meters() {
        // One degree of longitude at the equator
        let (x, _) = to_meters(1.0, 0.0);
        assert_relative_eq!(x, 111_319.490_793, epsilon = 1e-3);
    }
}
