use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{BoundingRect, Coord, Line, LineString, Polygon, Rect};

/// Axis-aligned lon/lat extent
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Extent {
    /// Extent spanned by two opposite corners, in any order
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            min_lon: a.0.min(b.0),
            min_lat: a.1.min(b.1),
            max_lon: a.0.max(b.0),
            max_lat: a.1.max(b.1),
        }
    }

    /// Bounding extent of a geometry, `None` when it is empty
    pub fn of<G: BoundingRect<f64>>(geometry: &G) -> Option<Self> {
        let rect: Option<Rect<f64>> = geometry.bounding_rect().into();
        rect.map(Self::from)
    }

    /// Inclusive test, touching extents intersect
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) * 0.5,
            (self.min_lat + self.max_lat) * 0.5,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Rectangle with a closed counter-clockwise exterior: 4 corners plus
    /// the closing repeat
    pub fn to_polygon(&self) -> Polygon<f64> {
        let exterior = LineString::from(vec![
            (self.min_lon, self.min_lat),
            (self.max_lon, self.min_lat),
            (self.max_lon, self.max_lat),
            (self.min_lon, self.max_lat),
            (self.min_lon, self.min_lat),
        ]);
        Polygon::new(exterior, vec![])
    }
}

impl From<Rect<f64>> for Extent {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        }
    }
}

/// Exterior vertices without the closing repeat
pub fn vertices(polygon: &Polygon<f64>) -> &[Coord<f64>] {
    let coords = polygon.exterior().0.as_slice();
    match coords {
        [first, .., last] if first == last => &coords[..coords.len() - 1],
        _ => coords,
    }
}

/// Number of distinct exterior vertices
pub fn distinct_vertex_count(polygon: &Polygon<f64>) -> usize {
    let pts = vertices(polygon);
    pts.iter()
        .enumerate()
        .filter(|(i, p)| !pts[..*i].contains(p))
        .count()
}

/// Proper crossing of two segments. Touching at an endpoint or running
/// along each other does not count.
pub fn segments_cross(a: Line<f64>, b: Line<f64>) -> bool {
    matches!(
        line_intersection(a, b),
        Some(LineIntersection::SinglePoint {
            is_proper: true,
            ..
        })
    )
}
