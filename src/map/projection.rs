use crate::geometry::mercator::{from_unit, to_unit};
use crate::geometry::Extent;

/// Closest zoom: a few metres across the whole canvas
pub const MAX_ZOOM: f64 = 4_194_304.0; // 2^22
pub const MIN_ZOOM: f64 = 0.5;

/// Viewport representing the visible map area and zoom level
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (clamped to the Mercator limit)
    pub center_lat: f64,
    /// How many canvas widths the whole world spans
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    /// Viewport at a slippy-style zoom level (`zoom = 2^level`)
    pub fn at_level(center: (f64, f64), level: f64, width: usize, height: usize) -> Self {
        Self::new(center.0, center.1, 2f64.powf(level), width, height)
    }

    /// Zoom level, log2 of the zoom factor
    pub fn level(&self) -> f64 {
        self.zoom.log2()
    }

    /// Pixels per unit of normalized Mercator
    fn scale(&self) -> f64 {
        self.zoom * self.width.max(1) as f64
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let (cx, cy) = to_unit(self.center_lon, self.center_lat);
        let scale = self.scale();
        let x = (cx + dx as f64 / scale).rem_euclid(1.0);
        let y = (cy + dy as f64 / scale).clamp(0.0, 1.0);
        self.set_center_unit(x, y);
    }

    fn set_center_unit(&mut self, x: f64, y: f64) {
        let (lon, lat) = from_unit(x, y);
        self.center_on(lon, lat);
    }

    /// Move the centre without changing zoom
    pub fn center_on(&mut self, lon: f64, lat: f64) {
        self.center_lon = lon;
        self.center_lat = lat.clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor keeping the point under the pixel fixed
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        let (x, y) = to_unit(lon, lat);

        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        let scale = self.scale();
        let cx = x - (px as f64 - self.width as f64 / 2.0) / scale;
        let cy = y - (py as f64 - self.height as f64 / 2.0) / scale;
        self.set_center_unit(cx.rem_euclid(1.0), cy.clamp(0.0, 1.0));
    }

    /// Centre on an extent and zoom so it fills most of the canvas
    pub fn fit_extent(&mut self, extent: &Extent) {
        let (x0, y1) = to_unit(extent.min_lon, extent.min_lat);
        let (x1, y0) = to_unit(extent.max_lon, extent.max_lat);
        let span_x = (x1 - x0).max(1e-12);
        let span_y = (y1 - y0).max(1e-12);

        let width = self.width.max(1) as f64;
        let height = self.height.max(1) as f64;
        let fit = (1.0 / span_x).min(height / (width * span_y));
        self.zoom = (fit * 0.8).clamp(MIN_ZOOM, MAX_ZOOM);

        self.set_center_unit((x0 + x1) * 0.5, (y0 + y1) * 0.5);
    }

    /// Geographic extent currently on screen
    pub fn visible_extent(&self) -> Extent {
        let (west, north) = self.unproject(0, 0);
        let (east, south) = self.unproject(self.width as i32, self.height as i32);
        Extent::from_corners((west, south), (east, north))
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        self.unproject_f(px as f64, py as f64)
    }

    /// Sub-pixel unprojection
    pub fn unproject_f(&self, px: f64, py: f64) -> (f64, f64) {
        let (cx, cy) = to_unit(self.center_lon, self.center_lat);
        let scale = self.scale();

        let x = (px - self.width as f64 / 2.0) / scale + cx;
        let y = ((py - self.height as f64 / 2.0) / scale + cy).clamp(0.0, 1.0);

        from_unit(x, y)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (px, py) = self.project_f(lon, lat);
        // Saturating casts keep far-off points from wrapping around
        (px.round() as i32, py.round() as i32)
    }

    /// Sub-pixel projection, used when segments need clipping
    pub fn project_f(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = to_unit(lon, lat);
        let (cx, cy) = to_unit(self.center_lon, self.center_lat);
        let scale = self.scale();

        (
            (x - cx) * scale + self.width as f64 / 2.0,
            (y - cy) * scale + self.height as f64 / 2.0,
        )
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        assert_eq!(vp.project(0.0, 0.0), (50, 50));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::at_level((76.9366, 8.5241), 15.0, 200, 120);
        let (px, py) = vp.project(76.94, 8.52);
        let (lon, lat) = vp.unproject(px, py);
        // Within a pixel at this zoom
        assert_relative_eq!(lon, 76.94, epsilon = 1e-4);
        assert_relative_eq!(lat, 8.52, epsilon = 1e-4);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
        vp.pan(0, 10);
        assert!(vp.center_lat < 0.0);
        vp.pan(-10, -10);
        assert_relative_eq!(vp.center_lon, 0.0, epsilon = 1e-9);
        assert_relative_eq!(vp.center_lat, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zoom_at_keeps_point_under_cursor() {
        let mut vp = Viewport::at_level((76.9, 8.5), 12.0, 200, 100);
        let before = vp.unproject(30, 20);
        vp.zoom_in_at(30, 20);
        let after = vp.unproject(30, 20);
        assert_relative_eq!(before.0, after.0, epsilon = 1e-9);
        assert_relative_eq!(before.1, after.1, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_extent() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 200, 100);
        let extent = Extent::from_corners((76.90, 8.50), (76.91, 8.51));
        vp.fit_extent(&extent);

        assert_relative_eq!(vp.center_lon, 76.905, epsilon = 1e-6);
        assert_relative_eq!(vp.center_lat, 8.505, epsilon = 1e-4);

        let (x0, y0) = vp.project(76.90, 8.51);
        let (x1, y1) = vp.project(76.91, 8.50);
        assert!(x0 >= 0 && x1 <= 200 && y0 >= 0 && y1 <= 100);
        // Fills most of the limiting dimension
        assert!((y1 - y0) >= 70);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = Viewport::new(0.0, 0.0, MAX_ZOOM, 100, 100);
        vp.zoom_in();
        assert_eq!(vp.zoom, MAX_ZOOM);
        let vp = Viewport::new(0.0, 0.0, 0.01, 100, 100);
        assert_eq!(vp.zoom, MIN_ZOOM);
    }
}
