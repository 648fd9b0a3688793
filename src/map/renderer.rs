use geo::{Centroid, LineString, Polygon};

use crate::braille::BrailleCanvas;
use crate::geometry::Extent;
use crate::map::basemap::Basemap;
use crate::map::draw::{draw_circle, draw_marker, draw_ring, draw_segment, Stroke};
use crate::map::projection::Viewport;
use crate::map::spatial::FeatureGrid;

/// Below this zoom level the whole line set is drawn without the grid
const GRID_MIN_LEVEL: f64 = 5.0;
/// Cap on basemap place labels per frame
const MAX_PLACE_LABELS: usize = 40;

/// A named place from the basemap data
#[derive(Clone, Debug)]
pub struct Place {
    pub lon: f64,
    pub lat: f64,
    pub name: String,
}

/// Candidate boundary as shown on the overlay
#[derive(Clone, Debug, PartialEq)]
pub enum CandidateLayer {
    Drawing(Polygon<f64>),
    Pending(Polygon<f64>),
}

/// Everything drawn above the basemap
#[derive(Default)]
pub struct Overlay<'a> {
    /// Other landmarks, dimmed
    pub neighbours: Vec<(&'a str, &'a Polygon<f64>)>,
    /// Landmark being edited, highlighted
    pub target: Option<(&'a str, &'a Polygon<f64>)>,
    pub candidate: Option<CandidateLayer>,
    /// Bus stops already registered
    pub stops: Vec<(&'a str, (f64, f64))>,
    /// Bus stop location picked by the operator
    pub chosen: Option<(f64, f64)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelKind {
    Place,
    Landmark,
    Target,
    Stop,
}

/// Text placed at a character cell
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub col: u16,
    pub row: u16,
    pub text: String,
    pub kind: LabelKind,
}

/// Rendered layers, back to front
pub struct MapLayers {
    pub basemap: BrailleCanvas,
    pub neighbours: BrailleCanvas,
    pub target: BrailleCanvas,
    pub candidate: BrailleCanvas,
    pub candidate_pending: bool,
    pub markers: BrailleCanvas,
    pub labels: Vec<Label>,
}

/// Basemap vector data and the layer renderer
pub struct MapRenderer {
    pub coastlines: Vec<LineString<f64>>,
    pub roads: Vec<LineString<f64>>,
    pub places: Vec<Place>,
    coastline_grid: Option<FeatureGrid>,
    road_grid: Option<FeatureGrid>,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            coastlines: Vec::new(),
            roads: Vec::new(),
            places: Vec::new(),
            coastline_grid: None,
            road_grid: None,
        }
    }

    pub fn add_coastline(&mut self, line: LineString<f64>) {
        self.coastlines.push(line);
        self.coastline_grid = None;
    }

    pub fn add_road(&mut self, line: LineString<f64>) {
        self.roads.push(line);
        self.road_grid = None;
    }

    pub fn add_place(&mut self, lon: f64, lat: f64, name: &str) {
        self.places.push(Place {
            lon,
            lat,
            name: name.to_string(),
        });
    }

    /// Check if any basemap line data is loaded
    pub fn has_data(&self) -> bool {
        !self.coastlines.is_empty() || !self.roads.is_empty()
    }

    /// Index loaded lines for viewport culling; call once after loading
    pub fn build_index(&mut self) {
        self.coastline_grid = Some(FeatureGrid::build(
            self.coastlines.iter().map(|l| Extent::of(l)),
            1.0,
        ));
        self.road_grid = Some(FeatureGrid::build(
            self.roads.iter().map(|l| Extent::of(l)),
            0.1,
        ));
    }

    /// Render basemap and overlays into separate canvases.
    /// `width`/`height` are in characters.
    pub fn render(
        &self,
        width: usize,
        height: usize,
        viewport: &Viewport,
        basemap: Basemap,
        overlay: &Overlay,
    ) -> MapLayers {
        let mut layers = MapLayers {
            basemap: BrailleCanvas::new(width, height),
            neighbours: BrailleCanvas::new(width, height),
            target: BrailleCanvas::new(width, height),
            candidate: BrailleCanvas::new(width, height),
            candidate_pending: false,
            markers: BrailleCanvas::new(width, height),
            labels: Vec::new(),
        };

        self.render_basemap(&mut layers, viewport, basemap);

        for (name, boundary) in &overlay.neighbours {
            draw_ring(&mut layers.neighbours, boundary.exterior(), viewport, Stroke::Solid);
            if basemap.shows_labels() {
                push_boundary_label(
                    &mut layers.labels,
                    viewport,
                    name,
                    boundary,
                    LabelKind::Landmark,
                );
            }
        }

        if let Some((name, boundary)) = overlay.target {
            draw_ring(&mut layers.target, boundary.exterior(), viewport, Stroke::Thick);
            push_boundary_label(
                &mut layers.labels,
                viewport,
                name,
                boundary,
                LabelKind::Target,
            );
        }

        match &overlay.candidate {
            Some(CandidateLayer::Drawing(boundary)) => {
                draw_ring(&mut layers.candidate, boundary.exterior(), viewport, Stroke::Dashed);
            }
            Some(CandidateLayer::Pending(boundary)) => {
                draw_ring(&mut layers.candidate, boundary.exterior(), viewport, Stroke::Thick);
                layers.candidate_pending = true;
            }
            None => {}
        }

        for (name, (lon, lat)) in &overlay.stops {
            let (px, py) = viewport.project(*lon, *lat);
            if viewport.is_visible(px, py) {
                draw_marker(&mut layers.markers, px, py, 1);
                push_label(&mut layers.labels, px, py, name, LabelKind::Stop);
            }
        }

        if let Some((lon, lat)) = overlay.chosen {
            let (px, py) = viewport.project(lon, lat);
            draw_circle(&mut layers.markers, px, py, 2);
        }

        layers
    }

    fn render_basemap(&self, layers: &mut MapLayers, viewport: &Viewport, basemap: Basemap) {
        if !self.has_data() {
            draw_graticule(&mut layers.basemap, viewport);
            return;
        }

        let visible = viewport.visible_extent();
        let use_grid = viewport.level() >= GRID_MIN_LEVEL;

        for (lines, grid) in [
            (&self.coastlines, &self.coastline_grid),
            (&self.roads, &self.road_grid),
        ] {
            match grid {
                Some(grid) if use_grid => {
                    for idx in grid.query(&visible) {
                        self.draw_linestring(&mut layers.basemap, &lines[idx], viewport);
                    }
                }
                _ => {
                    for line in lines {
                        self.draw_linestring(&mut layers.basemap, line, viewport);
                    }
                }
            }
        }

        if basemap.shows_labels() {
            let mut placed = 0;
            for place in &self.places {
                if placed >= MAX_PLACE_LABELS {
                    break;
                }
                let (px, py) = viewport.project(place.lon, place.lat);
                if px >= 0 && py >= 0 && px < viewport.width as i32 && py < viewport.height as i32 {
                    draw_marker(&mut layers.basemap, px, py, 0);
                    push_label(&mut layers.labels, px, py, &place.name, LabelKind::Place);
                    placed += 1;
                }
            }
        }
    }

    /// Draw an open linestring, clipped to the viewport
    fn draw_linestring(
        &self,
        canvas: &mut BrailleCanvas,
        line: &LineString<f64>,
        viewport: &Viewport,
    ) {
        if line.0.len() < 2 {
            return;
        }

        // Longer jumps are antimeridian wraps, not real segments
        let max_jump = viewport.width.max(1) as f64 * 4.0;
        let mut prev: Option<(f64, f64)> = None;

        for coord in line.coords() {
            let point = viewport.project_f(coord.x, coord.y);

            if let Some(last) = prev {
                let jump = (point.0 - last.0).abs() + (point.1 - last.1).abs();
                if jump < max_jump {
                    draw_segment(canvas, last, point, viewport, Stroke::Solid);
                }
            }

            prev = Some(point);
        }
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Spacing that gives a handful of grid lines across the visible span
pub fn graticule_step(span_deg: f64) -> f64 {
    let raw = (span_deg / 4.0).max(1e-6);
    10f64.powf(raw.log10().floor())
}

/// Dashed meridians and parallels, drawn when no basemap data is loaded
fn draw_graticule(canvas: &mut BrailleCanvas, viewport: &Viewport) {
    let extent = viewport.visible_extent();
    let step = graticule_step(extent.width().max(extent.height()));

    let first_lon = (extent.min_lon / step).floor() as i64;
    let last_lon = (extent.max_lon / step).ceil() as i64;
    let first_lat = (extent.min_lat / step).floor() as i64;
    let last_lat = (extent.max_lat / step).ceil() as i64;
    if last_lon - first_lon > 200 || last_lat - first_lat > 200 {
        return;
    }

    for i in first_lon..=last_lon {
        let lon = i as f64 * step;
        let top = viewport.project_f(lon, extent.max_lat);
        let bottom = viewport.project_f(lon, extent.min_lat);
        draw_segment(canvas, top, bottom, viewport, Stroke::Dashed);
    }
    for i in first_lat..=last_lat {
        let lat = i as f64 * step;
        let left = viewport.project_f(extent.min_lon, lat);
        let right = viewport.project_f(extent.max_lon, lat);
        draw_segment(canvas, left, right, viewport, Stroke::Dashed);
    }
}

/// Label to the right of a braille pixel position
fn push_label(labels: &mut Vec<Label>, px: i32, py: i32, text: &str, kind: LabelKind) {
    if px < 0 || py < 0 || text.is_empty() {
        return;
    }
    let col = (px / 2) as u16;
    let row = (py / 4) as u16;
    if let Some(col) = col.checked_add(2) {
        labels.push(Label {
            col,
            row,
            text: text.to_string(),
            kind,
        });
    }
}

/// Label at the boundary's centroid
fn push_boundary_label(
    labels: &mut Vec<Label>,
    viewport: &Viewport,
    text: &str,
    boundary: &Polygon<f64>,
    kind: LabelKind,
) {
    if let Some(centre) = boundary.centroid() {
        let (px, py) = viewport.project(centre.x(), centre.y());
        if viewport.is_visible(px, py) {
            push_label(labels, px.saturating_sub(4), py, text, kind);
        }
    }
}
