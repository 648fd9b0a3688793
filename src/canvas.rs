//! Map canvas adapter: viewport, pointer gestures, the draw session,
//! basemap choice, animated flights and the "moveend" debounce.

use std::time::Instant;

use geo::Polygon;
use glam::DVec3;

use crate::editor::{DraftState, DrawSession, DrawShape, MoveSettle};
use crate::geometry::mercator::{from_unit, to_unit};
use crate::geometry::Extent;
use crate::map::{Basemap, CandidateLayer, Viewport};

/// Frames a location-search flight takes (~0.8 s at 60 fps)
const FLIGHT_FRAMES: u32 = 48;
/// Zoom level a flight lands at
pub const FLIGHT_LEVEL: f64 = 16.0;

/// What a mouse drag does
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    Pan,
    Draw(DrawShape),
    /// Click picks a point (bus stop placement)
    Select,
}

impl Tool {
    pub fn label(self) -> &'static str {
        match self {
            Tool::Pan => "pan",
            Tool::Draw(shape) => shape.label(),
            Tool::Select => "select",
        }
    }
}

/// Gesture the owner has to act on
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// A draw drag was released; the candidate needs validating
    DrawEnded,
    /// Click without drag at (lon, lat)
    Click((f64, f64)),
}

/// Unit Mercator x, y and zoom level at both ends
struct Flight {
    from: DVec3,
    to: DVec3,
    frame: u32,
}

impl Flight {
    /// Position at the current frame; true once the last frame is reached
    fn step(&mut self) -> (DVec3, bool) {
        self.frame += 1;
        let t = (self.frame as f64 / FLIGHT_FRAMES as f64).min(1.0);
        let eased = t * t * (3.0 - 2.0 * t);
        (self.from.lerp(self.to, eased), self.frame >= FLIGHT_FRAMES)
    }
}

pub struct MapCanvas {
    pub viewport: Viewport,
    pub basemap: Basemap,
    pub tool: Tool,
    /// Boundary sessions draw; placement sessions select
    drawing: bool,
    pub draft: DrawSession,
    settle: MoveSettle,
    flight: Option<Flight>,
    /// Last mouse position for drag tracking
    last_mouse: Option<(u16, u16)>,
    /// Whether the current press has moved
    dragged: bool,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Live area readout while dragging a draw
    live_area: Option<f64>,
}

impl MapCanvas {
    /// `width`/`height` are the terminal size in characters
    pub fn new(center: (f64, f64), level: f64, width: usize, height: usize, drawing: bool) -> Self {
        let (pixel_width, pixel_height) = pixel_size(width, height);
        Self {
            viewport: Viewport::at_level(center, level, pixel_width, pixel_height),
            basemap: Basemap::default(),
            tool: if drawing { Tool::Pan } else { Tool::Select },
            drawing,
            draft: DrawSession::new(),
            settle: MoveSettle::default(),
            flight: None,
            last_mouse: None,
            dragged: false,
            mouse_pos: None,
            live_area: None,
        }
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = pixel_size(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
        self.settle.note_move(Instant::now());
    }

    /// Geographic position under a terminal cell
    pub fn lon_lat_at(&self, col: u16, row: u16) -> (f64, f64) {
        let (px, py) = to_pixel(col, row);
        self.viewport.unproject(px, py)
    }

    pub fn pan(&mut self, dx: i32, dy: i32, now: Instant) {
        self.flight = None;
        self.viewport.pan(dx, dy);
        self.settle.note_move(now);
    }

    pub fn zoom_in(&mut self, now: Instant) {
        self.flight = None;
        self.viewport.zoom_in();
        self.settle.note_move(now);
    }

    pub fn zoom_out(&mut self, now: Instant) {
        self.flight = None;
        self.viewport.zoom_out();
        self.settle.note_move(now);
    }

    /// Zoom towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16, now: Instant) {
        self.flight = None;
        let (px, py) = to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
        self.settle.note_move(now);
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16, now: Instant) {
        self.flight = None;
        let (px, py) = to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
        self.settle.note_move(now);
    }

    /// Frame a boundary; false when it has no extent
    pub fn fit_to(&mut self, boundary: &Polygon<f64>, now: Instant) -> bool {
        let Some(extent) = Extent::of(boundary) else {
            return false;
        };
        self.flight = None;
        self.viewport.fit_extent(&extent);
        self.settle.note_move(now);
        true
    }

    /// Animate the viewport to a point
    pub fn fly_to(&mut self, lon: f64, lat: f64) {
        let (fx, fy) = to_unit(self.viewport.center_lon, self.viewport.center_lat);
        let (tx, ty) = to_unit(lon, lat);
        let level = self.viewport.level().max(FLIGHT_LEVEL);
        self.flight = Some(Flight {
            from: DVec3::new(fx, fy, self.viewport.level()),
            to: DVec3::new(tx, ty, level),
            frame: 0,
        });
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Advance animation; true once when the view has settled after moving
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(flight) = self.flight.as_mut() {
            let (at, done) = flight.step();
            let (lon, lat) = from_unit(at.x, at.y);
            self.viewport = Viewport::at_level(
                (lon, lat),
                at.z,
                self.viewport.width,
                self.viewport.height,
            );
            self.settle.note_move(now);
            if done {
                self.flight = None;
            }
            return false;
        }
        self.settle.poll(now)
    }

    pub fn is_moving(&self) -> bool {
        self.flight.is_some() || self.settle.is_moving()
    }

    pub fn cycle_basemap(&mut self) -> Basemap {
        self.basemap = self.basemap.next();
        self.basemap
    }

    /// Next drag tool: pan, circle, box for drawing sessions; pan and select otherwise
    pub fn cycle_tool(&mut self) -> Tool {
        self.tool = match (self.tool, self.drawing) {
            (Tool::Pan, true) => Tool::Draw(DrawShape::Circle),
            (Tool::Draw(DrawShape::Circle), true) => Tool::Draw(DrawShape::Box),
            (Tool::Pan, false) => Tool::Select,
            _ => Tool::Pan,
        };
        self.tool
    }

    pub fn pointer_down(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
        if let Tool::Draw(shape) = self.tool {
            let anchor = self.lon_lat_at(col, row);
            self.draft.begin(shape, anchor);
            self.live_area = Some(0.0);
        }
    }

    pub fn pointer_drag(&mut self, col: u16, row: u16, now: Instant) {
        let Some((last_x, last_y)) = self.last_mouse else {
            self.pointer_down(col, row);
            return;
        };
        if (last_x, last_y) != (col, row) {
            self.dragged = true;
        }

        match self.tool {
            Tool::Draw(_) if self.draft.is_drawing() => {
                let cursor = self.lon_lat_at(col, row);
                self.live_area = self.draft.drag(cursor);
            }
            _ => {
                // Terminal cells are 2x4 braille pixels
                let dx = (last_x as i32 - col as i32) * 2;
                let dy = (last_y as i32 - row as i32) * 4;
                if dx != 0 || dy != 0 {
                    self.pan(dx, dy, now);
                }
            }
        }
        self.last_mouse = Some((col, row));
    }

    pub fn pointer_up(&mut self, col: u16, row: u16) -> Option<Gesture> {
        let pressed = self.last_mouse.take();
        let dragged = std::mem::take(&mut self.dragged);

        match self.tool {
            Tool::Draw(_) if self.draft.is_drawing() => {
                let cursor = self.lon_lat_at(col, row);
                self.draft.drag(cursor);
                self.live_area = None;
                Some(Gesture::DrawEnded)
            }
            Tool::Select if pressed.is_some() && !dragged => {
                Some(Gesture::Click(self.lon_lat_at(col, row)))
            }
            _ => None,
        }
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Get mouse position in braille pixel coordinates (for rendering marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| to_pixel(col, row))
    }

    /// Live readout while drawing, the validated area once pending
    pub fn area_readout(&self) -> Option<f64> {
        match self.draft.state() {
            DraftState::Drawing { .. } => self.live_area,
            DraftState::Pending { area_m2, .. } => Some(*area_m2),
            DraftState::Idle => None,
        }
    }

    /// Candidate to draw on the overlay
    pub fn candidate(&self) -> Option<CandidateLayer> {
        let ring = self.draft.outline()?;
        Some(match self.draft.state() {
            DraftState::Pending { .. } => CandidateLayer::Pending(ring),
            _ => CandidateLayer::Drawing(ring),
        })
    }
}

/// Braille pixel size of the map area inside the border and status bar
fn pixel_size(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(3);
    (inner_width * 2, inner_height * 4)
}

/// Terminal cell to braille pixel, accounting for the 1-cell border
fn to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2;
    let py = (row.saturating_sub(1) as i32) * 4;
    (px, py)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;
    use std::time::Duration;

    fn canvas(drawing: bool) -> MapCanvas {
        // 82x33 terminal -> 160x120 braille pixels
        MapCanvas::new((76.905, 8.505), 14.0, 82, 33, drawing)
    }

    #[test]
    fn test_pixel_size_excludes_border_and_status() {
        let canvas = canvas(true);
        assert_eq!((canvas.viewport.width, canvas.viewport.height), (160, 120));
    }

    #[test]
    fn test_tool_cycle() {
        let mut drawing = canvas(true);
        assert_eq!(drawing.tool, Tool::Pan);
        assert_eq!(drawing.cycle_tool(), Tool::Draw(DrawShape::Circle));
        assert_eq!(drawing.cycle_tool(), Tool::Draw(DrawShape::Box));
        assert_eq!(drawing.cycle_tool(), Tool::Pan);

        let mut placing = canvas(false);
        assert_eq!(placing.tool, Tool::Select);
        assert_eq!(placing.cycle_tool(), Tool::Pan);
        assert_eq!(placing.cycle_tool(), Tool::Select);
    }

    #[test]
    fn test_box_drag_produces_candidate() {
        let mut canvas = canvas(true);
        canvas.tool = Tool::Draw(DrawShape::Box);
        let now = Instant::now();

        canvas.pointer_down(10, 10);
        canvas.pointer_drag(30, 20, now);
        assert!(canvas.area_readout().unwrap() > 0.0);
        assert!(matches!(canvas.candidate(), Some(CandidateLayer::Drawing(_))));

        assert_eq!(canvas.pointer_up(30, 20), Some(Gesture::DrawEnded));
        // Drawing does not move the map
        assert!(!canvas.is_moving());
    }

    #[test]
    fn test_click_without_drag_selects() {
        let mut canvas = canvas(false);
        canvas.pointer_down(41, 16);
        let gesture = canvas.pointer_up(41, 16);
        let expected = canvas.lon_lat_at(41, 16);
        assert_eq!(gesture, Some(Gesture::Click(expected)));

        // A drag pans instead of selecting
        let now = Instant::now();
        canvas.pointer_down(41, 16);
        canvas.pointer_drag(45, 16, now);
        assert_eq!(canvas.pointer_up(45, 16), None);
        assert!(canvas.is_moving());
    }

    #[test]
    fn test_pan_settles_once() {
        let mut canvas = canvas(true);
        let start = Instant::now();
        canvas.pan(10, 0, start);
        assert!(!canvas.tick(start + Duration::from_millis(100)));
        assert!(canvas.tick(start + Duration::from_millis(400)));
        assert!(!canvas.tick(start + Duration::from_millis(800)));
    }

    #[test]
    fn test_flight_lands_on_target() {
        let mut canvas = canvas(true);
        canvas.fly_to(76.9525, 8.4875);
        assert!(canvas.is_flying());

        let start = Instant::now();
        for frame in 0..FLIGHT_FRAMES {
            assert!(!canvas.tick(start + Duration::from_millis(frame as u64 * 16)));
        }
        assert!(!canvas.is_flying());
        assert!((canvas.viewport.center_lon - 76.9525).abs() < 1e-9);
        assert!((canvas.viewport.center_lat - 8.4875).abs() < 1e-9);
        assert!(canvas.viewport.level() >= FLIGHT_LEVEL - 1e-9);

        // The landing counts as a move
        assert!(canvas.tick(start + Duration::from_secs(2)));
    }

    #[test]
    fn test_fit_to_frames_boundary() {
        let mut canvas = canvas(true);
        let boundary = Extent::from_corners((77.00, 8.60), (77.01, 8.61)).to_polygon();
        assert!(canvas.fit_to(&boundary, Instant::now()));
        assert!((canvas.viewport.center_lon - 77.005).abs() < 1e-6);
        let empty = Polygon::new(LineString::new(vec![]), vec![]);
        assert!(!canvas.fit_to(&empty, Instant::now()));
    }
}
