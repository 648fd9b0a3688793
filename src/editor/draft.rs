//! Drawing session state machine.
//!
//! ```text
//! Idle -> Drawing -> finish -> Pending -> confirm/cancel -> Idle
//!                          \-> rejected -> Idle
//! ```
//!
//! The state holds at most one candidate; starting a new draw drops
//! whatever was pending.

use geo::Polygon;
use log::debug;

use super::admission::admit;
use crate::error::Rejection;
use crate::geometry::mercator::{from_meters, to_meters};
use crate::geometry::{area_m2, Extent, Footprint};

/// Drag gesture used to draw a boundary. Both persist as a rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawShape {
    /// Anchor is the centre, the cursor sets the radius
    Circle,
    /// Anchor and cursor are opposite corners
    Box,
}

impl DrawShape {
    pub fn label(self) -> &'static str {
        match self {
            DrawShape::Circle => "circle",
            DrawShape::Box => "box",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DraftState {
    Idle,
    Drawing {
        shape: DrawShape,
        anchor: (f64, f64),
        cursor: (f64, f64),
    },
    Pending {
        boundary: Polygon<f64>,
        area_m2: f64,
    },
}

pub struct DrawSession {
    state: DraftState,
}

impl DrawSession {
    pub fn new() -> Self {
        Self {
            state: DraftState::Idle,
        }
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DraftState::Drawing { .. })
    }

    /// Candidate waiting for confirmation
    pub fn pending(&self) -> Option<&Polygon<f64>> {
        match &self.state {
            DraftState::Pending { boundary, .. } => Some(boundary),
            _ => None,
        }
    }

    /// Start a new draw, discarding any stale candidate
    pub fn begin(&mut self, shape: DrawShape, anchor: (f64, f64)) {
        if !matches!(self.state, DraftState::Idle) {
            debug!("discarding previous candidate to start a new {} draw", shape.label());
        }
        self.state = DraftState::Drawing {
            shape,
            anchor,
            cursor: anchor,
        };
    }

    /// Move the drag cursor; returns the live area readout in m²
    pub fn drag(&mut self, to: (f64, f64)) -> Option<f64> {
        match &mut self.state {
            DraftState::Drawing { cursor, .. } => *cursor = to,
            _ => return None,
        }
        self.outline().map(|boundary| area_m2(&boundary))
    }

    /// Boundary to draw on the overlay: the normalized rectangle while
    /// dragging, the candidate once pending
    pub fn outline(&self) -> Option<Polygon<f64>> {
        match &self.state {
            DraftState::Idle => None,
            DraftState::Drawing {
                shape,
                anchor,
                cursor,
            } => Some(bounding_rectangle(*shape, *anchor, *cursor)),
            DraftState::Pending { boundary, .. } => Some(boundary.clone()),
        }
    }

    /// End the drag and validate the candidate.
    ///
    /// `None` when no draw was in progress. On rejection the candidate is
    /// discarded and the session returns to idle.
    pub fn finish<F: Footprint>(
        &mut self,
        existing: &[F],
        exclude_id: Option<i64>,
    ) -> Option<Result<f64, Rejection>> {
        let boundary = match &self.state {
            DraftState::Drawing { .. } => self.outline()?,
            _ => return None,
        };

        match admit(&boundary, existing, exclude_id) {
            Ok(area_m2) => {
                self.state = DraftState::Pending { boundary, area_m2 };
                Some(Ok(area_m2))
            }
            Err(rejection) => {
                debug!("candidate rejected: {rejection}");
                self.state = DraftState::Idle;
                Some(Err(rejection))
            }
        }
    }

    /// Hand out the pending candidate and return to idle
    pub fn confirm(&mut self) -> Option<Polygon<f64>> {
        match std::mem::replace(&mut self.state, DraftState::Idle) {
            DraftState::Pending { boundary, .. } => Some(boundary),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Drop whatever is in progress; returns false when already idle
    pub fn cancel(&mut self) -> bool {
        let was_active = !matches!(self.state, DraftState::Idle);
        self.state = DraftState::Idle;
        was_active
    }
}

impl Default for DrawSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Rectangle persisted for a drag gesture. The circle gesture is measured
/// in Web Mercator metres and saved as its circumscribed rectangle.
pub fn bounding_rectangle(
    shape: DrawShape,
    anchor: (f64, f64),
    cursor: (f64, f64),
) -> Polygon<f64> {
    match shape {
        DrawShape::Box => Extent::from_corners(anchor, cursor).to_polygon(),
        DrawShape::Circle => {
            let (cx, cy) = to_meters(anchor.0, anchor.1);
            let (px, py) = to_meters(cursor.0, cursor.1);
            let r = (px - cx).hypot(py - cy);
            let south_west = from_meters(cx - r, cy - r);
            let north_east = from_meters(cx + r, cy + r);
            Extent::from_corners(south_west, north_east).to_polygon()
        }
    }
}
