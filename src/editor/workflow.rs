//! Boundary edit workflow: the landmark being edited, the landmarks around
//! it, and the hand-off of a confirmed boundary to the save callback.
//!
//! Nothing here talks to the network. The callback's owner performs the
//! request and reports back through [`BoundaryWorkflow::commit_saved`].

use geo::Polygon;
use log::{debug, warn};

use super::admission::admit;
use super::draft::DrawSession;
use crate::error::Rejection;
use crate::geometry::Footprint;
use crate::model::Landmark;
use crate::wkt::{format_polygon, parse_polygon};

/// Parse a stored boundary. An open exterior is closed on the way in.
pub(crate) fn read_boundary(wkt: &str) -> Option<Polygon<f64>> {
    parse_polygon(wkt).map(|exterior| Polygon::new(exterior, vec![]))
}

/// A landmark together with its parsed boundary
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkShape {
    pub landmark: Landmark,
    pub boundary: Polygon<f64>,
}

impl LandmarkShape {
    /// `None` when the boundary is not a readable polygon
    pub fn parse(landmark: Landmark) -> Option<Self> {
        let boundary = read_boundary(&landmark.boundary)?;
        Some(Self { landmark, boundary })
    }
}

impl Footprint for LandmarkShape {
    fn id(&self) -> i64 {
        self.landmark.id
    }

    fn polygon(&self) -> &Polygon<f64> {
        &self.boundary
    }

    fn name(&self) -> &str {
        &self.landmark.name
    }
}

/// Receives the confirmed boundary as a WKT polygon
pub type SaveCallback = Box<dyn FnMut(String)>;

pub struct BoundaryWorkflow {
    target: Option<Landmark>,
    target_boundary: Option<Polygon<f64>>,
    neighbours: Vec<LandmarkShape>,
    show_neighbours: bool,
    on_save: SaveCallback,
}

impl BoundaryWorkflow {
    pub fn new(on_save: SaveCallback) -> Self {
        Self {
            target: None,
            target_boundary: None,
            neighbours: Vec::new(),
            show_neighbours: true,
            on_save,
        }
    }

    /// Load the landmark being edited. Returns its boundary when readable.
    pub fn load_target(&mut self, landmark: Landmark) -> Option<&Polygon<f64>> {
        self.target_boundary = read_boundary(&landmark.boundary);
        if self.target_boundary.is_none() {
            warn!(
                "landmark #{} has an unreadable boundary: {:?}",
                landmark.id, landmark.boundary
            );
        }
        let id = landmark.id;
        self.neighbours.retain(|n| n.landmark.id != id);
        self.target = Some(landmark);
        self.target_boundary.as_ref()
    }

    pub fn target(&self) -> Option<&Landmark> {
        self.target.as_ref()
    }

    pub fn target_boundary(&self) -> Option<&Polygon<f64>> {
        self.target_boundary.as_ref()
    }

    /// Id left out of the overlap check
    pub fn exclude_id(&self) -> Option<i64> {
        self.target.as_ref().map(|t| t.id)
    }

    /// Replace the landmarks in view. The target and unreadable boundaries
    /// are left out; returns how many were skipped as unreadable.
    pub fn set_in_view(&mut self, landmarks: Vec<Landmark>) -> usize {
        let exclude = self.exclude_id();
        let mut skipped = 0;
        self.neighbours = landmarks
            .into_iter()
            .filter(|l| Some(l.id) != exclude)
            .filter_map(|l| {
                let id = l.id;
                let shape = LandmarkShape::parse(l);
                if shape.is_none() {
                    debug!("skipping landmark #{id}: unreadable boundary");
                    skipped += 1;
                }
                shape
            })
            .collect();
        skipped
    }

    /// Every loaded neighbour, shown or not
    pub fn neighbours(&self) -> &[LandmarkShape] {
        &self.neighbours
    }

    /// Neighbours to draw, empty while hidden
    pub fn visible_neighbours(&self) -> &[LandmarkShape] {
        if self.show_neighbours {
            &self.neighbours
        } else {
            &[]
        }
    }

    pub fn shows_neighbours(&self) -> bool {
        self.show_neighbours
    }

    pub fn toggle_neighbours(&mut self) -> bool {
        self.show_neighbours = !self.show_neighbours;
        self.show_neighbours
    }

    /// End the current draw and validate it against every loaded
    /// neighbour, hidden or not
    pub fn finish_draw(&self, draft: &mut DrawSession) -> Option<Result<f64, Rejection>> {
        draft.finish(&self.neighbours, self.exclude_id())
    }

    /// Validate a pending candidate against the neighbours loaded now.
    /// A candidate that no longer passes is discarded.
    pub fn recheck(&self, draft: &mut DrawSession) -> Option<Rejection> {
        let candidate = draft.pending()?;
        let rejection = admit(candidate, &self.neighbours, self.exclude_id()).err()?;
        debug!("pending candidate dropped: {rejection}");
        draft.cancel();
        Some(rejection)
    }

    /// Re-check the pending candidate, then pass it to the save callback.
    /// Returns the WKT handed over, `None` when nothing was pending.
    pub fn confirm(&mut self, draft: &mut DrawSession) -> Option<Result<String, Rejection>> {
        if let Some(rejection) = self.recheck(draft) {
            return Some(Err(rejection));
        }
        let boundary = draft.confirm()?;
        let wkt = format_polygon(boundary.exterior());
        (self.on_save)(wkt.clone());
        Some(Ok(wkt))
    }

    /// Adopt a boundary the backend has accepted
    pub fn commit_saved(&mut self, wkt: &str) {
        if let Some(target) = self.target.as_mut() {
            target.boundary = wkt.to_string();
            self.target_boundary = read_boundary(wkt);
        }
    }
}
