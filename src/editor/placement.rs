//! Bus stop placement: pick a point inside the selected landmark.

use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Coord, Polygon};
use log::debug;

use super::workflow::read_boundary;
use crate::error::PlacementError;
use crate::model::{BusStop, Landmark};
use crate::wkt::{format_point, parse_point};

/// Receives the confirmed stop location as a WKT point
pub type PlaceCallback = Box<dyn FnMut(String)>;

pub struct StopPlacement {
    landmark: Option<Landmark>,
    boundary: Option<Polygon<f64>>,
    chosen: Option<(f64, f64)>,
    existing: Vec<(String, (f64, f64))>,
    on_place: PlaceCallback,
}

impl StopPlacement {
    pub fn new(on_place: PlaceCallback) -> Self {
        Self {
            landmark: None,
            boundary: None,
            chosen: None,
            existing: Vec::new(),
            on_place,
        }
    }

    /// Select the landmark the stop belongs to; clears any chosen point
    pub fn select_landmark(&mut self, landmark: Landmark) -> Option<&Polygon<f64>> {
        self.boundary = read_boundary(&landmark.boundary);
        self.landmark = Some(landmark);
        self.chosen = None;
        self.boundary.as_ref()
    }

    pub fn landmark(&self) -> Option<&Landmark> {
        self.landmark.as_ref()
    }

    pub fn boundary(&self) -> Option<&Polygon<f64>> {
        self.boundary.as_ref()
    }

    pub fn chosen(&self) -> Option<(f64, f64)> {
        self.chosen
    }

    /// Stops already registered under the landmark, for display
    pub fn existing(&self) -> &[(String, (f64, f64))] {
        &self.existing
    }

    pub fn set_existing(&mut self, stops: Vec<BusStop>) {
        self.existing = stops
            .into_iter()
            .filter_map(|stop| match parse_point(&stop.location) {
                Some(at) => Some((stop.name, at)),
                None => {
                    debug!("skipping bus stop #{}: unreadable location", stop.id);
                    None
                }
            })
            .collect();
    }

    /// Choose a point; it must lie strictly inside the landmark boundary
    pub fn select(&mut self, point: (f64, f64)) -> Result<(), PlacementError> {
        let name = self
            .landmark
            .as_ref()
            .map(|l| l.name.clone())
            .unwrap_or_default();
        let boundary = self
            .boundary
            .as_ref()
            .ok_or_else(|| PlacementError::NoBoundary(name.clone()))?;

        match boundary.coordinate_position(&Coord::from(point)) {
            CoordPos::Inside => {
                self.chosen = Some(point);
                Ok(())
            }
            CoordPos::OnBoundary | CoordPos::Outside => {
                Err(PlacementError::OutsideBoundary(name))
            }
        }
    }

    pub fn clear(&mut self) -> bool {
        self.chosen.take().is_some()
    }

    /// Hand the chosen point to the callback as `POINT(lon lat)`
    pub fn confirm(&mut self) -> Option<String> {
        let (lon, lat) = self.chosen.take()?;
        let wkt = format_point(lon, lat);
        (self.on_place)(wkt.clone());
        Some(wkt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Extent;
    use crate::model::{Importance, LandmarkStatus};
    use crate::wkt::format_polygon;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn placement() -> (StopPlacement, Rc<RefCell<Vec<String>>>) {
        let placed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&placed);
        let mut placement = StopPlacement::new(Box::new(move |wkt| sink.borrow_mut().push(wkt)));
        let block = Extent::from_corners((76.90, 8.50), (76.91, 8.51)).to_polygon();
        placement.select_landmark(Landmark {
            id: 7,
            name: "Thampanoor".to_string(),
            boundary: format_polygon(block.exterior()),
            status: LandmarkStatus::Verified,
            importance: Importance::High,
        });
        (placement, placed)
    }

    #[test]
    fn test_point_inside_is_accepted() {
        let (mut placement, placed) = placement();
        placement.select((76.905, 8.505)).unwrap();
        assert_eq!(placement.confirm().as_deref(), Some("POINT(76.905 8.505)"));
        assert_eq!(placed.borrow().len(), 1);
        assert!(placement.chosen().is_none());
    }

    #[test]
    fn test_point_outside_is_rejected() {
        let (mut placement, placed) = placement();
        let err = placement.select((76.92, 8.505)).unwrap_err();
        assert_eq!(err, PlacementError::OutsideBoundary("Thampanoor".to_string()));
        assert!(placement.confirm().is_none());
        assert!(placed.borrow().is_empty());
    }

    #[test]
    fn test_point_on_boundary_line_is_rejected() {
        let (mut placement, _) = placement();
        assert!(placement.select((76.91, 8.505)).is_err());
        assert!(placement.select((76.90, 8.50)).is_err());
        assert!(placement.chosen().is_none());
    }

    #[test]
    fn test_rejected_click_keeps_previous_choice() {
        let (mut placement, _) = placement();
        placement.select((76.905, 8.505)).unwrap();
        assert!(placement.select((80.0, 8.0)).is_err());
        assert_eq!(placement.chosen(), Some((76.905, 8.505)));
        assert!(placement.clear());
    }

    #[test]
    fn test_unreadable_boundary() {
        let mut placement = StopPlacement::new(Box::new(|_| {}));
        assert!(matches!(placement.select((0.0, 0.0)), Err(PlacementError::NoBoundary(_))));
    }

    #[test]
    fn test_existing_stops_skip_bad_locations() {
        let (mut placement, _) = placement();
        placement.set_existing(vec![
            BusStop {
                id: 1,
                name: "Central".to_string(),
                landmark_id: 7,
                location: "POINT(76.901 8.501)".to_string(),
                status: LandmarkStatus::Verified,
            },
            BusStop {
                id: 2,
                name: "Broken".to_string(),
                landmark_id: 7,
                location: "POINT()".to_string(),
                status: LandmarkStatus::Validating,
            },
        ]);
        assert_eq!(placement.existing(), &[("Central".to_string(), (76.901, 8.501))]);
    }
}
