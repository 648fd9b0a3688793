//! Landmark editing: admission check, draw session, viewport query
//! plumbing, bus stop placement and the edit workflow.

pub mod admission;
pub mod draft;
pub mod placement;
pub mod settle;
pub mod workflow;

pub use admission::{admit, MAX_AREA_M2, MIN_AREA_M2};
pub use draft::{DraftState, DrawSession, DrawShape};
pub use placement::StopPlacement;
pub use settle::{MoveSettle, RequestGate, ViewQuery};
pub use workflow::{BoundaryWorkflow, LandmarkShape};
