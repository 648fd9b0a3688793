mod basemap;
pub mod draw;
mod projection;
mod renderer;
mod spatial;

pub use basemap::Basemap;
pub use projection::{Viewport, MAX_ZOOM, MIN_ZOOM};
pub use renderer::{CandidateLayer, Label, LabelKind, MapLayers, MapRenderer, Overlay};
