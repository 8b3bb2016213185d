mod geometry;
mod projection;
mod renderer;

pub use projection::{LatLngBounds, Viewport, MAX_ZOOM, MIN_ZOOM};
pub use renderer::{Lod, MapRenderer, Place};
