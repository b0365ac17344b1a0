pub mod geo;
pub mod nyc;

pub use geo::{BoroughBoundary, Landmark, MapCoords, MarkerColor};
