//! Input layer sources

pub mod geojson;

pub use geojson::{parse_layer, read_layer};
