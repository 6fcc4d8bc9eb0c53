//! Modules d'export

pub mod geojson;

pub use geojson::{export_layer_to_file, GeoJsonLayerWriter};
