//! # wfs-import
//!
//! Import des réponses WFS `GetFeature` (GeoJSON) en enregistrements WKT + attributs.
//!
//! ## Features
//!
//! - Conversion GeoJSON -> WKT (Point, MultiPoint, Polygon, MultiPolygon)
//! - Inférence du schéma attributaire depuis une feature exemple
//! - Features malformées ignorées et comptées, jamais fatales
//! - Conversion parallèle optionnelle (`rayon`) qui conserve l'ordre
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wfs_import::{import_slice, ImportOptions, TracingSink};
//!
//! let outcome = import_slice(&body, &ImportOptions::default(), &mut TracingSink)?;
//! println!("{}", outcome.summary());
//!
//! for record in &outcome.records {
//!     println!("{} {:?}", record.wkt, record.attributes);
//! }
//! ```

pub mod error;
pub mod geometry;
pub mod host;
pub mod pipeline;
pub mod schema;
pub mod types;
pub mod wkt;

pub use error::{GeometryError, HostError, ImportError, SkipReason};
pub use geometry::{Geometry, GeometryKind, LayerFamily};
pub use host::{load_layer, LayerSink, LayerSpec, MemoryLayer};
pub use pipeline::{
    import, Diagnostic, DiagnosticSink, ImportOptions, ImportOutcome, ImportRecord, TracingSink,
    DEFAULT_CRS,
};
pub use schema::{infer, AttributeSchema, Field, FieldKind};
pub use types::{Feature, FeatureCollection, Properties, PropertyValue};
pub use wkt::{geojson_to_wkt, translate};

/// Parse le corps d'une réponse GetFeature puis l'importe.
///
/// # Errors
///
/// `ImportError::InvalidPayload` si le corps n'est pas une FeatureCollection,
/// puis les erreurs fatales de [`import`].
pub fn import_slice(
    body: &[u8],
    options: &ImportOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<ImportOutcome, ImportError> {
    let collection = FeatureCollection::from_slice(body)?;
    import(&collection, options, sink)
}
