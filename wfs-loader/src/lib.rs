//! # wfs-loader
//!
//! Parcourir les serveurs WFS néerlandais (RIVM, Risicokaart, Geodan) et importer une couche.
//!
//! ## Features
//!
//! - Liste de serveurs WFS embarquée ou fichier JSON
//! - Téléchargement GetFeature (WFS 2.0.0, sortie GeoJSON)
//! - Import GeoJSON -> WKT tolérant aux features malformées
//! - Export GeoJSON standalone et rapport d'import
//!
//! ## Usage CLI
//!
//! ```bash
//! # Serveurs connus
//! wfs-loader servers
//!
//! # Import d'une couche vers GeoJSON
//! wfs-loader import --server alo --layer alo:geluid_weg --output ./geluid_weg.geojson
//!
//! # Import depuis une réponse GetFeature déjà téléchargée
//! wfs-loader import --input ./response.json --layer geluid_weg --output ./out.geojson
//! ```

pub mod config;
pub mod export;
pub mod fetch;
pub mod report;

pub use config::{Config, FetchConfig, ServerConfig};
pub use fetch::{fetch_layer, get_feature_url, FetchError};
pub use report::{ImportReport, ImportStatus};
