//! Types d'erreurs pour le crate wfs-import

use thiserror::Error;

/// Erreurs fatales : l'import est abandonné et rien n'est importé
#[derive(Debug, Error)]
pub enum ImportError {
    /// Le document n'est pas une FeatureCollection GeoJSON exploitable
    #[error("Invalid GeoJSON payload: {0}")]
    InvalidPayload(String),

    /// La collection ne contient aucune feature
    #[error("No features found in the collection")]
    EmptyCollection,

    /// La géométrie de la première feature est absente ou hors des familles supportées
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(String),
}

impl ImportError {
    /// Crée une erreur de payload invalide
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        Self::InvalidPayload(reason.into())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

/// Erreurs de conversion d'une géométrie GeoJSON vers WKT
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Membre `type` absent ou non textuel
    #[error("geometry has no type")]
    MissingType,

    /// Membre `coordinates` absent
    #[error("geometry has no coordinates")]
    MissingCoordinates,

    /// Tableau de coordonnées vide
    #[error("geometry has empty coordinates")]
    EmptyCoordinates,

    /// Famille de géométrie non supportée (LineString, GeometryCollection, ...)
    #[error("unsupported geometry type: {0}")]
    Unsupported(String),

    /// Coordonnées illisibles
    #[error("malformed geometry: {0}")]
    Malformed(String),
}

impl GeometryError {
    /// Crée une erreur de géométrie malformée
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}

/// Raison pour laquelle une feature est ignorée (issue non fatale)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    /// Feature sans géométrie (absente ou `null`)
    #[error("feature has no geometry")]
    MissingGeometry,

    /// Conversion WKT impossible
    #[error("{0}")]
    Geometry(#[from] GeometryError),

    /// Géométrie d'une autre famille que celle de la couche
    #[error("geometry {found} does not fit a {layer} layer")]
    FamilyMismatch { found: String, layer: String },

    /// Sérialisation d'un attribut impossible
    #[error("attribute {field} could not be serialized: {reason}")]
    Attribute { field: String, reason: String },
}

impl SkipReason {
    /// Clé courte et stable, utilisée pour agréger les raisons dans les rapports
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingGeometry => "missing_geometry",
            Self::Geometry(GeometryError::Unsupported(_)) => "unsupported_geometry",
            Self::Geometry(_) => "malformed_geometry",
            Self::FamilyMismatch { .. } => "family_mismatch",
            Self::Attribute { .. } => "attribute",
        }
    }
}

/// Erreur renvoyée par l'hôte qui reçoit la couche
#[derive(Debug, Error)]
#[error("host rejected {operation}: {reason}")]
pub struct HostError {
    pub operation: &'static str,
    pub reason: String,
}

impl HostError {
    pub fn new(operation: &'static str, reason: impl Into<String>) -> Self {
        Self {
            operation,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_codes() {
        assert_eq!(SkipReason::MissingGeometry.code(), "missing_geometry");
        assert_eq!(
            SkipReason::from(GeometryError::Unsupported("LineString".into())).code(),
            "unsupported_geometry"
        );
        assert_eq!(
            SkipReason::from(GeometryError::MissingCoordinates).code(),
            "malformed_geometry"
        );
    }

    #[test]
    fn test_import_error_messages() {
        assert_eq!(
            ImportError::EmptyCollection.to_string(),
            "No features found in the collection"
        );
        assert_eq!(
            ImportError::UnsupportedGeometry("LineString".into()).to_string(),
            "Unsupported geometry type: LineString"
        );
    }
}
