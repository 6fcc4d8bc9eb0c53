//! Géométries GeoJSON supportées par l'import
//!
//! Le décodage des coordonnées passe par le crate `geojson` ; seules les quatre
//! familles Point, MultiPoint, Polygon et MultiPolygon sont conservées.

use geo::Coord;
use serde_json::Value;

use crate::GeometryError;

/// Géométrie décodée, avec ses coordonnées brutes (anneaux non refermés)
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    /// Anneaux : extérieur puis trous
    Polygon(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
    /// Type GeoJSON hors périmètre (LineString, GeometryCollection, ...)
    Unsupported(String),
}

/// Les quatre types de géométrie importables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(Self::Point),
            "MultiPoint" => Some(Self::MultiPoint),
            "Polygon" => Some(Self::Polygon),
            "MultiPolygon" => Some(Self::MultiPolygon),
            _ => None,
        }
    }

    /// Détecte le type depuis le seul membre `type` d'une géométrie brute
    pub fn detect(geometry: &Value) -> Result<Self, GeometryError> {
        let name = type_name(geometry)?;
        Self::from_type_name(name).ok_or_else(|| GeometryError::Unsupported(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::MultiPoint => "MultiPoint",
            Self::Polygon => "Polygon",
            Self::MultiPolygon => "MultiPolygon",
        }
    }

    pub fn family(&self) -> LayerFamily {
        match self {
            Self::Point | Self::MultiPoint => LayerFamily::Points,
            Self::Polygon | Self::MultiPolygon => LayerFamily::Polygons,
        }
    }
}

/// Famille de géométrie d'une couche : une seule par couche
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerFamily {
    Points,
    Polygons,
}

impl LayerFamily {
    /// Type de géométrie de la couche créée chez l'hôte
    pub fn layer_type(&self) -> &'static str {
        match self {
            Self::Points => "Point",
            Self::Polygons => "MultiPolygon",
        }
    }
}

impl Geometry {
    /// Décode une géométrie GeoJSON brute
    pub fn from_json(value: &Value) -> Result<Self, GeometryError> {
        let name = type_name(value)?;
        let Some(kind) = GeometryKind::from_type_name(name) else {
            return Ok(Self::Unsupported(name.to_string()));
        };

        match value.get("coordinates") {
            None | Some(Value::Null) => return Err(GeometryError::MissingCoordinates),
            Some(Value::Array(coords)) if coords.is_empty() => {
                return Err(GeometryError::EmptyCoordinates)
            }
            _ => {}
        }

        let decoded = geojson::Geometry::from_json_value(value.clone())
            .map_err(|e| GeometryError::malformed(e.to_string()))?;

        let geometry = match (kind, decoded.value) {
            (GeometryKind::Point, geojson::Value::Point(p)) => Self::Point(to_coord(&p)?),
            (GeometryKind::MultiPoint, geojson::Value::MultiPoint(points)) => {
                Self::MultiPoint(to_coords(&points)?)
            }
            (GeometryKind::Polygon, geojson::Value::Polygon(rings)) => {
                Self::Polygon(to_rings(&rings)?)
            }
            (GeometryKind::MultiPolygon, geojson::Value::MultiPolygon(polygons)) => {
                Self::MultiPolygon(
                    polygons
                        .iter()
                        .map(|rings| to_rings(rings))
                        .collect::<Result<_, _>>()?,
                )
            }
            (kind, _) => {
                return Err(GeometryError::malformed(format!(
                    "decoded geometry does not match type {}",
                    kind.name()
                )))
            }
        };

        geometry.check_not_empty()?;
        Ok(geometry)
    }

    /// Type de la géométrie, `None` pour une géométrie non supportée
    pub fn kind(&self) -> Option<GeometryKind> {
        match self {
            Self::Point(_) => Some(GeometryKind::Point),
            Self::MultiPoint(_) => Some(GeometryKind::MultiPoint),
            Self::Polygon(_) => Some(GeometryKind::Polygon),
            Self::MultiPolygon(_) => Some(GeometryKind::MultiPolygon),
            Self::Unsupported(_) => None,
        }
    }

    /// Parcourt toutes les coordonnées, dans l'ordre du document
    pub fn coords(&self) -> Box<dyn Iterator<Item = &Coord> + '_> {
        match self {
            Self::Point(c) => Box::new(std::iter::once(c)),
            Self::MultiPoint(points) => Box::new(points.iter()),
            Self::Polygon(rings) => Box::new(rings.iter().flatten()),
            Self::MultiPolygon(polygons) => Box::new(polygons.iter().flatten().flatten()),
            Self::Unsupported(_) => Box::new(std::iter::empty()),
        }
    }

    /// Un anneau ou un polygone vide ne donne pas de WKT valide
    fn check_not_empty(&self) -> Result<(), GeometryError> {
        let empty_ring = |rings: &Vec<Vec<Coord>>| rings.is_empty() || rings.iter().any(Vec::is_empty);
        let invalid = match self {
            Self::Point(_) | Self::Unsupported(_) => false,
            Self::MultiPoint(points) => points.is_empty(),
            Self::Polygon(rings) => empty_ring(rings),
            Self::MultiPolygon(polygons) => polygons.is_empty() || polygons.iter().any(empty_ring),
        };
        if invalid {
            return Err(GeometryError::malformed("empty ring or polygon"));
        }
        Ok(())
    }
}

fn type_name(value: &Value) -> Result<&str, GeometryError> {
    value
        .get("type")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(GeometryError::MissingType)
}

/// Position GeoJSON -> Coord ; Z et M sont ignorés
fn to_coord(position: &[f64]) -> Result<Coord, GeometryError> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(GeometryError::malformed(format!(
            "position needs 2 ordinates, got {}",
            position.len()
        ))),
    }
}

fn to_coords(positions: &[Vec<f64>]) -> Result<Vec<Coord>, GeometryError> {
    positions.iter().map(|p| to_coord(p)).collect()
}

fn to_rings(rings: &[Vec<Vec<f64>>]) -> Result<Vec<Vec<Coord>>, GeometryError> {
    rings.iter().map(|ring| to_coords(ring)).collect()
}
