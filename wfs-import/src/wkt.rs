//! Conversion GeoJSON -> WKT avec le `WktWriter` de geozero
//!
//! Les nombres sont écrits avec l'affichage `f64` de Rust : la plus courte
//! représentation décimale qui relit exactement la même valeur, sans exposant
//! ni précision imposée (`155000.0` s'écrit `155000`).

use geo::Coord;
use geozero::error::GeozeroError;
use geozero::wkt::WktWriter;
use geozero::{GeomProcessor, GeozeroGeometry};
use serde_json::Value;

use crate::geometry::Geometry;
use crate::GeometryError;

/// Convertit une géométrie décodée en WKT
pub fn translate(geometry: &Geometry) -> Result<String, GeometryError> {
    if let Geometry::Unsupported(name) = geometry {
        return Err(GeometryError::Unsupported(name.clone()));
    }

    let mut wkt_buf = Vec::new();
    {
        let mut writer = WktWriter::new(&mut wkt_buf);
        geometry.process_geom(&mut writer).map_err(|e| {
            GeometryError::malformed(format!("Failed to encode geometry to WKT: {}", e))
        })?;
    }
    String::from_utf8(wkt_buf).map_err(|e| GeometryError::malformed(e.to_string()))
}

/// Décode une géométrie GeoJSON brute puis la convertit en WKT
pub fn geojson_to_wkt(geometry: &Value) -> Result<String, GeometryError> {
    translate(&Geometry::from_json(geometry)?)
}

/// Parcours geozero des coordonnées telles que décodées (anneaux non refermés)
impl GeozeroGeometry for Geometry {
    fn process_geom<P: GeomProcessor>(&self, processor: &mut P) -> geozero::error::Result<()>
    where
        Self: Sized,
    {
        match self {
            Geometry::Point(c) => {
                processor.point_begin(0)?;
                processor.xy(c.x, c.y, 0)?;
                processor.point_end(0)
            }
            Geometry::MultiPoint(points) => {
                processor.multipoint_begin(points.len(), 0)?;
                for (i, c) in points.iter().enumerate() {
                    processor.xy(c.x, c.y, i)?;
                }
                processor.multipoint_end(0)
            }
            Geometry::Polygon(rings) => process_polygon(rings, true, 0, processor),
            Geometry::MultiPolygon(polygons) => {
                processor.multipolygon_begin(polygons.len(), 0)?;
                for (i, rings) in polygons.iter().enumerate() {
                    process_polygon(rings, false, i, processor)?;
                }
                processor.multipolygon_end(0)
            }
            Geometry::Unsupported(name) => Err(GeozeroError::Geometry(format!(
                "Unsupported geometry type: {}",
                name
            ))),
        }
    }
}

fn process_polygon<P: GeomProcessor>(
    rings: &[Vec<Coord>],
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> geozero::error::Result<()> {
    processor.polygon_begin(tagged, rings.len(), idx)?;
    for (ring_idx, ring) in rings.iter().enumerate() {
        processor.linestring_begin(false, ring.len(), ring_idx)?;
        for (i, c) in ring.iter().enumerate() {
            processor.xy(c.x, c.y, i)?;
        }
        processor.linestring_end(false, ring_idx)?;
    }
    processor.polygon_end(tagged, idx)
}
