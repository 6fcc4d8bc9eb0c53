//! Export d'une couche importée vers GeoJSON (géométrie relue depuis le WKT avec geozero)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::Rect;
use geozero::geojson::GeoJsonWriter;
use geozero::wkt::WktStr;
use geozero::GeozeroGeometry;

use wfs_import::{
    load_layer, AttributeSchema, HostError, ImportOutcome, ImportRecord, LayerSink, LayerSpec,
};

/// Couche écrite en flux dans un FeatureCollection GeoJSON
pub struct GeoJsonLayerWriter<W: Write> {
    writer: W,
    fields: Vec<String>,
    written: usize,
}

impl<W: Write> GeoJsonLayerWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            fields: Vec::new(),
            written: 0,
        }
    }

    /// Nombre de features écrites
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_feature(&mut self, record: &ImportRecord) -> Result<()> {
        if self.written > 0 {
            write!(self.writer, ",")?;
        }

        write!(self.writer, r#"{{"type":"Feature","geometry":"#)?;
        let mut geom_buf = Vec::new();
        let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
        WktStr(record.wkt.as_str())
            .process_geom(&mut geom_writer)
            .context("Failed to convert WKT to GeoJSON")?;
        self.writer.write_all(&geom_buf)?;

        write!(self.writer, r#","properties":{{"#)?;
        for (i, (name, value)) in self.fields.iter().zip(&record.attributes).enumerate() {
            if i > 0 {
                write!(self.writer, ",")?;
            }
            serde_json::to_writer(&mut self.writer, name)?;
            write!(self.writer, ":")?;
            serde_json::to_writer(&mut self.writer, value)?;
        }
        write!(self.writer, "}}}}")?;

        self.written += 1;
        Ok(())
    }
}

impl<W: Write> LayerSink for GeoJsonLayerWriter<W> {
    fn create_layer(&mut self, spec: &LayerSpec) -> Result<(), HostError> {
        // Header FeatureCollection avec nom et CRS
        let name = serde_json::to_string(&spec.name)
            .map_err(|e| HostError::new("create_layer", e.to_string()))?;
        let crs = serde_json::to_string(&crs_urn(&spec.crs))
            .map_err(|e| HostError::new("create_layer", e.to_string()))?;
        write!(
            self.writer,
            r#"{{"type":"FeatureCollection","name":{},"crs":{{"type":"name","properties":{{"name":{}}}}},"features":["#,
            name, crs
        )
        .map_err(|e| HostError::new("create_layer", e.to_string()))
    }

    fn add_fields(&mut self, schema: &AttributeSchema) -> Result<(), HostError> {
        self.fields.extend(schema.names().map(str::to_string));
        Ok(())
    }

    fn add_feature(&mut self, record: &ImportRecord) -> Result<(), HostError> {
        self.write_feature(record)
            .map_err(|e| HostError::new("add_feature", format!("{:#}", e)))
    }

    fn finish(&mut self, extent: Option<Rect>) -> Result<(), HostError> {
        let result = match extent {
            Some(rect) => write!(
                self.writer,
                r#"],"bbox":[{},{},{},{}]}}"#,
                rect.min().x,
                rect.min().y,
                rect.max().x,
                rect.max().y
            ),
            None => write!(self.writer, "]}}"),
        };
        result
            .and_then(|_| self.writer.flush())
            .map_err(|e| HostError::new("finish", e.to_string()))
    }
}

/// `EPSG:28992` -> `urn:ogc:def:crs:EPSG::28992`
fn crs_urn(crs: &str) -> String {
    match crs.strip_prefix("EPSG:") {
        Some(code) => format!("urn:ogc:def:crs:EPSG::{}", code),
        None => crs.to_string(),
    }
}

/// Écrit le résultat d'un import dans un fichier GeoJSON
pub fn export_layer_to_file(
    name: &str,
    outcome: &ImportOutcome,
    output_path: &Path,
) -> Result<usize> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut layer = GeoJsonLayerWriter::new(BufWriter::new(file));

    let added = load_layer(name, outcome, &mut layer)?;
    Ok(added)
}
