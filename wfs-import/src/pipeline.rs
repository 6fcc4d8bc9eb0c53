//! Pipeline d'import : FeatureCollection -> enregistrements (WKT + attributs)
//!
//! Les erreurs par feature ne sont jamais fatales : la feature est ignorée,
//! comptée, et sa raison transmise au `DiagnosticSink`.

use std::fmt;

use geo::{coord, Rect};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::geometry::{Geometry, GeometryKind, LayerFamily};
use crate::schema::AttributeSchema;
use crate::types::{Feature, FeatureCollection};
use crate::wkt::translate;
use crate::{GeometryError, ImportError, SkipReason};

/// CRS par défaut des couches créées (RD New)
pub const DEFAULT_CRS: &str = "EPSG:28992";

/// Options d'un import
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Tag CRS transmis à l'hôte, les coordonnées ne sont pas reprojetées
    pub crs: String,

    /// Ajouter le WKT comme dernier attribut de chaque enregistrement
    pub append_wkt: bool,

    /// Convertir les features en parallèle (l'ordre de sortie est conservé)
    pub parallel: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            crs: DEFAULT_CRS.to_string(),
            append_wkt: true,
            parallel: false,
        }
    }
}

/// Une feature prête à être ajoutée à la couche
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    pub wkt: String,

    /// Valeurs dans l'ordre du schéma, suivies du WKT si `append_wkt`
    pub attributes: Vec<String>,
}

/// Événement remonté pendant l'import
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Feature ignorée
    Skipped { index: usize, reason: SkipReason },

    /// Clé du schéma absente des propriétés d'une feature importée
    MissingAttribute { index: usize, field: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped { index, reason } => write!(f, "feature #{} skipped: {}", index, reason),
            Self::MissingAttribute { index, field } => {
                write!(f, "feature #{} has no value for field {}", index, field)
            }
        }
    }
}

/// Destinataire des diagnostics et de la progression d'un import
pub trait DiagnosticSink {
    fn diagnostic(&mut self, diagnostic: &Diagnostic);

    /// `done` features traitées sur `total`
    fn progress(&mut self, _done: usize, _total: usize) {}
}

impl<F: FnMut(&Diagnostic)> DiagnosticSink for F {
    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Sink qui journalise via `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::Skipped { index, reason } => {
                warn!(feature = index, reason = %reason, "Error processing feature, skipped");
            }
            Diagnostic::MissingAttribute { index, field } => {
                debug!(feature = index, field = %field, "Missing attribute, left empty");
            }
        }
    }
}

/// Résultat d'un import réussi
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    /// Type de géométrie de la première feature
    pub kind: GeometryKind,

    pub family: LayerFamily,

    pub crs: String,

    /// Schéma inféré (sans le champ `wkt`)
    pub schema: AttributeSchema,

    pub append_wkt: bool,

    pub records: Vec<ImportRecord>,

    pub skipped: usize,

    /// Emprise des features importées
    pub extent: Option<Rect>,
}

impl ImportOutcome {
    pub fn imported(&self) -> usize {
        self.records.len()
    }

    /// Champs à déclarer chez l'hôte, y compris le champ `wkt` final
    pub fn layer_schema(&self) -> AttributeSchema {
        if self.append_wkt {
            self.schema.with_wkt_field()
        } else {
            self.schema.clone()
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} layer features imported, {} skipped",
            self.imported(),
            self.skipped
        )
    }
}

/// Issue du traitement d'une seule feature
struct FeatureOutcome {
    result: Result<(ImportRecord, Rect), SkipReason>,
    missing: Vec<String>,
}

/// Importe une collection déjà parsée
///
/// # Errors
///
/// `EmptyCollection` si la collection est vide, `UnsupportedGeometry` si la
/// première feature n'a pas de géométrie d'une famille supportée.
pub fn import(
    collection: &FeatureCollection,
    options: &ImportOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<ImportOutcome, ImportError> {
    // 1. Collection vide
    let first = collection
        .features
        .first()
        .ok_or(ImportError::EmptyCollection)?;

    // 2. Famille de géométrie de la couche, depuis la première feature
    let kind = match &first.geometry {
        None => return Err(ImportError::UnsupportedGeometry("none".to_string())),
        Some(geometry) => GeometryKind::detect(geometry).map_err(|e| match e {
            GeometryError::Unsupported(name) => ImportError::UnsupportedGeometry(name),
            other => ImportError::UnsupportedGeometry(other.to_string()),
        })?,
    };
    let family = kind.family();

    // 3. Schéma
    let schema = AttributeSchema::from_collection(collection);

    info!(
        features = collection.len(),
        geometry = kind.name(),
        layer_type = family.layer_type(),
        fields = schema.len(),
        "Importing feature collection"
    );

    // 4. Conversion feature par feature
    let total = collection.len();
    let mut collector = Collector::default();

    if options.parallel {
        let outcomes: Vec<FeatureOutcome> = collection
            .features
            .par_iter()
            .map(|feature| process_feature(feature, &schema, family, options.append_wkt))
            .collect();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            collector.accept(index, outcome, sink);
            sink.progress(index + 1, total);
        }
    } else {
        for (index, feature) in collection.features.iter().enumerate() {
            let outcome = process_feature(feature, &schema, family, options.append_wkt);
            collector.accept(index, outcome, sink);
            sink.progress(index + 1, total);
        }
    }

    let outcome = ImportOutcome {
        kind,
        family,
        crs: options.crs.clone(),
        schema,
        append_wkt: options.append_wkt,
        records: collector.records,
        skipped: collector.skipped,
        extent: collector.extent,
    };

    info!(
        imported = outcome.imported(),
        skipped = outcome.skipped,
        "Import finished"
    );

    Ok(outcome)
}

#[derive(Default)]
struct Collector {
    records: Vec<ImportRecord>,
    skipped: usize,
    extent: Option<Rect>,
}

impl Collector {
    fn accept(&mut self, index: usize, outcome: FeatureOutcome, sink: &mut dyn DiagnosticSink) {
        for field in outcome.missing {
            sink.diagnostic(&Diagnostic::MissingAttribute { index, field });
        }

        match outcome.result {
            Ok((record, bounds)) => {
                self.extent = Some(match self.extent {
                    Some(extent) => merge(extent, bounds),
                    None => bounds,
                });
                self.records.push(record);
            }
            Err(reason) => {
                self.skipped += 1;
                sink.diagnostic(&Diagnostic::Skipped { index, reason });
            }
        }
    }
}

/// Traitement pur d'une feature, sans effet de bord
fn process_feature(
    feature: &Feature,
    schema: &AttributeSchema,
    family: LayerFamily,
    append_wkt: bool,
) -> FeatureOutcome {
    let mut missing = Vec::new();
    let result = build_record(feature, schema, family, append_wkt, &mut missing);
    FeatureOutcome { result, missing }
}

fn build_record(
    feature: &Feature,
    schema: &AttributeSchema,
    family: LayerFamily,
    append_wkt: bool,
    missing: &mut Vec<String>,
) -> Result<(ImportRecord, Rect), SkipReason> {
    let raw = feature
        .geometry
        .as_ref()
        .ok_or(SkipReason::MissingGeometry)?;

    let geometry = Geometry::from_json(raw)?;
    if let Some(kind) = geometry.kind() {
        if kind.family() != family {
            return Err(SkipReason::FamilyMismatch {
                found: kind.name().to_string(),
                layer: family.layer_type().to_string(),
            });
        }
    }
    let wkt = translate(&geometry)?;
    let bounds = bounding_rect(&geometry)
        .ok_or_else(|| SkipReason::from(GeometryError::EmptyCoordinates))?;

    // Recherche par clé, jamais par position
    let mut attributes = Vec::with_capacity(schema.len() + 1);
    for field in &schema.fields {
        match feature.properties.get(&field.name) {
            Some(value) => {
                let text = value.to_attribute().map_err(|e| SkipReason::Attribute {
                    field: field.name.clone(),
                    reason: e.to_string(),
                })?;
                attributes.push(text);
            }
            None => {
                missing.push(field.name.clone());
                attributes.push(String::new());
            }
        }
    }

    if append_wkt {
        attributes.push(wkt.clone());
    }

    Ok((ImportRecord { wkt, attributes }, bounds))
}

fn bounding_rect(geometry: &Geometry) -> Option<Rect> {
    let mut coords = geometry.coords();
    let first = *coords.next()?;
    let (min, max) = coords.fold((first, first), |(min, max), c| {
        (
            coord! { x: min.x.min(c.x), y: min.y.min(c.y) },
            coord! { x: max.x.max(c.x), y: max.y.max(c.y) },
        )
    });
    Some(Rect::new(min, max))
}

fn merge(a: Rect, b: Rect) -> Rect {
    Rect::new(
        coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}
