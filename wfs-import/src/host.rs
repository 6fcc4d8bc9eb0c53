//! Interface avec l'hôte qui reçoit la couche importée

use geo::Rect;

use crate::geometry::LayerFamily;
use crate::pipeline::{ImportOutcome, ImportRecord};
use crate::schema::AttributeSchema;
use crate::HostError;

/// Description de la couche à créer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub name: String,
    pub family: LayerFamily,
    pub crs: String,
}

impl LayerSpec {
    /// URI d'une couche mémoire, ex. `Point?crs=EPSG:28992`
    pub fn memory_uri(&self) -> String {
        format!("{}?crs={}", self.family.layer_type(), self.crs)
    }
}

/// Capacités de l'hôte : créer la couche, déclarer les champs, ajouter les features
pub trait LayerSink {
    fn create_layer(&mut self, spec: &LayerSpec) -> Result<(), HostError>;

    fn add_fields(&mut self, schema: &AttributeSchema) -> Result<(), HostError>;

    fn add_feature(&mut self, record: &ImportRecord) -> Result<(), HostError>;

    /// Appelé une fois toutes les features ajoutées
    fn finish(&mut self, _extent: Option<Rect>) -> Result<(), HostError> {
        Ok(())
    }
}

/// Transmet le résultat d'un import à l'hôte, dans l'ordre des enregistrements
///
/// Retourne le nombre de features ajoutées.
pub fn load_layer(
    name: &str,
    outcome: &ImportOutcome,
    sink: &mut dyn LayerSink,
) -> Result<usize, HostError> {
    sink.create_layer(&LayerSpec {
        name: name.to_string(),
        family: outcome.family,
        crs: outcome.crs.clone(),
    })?;
    sink.add_fields(&outcome.layer_schema())?;

    for record in &outcome.records {
        sink.add_feature(record)?;
    }

    sink.finish(outcome.extent)?;
    Ok(outcome.records.len())
}

/// Couche en mémoire
#[derive(Debug, Clone, Default)]
pub struct MemoryLayer {
    pub spec: Option<LayerSpec>,
    pub schema: AttributeSchema,
    pub features: Vec<ImportRecord>,
    pub extent: Option<Rect>,
}

impl LayerSink for MemoryLayer {
    fn create_layer(&mut self, spec: &LayerSpec) -> Result<(), HostError> {
        self.spec = Some(spec.clone());
        Ok(())
    }

    fn add_fields(&mut self, schema: &AttributeSchema) -> Result<(), HostError> {
        if self.spec.is_none() {
            return Err(HostError::new("add_fields", "layer not created"));
        }
        self.schema.fields.extend(schema.fields.iter().cloned());
        Ok(())
    }

    fn add_feature(&mut self, record: &ImportRecord) -> Result<(), HostError> {
        if record.attributes.len() != self.schema.len() {
            return Err(HostError::new(
                "add_feature",
                format!(
                    "{} attributes for {} fields",
                    record.attributes.len(),
                    self.schema.len()
                ),
            ));
        }
        self.features.push(record.clone());
        Ok(())
    }

    fn finish(&mut self, extent: Option<Rect>) -> Result<(), HostError> {
        self.extent = extent;
        Ok(())
    }
}
