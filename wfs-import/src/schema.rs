//! Inférence du schéma attributaire

use serde::Serialize;

use crate::types::{FeatureCollection, Properties, PropertyValue};

/// Nom du champ portant le WKT en fin d'attributs
pub const WKT_FIELD: &str = "wkt";

/// Type d'un champ de la couche
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Integer,
    Real,
    Text,
}

impl FieldKind {
    /// Classe une valeur : entier, réel, sinon texte
    pub fn classify(value: &PropertyValue) -> Self {
        match value {
            PropertyValue::Integer(_) | PropertyValue::Unsigned(_) => Self::Integer,
            PropertyValue::Real(_) => Self::Real,
            PropertyValue::Text(_) | PropertyValue::Null | PropertyValue::Nested(_) => Self::Text,
        }
    }
}

/// Un champ de la couche
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

/// Schéma attributaire ordonné (ordre de première apparition)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributeSchema {
    pub fields: Vec<Field>,
}

impl AttributeSchema {
    /// Schéma issu de la première feature dont les propriétés ne sont pas vides
    pub fn from_collection(collection: &FeatureCollection) -> Self {
        collection
            .features
            .iter()
            .find(|f| !f.properties.is_empty())
            .map(|f| infer(&f.properties))
            .unwrap_or_default()
    }

    /// Ajoute le champ texte `wkt` qui reçoit le WKT en dernier attribut
    pub fn with_wkt_field(&self) -> Self {
        let mut fields = self.fields.clone();
        fields.push(Field {
            name: WKT_FIELD.to_string(),
            kind: FieldKind::Text,
        });
        Self { fields }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Déduit le schéma d'une feature exemple
pub fn infer(sample: &Properties) -> AttributeSchema {
    AttributeSchema {
        fields: sample
            .iter()
            .map(|(name, value)| Field {
                name: name.to_string(),
                kind: FieldKind::classify(value),
            })
            .collect(),
    }
}
