//! Types de données à la frontière de parsing GeoJSON

use std::io;

use serde::ser::Error as _;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};

use crate::ImportError;

/// Valeur d'attribut d'une feature, typée dès le parsing
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Integer(i64),
    /// Entier au-delà de `i64::MAX`
    Unsigned(u64),
    Real(f64),
    Text(String),
    Null,
    /// Objet ou tableau JSON imbriqué
    Nested(Value),
}

impl PropertyValue {
    /// Convertit une valeur JSON brute
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Self::Integer(i),
                (None, Some(u)) => Self::Unsigned(u),
                (None, None) => Self::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Nested(value.clone()),
        }
    }

    /// Forme textuelle de la valeur, telle qu'elle est transmise à la couche
    pub fn to_attribute(&self) -> Result<String, serde_json::Error> {
        Ok(match self {
            Self::Integer(i) => i.to_string(),
            Self::Unsigned(u) => u.to_string(),
            Self::Real(r) => format_real(*r),
            Self::Text(s) => s.clone(),
            Self::Null => String::new(),
            Self::Nested(v) => nested_to_string(v)?,
        })
    }
}

/// JSON imbriqué avec espaces après `,` et `:` : `{"a": [1, 2]}`, non-ASCII en `\uXXXX`
fn nested_to_string(value: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, AttributeFormatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(serde_json::Error::custom)
}

struct AttributeFormatter;

impl Formatter for AttributeFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Un réel entier garde son `.0` pour rester lisible comme réel
fn format_real(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Attributs d'une feature, dans l'ordre du document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, PropertyValue)>);

impl Properties {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self(
            map.iter()
                .map(|(k, v)| (k.clone(), PropertyValue::from_json(v)))
                .collect(),
        )
    }

    /// Recherche par clé (pas par position)
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, PropertyValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Une feature GeoJSON telle que reçue du serveur WFS
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Géométrie brute, `None` si absente ou `null`
    pub geometry: Option<Value>,

    /// Attributs de la feature
    pub properties: Properties,
}

impl Feature {
    fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self {
                geometry: None,
                properties: Properties::default(),
            };
        };

        let geometry = object.get("geometry").filter(|g| !g.is_null()).cloned();

        // Des propriétés qui ne sont pas un objet comptent comme vides
        let properties = object
            .get("properties")
            .and_then(Value::as_object)
            .map(Properties::from_map)
            .unwrap_or_default();

        Self {
            geometry,
            properties,
        }
    }
}

/// Collection de features, immuable une fois parsée
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Parse le corps d'une réponse GetFeature
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, ImportError> {
        let object = value
            .as_object()
            .ok_or_else(|| ImportError::invalid_payload("document is not a JSON object"))?;

        let features = object
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| ImportError::invalid_payload("missing features array"))?;

        Ok(Self {
            features: features.iter().map(Feature::from_json).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl std::str::FromStr for FeatureCollection {
    type Err = ImportError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_value_classification() {
        assert_eq!(PropertyValue::from_json(&json!(3)), PropertyValue::Integer(3));
        assert_eq!(PropertyValue::from_json(&json!(2.5)), PropertyValue::Real(2.5));
        assert_eq!(PropertyValue::from_json(&json!(3.0)), PropertyValue::Real(3.0));
        assert_eq!(
            PropertyValue::from_json(&json!(true)),
            PropertyValue::Text("true".into())
        );
        assert_eq!(PropertyValue::from_json(&Value::Null), PropertyValue::Null);
        assert_eq!(
            PropertyValue::from_json(&json!(18446744073709551615u64)),
            PropertyValue::Unsigned(u64::MAX)
        );
        assert!(matches!(
            PropertyValue::from_json(&json!({"a": 1})),
            PropertyValue::Nested(_)
        ));
    }

    #[test]
    fn test_to_attribute() {
        assert_eq!(PropertyValue::Integer(42).to_attribute().unwrap(), "42");
        assert_eq!(PropertyValue::Real(2.5).to_attribute().unwrap(), "2.5");
        assert_eq!(PropertyValue::Real(3.0).to_attribute().unwrap(), "3.0");
        assert_eq!(PropertyValue::Null.to_attribute().unwrap(), "");
        assert_eq!(
            PropertyValue::Nested(json!({"a": [1, 2]}))
                .to_attribute()
                .unwrap(),
            r#"{"a": [1, 2]}"#
        );
    }

    #[test]
    fn test_unsigned_beyond_i64_is_kept_verbatim() {
        let collection: FeatureCollection = r#"{"features":[
                {"geometry":null,"properties":{"id":18446744073709551615}}
            ]}"#
        .parse()
        .unwrap();
        let value = collection.features[0].properties.get("id").unwrap();
        assert_eq!(value.to_attribute().unwrap(), "18446744073709551615");
    }

    #[test]
    fn test_nested_attribute_text() {
        let nested = PropertyValue::Nested(json!({
            "naam": "Zuid-Holland",
            "codes": [],
            "b": {"x": 1.5}
        }));
        assert_eq!(
            nested.to_attribute().unwrap(),
            r#"{"naam": "Zuid-Holland", "codes": [], "b": {"x": 1.5}}"#
        );

        let accented = PropertyValue::Nested(json!(["Café", "a\"b", "😀"]));
        assert_eq!(
            accented.to_attribute().unwrap(),
            r#"["Caf\u00e9", "a\"b", "\ud83d\ude00"]"#
        );
    }

    #[test]
    fn test_properties_keep_document_order() {
        let collection: FeatureCollection =
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":null,"properties":{"z":1,"a":2,"m":3}}
            ]}"#
            .parse()
            .unwrap();

        let keys: Vec<&str> = collection.features[0]
            .properties
            .iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert!(collection.features[0].geometry.is_none());
    }

    #[test]
    fn test_non_object_properties_are_empty() {
        let collection = FeatureCollection::from_value(&json!({
            "features": [{"geometry": {"type": "Point", "coordinates": [1, 2]}, "properties": [1, 2]}]
        }))
        .unwrap();
        assert!(collection.features[0].properties.is_empty());
        assert!(collection.features[0].geometry.is_some());
    }

    #[test]
    fn test_missing_features_is_invalid_payload() {
        let result = FeatureCollection::from_value(&json!({"type": "FeatureCollection"}));
        assert!(matches!(result, Err(ImportError::InvalidPayload(_))));

        let result = FeatureCollection::from_slice(b"<ExceptionReport/>");
        assert!(matches!(result, Err(ImportError::InvalidPayload(_))));
    }
}
