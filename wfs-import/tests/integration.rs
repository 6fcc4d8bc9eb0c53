//! Tests d'intégration sur une réponse GetFeature réaliste

use geozero::wkt::WktStr;
use geozero::ToGeo;
use serde_json::json;
use wfs_import::{
    geojson_to_wkt, import, import_slice, load_layer, Diagnostic, FeatureCollection, FieldKind,
    ImportError, ImportOptions, LayerFamily, MemoryLayer, SkipReason, TracingSink,
};

const ALO_SAMPLE: &str = include_str!("fixtures/alo_sample.json");

fn sample() -> FeatureCollection {
    ALO_SAMPLE.parse().unwrap()
}

#[test]
fn test_import_sample_layer() {
    let mut diagnostics = Vec::new();
    let mut sink = |d: &Diagnostic| diagnostics.push(d.clone());
    let outcome = import(&sample(), &ImportOptions::default(), &mut sink).unwrap();

    assert_eq!(outcome.family, LayerFamily::Polygons);
    assert_eq!(outcome.imported(), 3);
    assert_eq!(outcome.skipped, 2);
    assert_eq!(outcome.summary(), "3 layer features imported, 2 skipped");

    let kinds: Vec<(&str, FieldKind)> = outcome
        .schema
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("gemeentecode", FieldKind::Integer),
            ("naam", FieldKind::Text),
            ("lden", FieldKind::Real),
            ("bron", FieldKind::Text),
        ]
    );

    assert_eq!(
        outcome.records[0].wkt,
        "MULTIPOLYGON(((136000.5 455000,136100 455000,136100 455100.25,136000.5 455000),\
         (136020 455010,136030 455010,136030 455020,136020 455010)),\
         ((137000 456000,137050 456000,137050 456050,137000 456000)))"
    );
    assert_eq!(
        &outcome.records[0].attributes[..4],
        &["344", "Utrecht", "61.5", r#"{"jaar": 2022}"#]
    );
    assert_eq!(
        outcome.records[2].attributes,
        vec![
            "",
            "Houten",
            "52.75",
            "",
            "POLYGON((150000 470000,150020 470000,150020 470020,150000 470000))"
        ]
    );

    let skipped: Vec<(usize, &str)> = diagnostics
        .iter()
        .filter_map(|d| match d {
            Diagnostic::Skipped { index, reason } => Some((*index, reason.code())),
            _ => None,
        })
        .collect();
    assert_eq!(
        skipped,
        vec![(2, "missing_geometry"), (3, "unsupported_geometry")]
    );

    let missing = diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::MissingAttribute { index: 4, .. }))
        .count();
    assert_eq!(missing, 2);
}

#[test]
fn test_records_share_schema_length() {
    let outcome = import(&sample(), &ImportOptions::default(), &mut TracingSink).unwrap();
    let expected = outcome.layer_schema().len();
    assert!(outcome
        .records
        .iter()
        .all(|r| r.attributes.len() == expected));
}

#[test]
fn test_import_is_idempotent() {
    let collection = sample();
    let first = import(&collection, &ImportOptions::default(), &mut TracingSink).unwrap();
    let second = import(&collection, &ImportOptions::default(), &mut TracingSink).unwrap();
    assert_eq!(first.records, second.records);
}

#[test]
fn test_empty_payload() {
    let result = import_slice(
        br#"{"type":"FeatureCollection","features":[]}"#,
        &ImportOptions::default(),
        &mut TracingSink,
    );
    assert!(matches!(result, Err(ImportError::EmptyCollection)));
}

#[test]
fn test_exception_report_is_invalid_payload() {
    let body = br#"<?xml version="1.0"?><ows:ExceptionReport/>"#;
    let result = import_slice(body, &ImportOptions::default(), &mut TracingSink);
    assert!(matches!(result, Err(ImportError::InvalidPayload(_))));
}

#[test]
fn test_five_features_one_null_geometry() {
    let features: Vec<_> = (0..5)
        .map(|i| {
            if i == 2 {
                json!({"type": "Feature", "geometry": null, "properties": {"i": i}})
            } else {
                json!({
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [i, i * 2]},
                    "properties": {"i": i}
                })
            }
        })
        .collect();
    let collection = FeatureCollection::from_value(&json!({ "features": features })).unwrap();

    let outcome = import(&collection, &ImportOptions::default(), &mut TracingSink).unwrap();
    assert_eq!(outcome.records.len(), 4);
    assert_eq!(outcome.skipped, 1);
}

#[test]
fn test_polygon_ring_groups() {
    let wkt = geojson_to_wkt(&json!({
        "type": "Polygon",
        "coordinates": [
            [[0, 0], [10, 0], [10, 10], [0, 0]],
            [[1, 1], [2, 1], [2, 2], [1, 1]],
            [[5, 5], [6, 5], [6, 6], [5, 5]]
        ]
    }))
    .unwrap();

    let inner = wkt
        .strip_prefix("POLYGON(")
        .and_then(|s| s.strip_suffix(')'))
        .unwrap();
    assert_eq!(inner.matches('(').count(), 3);
    assert!(inner.starts_with("(0 0,"));
    assert!(inner.ends_with(",5 5)"));
}

#[test]
fn test_multipolygon_nesting_depth() {
    let wkt = geojson_to_wkt(&json!({
        "type": "MultiPolygon",
        "coordinates": [
            [[[0, 0], [1, 0], [1, 1], [0, 0]]],
            [[[2, 2], [3, 2], [3, 3], [2, 2]], [[2.1, 2.1], [2.2, 2.1], [2.2, 2.2], [2.1, 2.1]]]
        ]
    }))
    .unwrap();

    let mut depth = 0;
    let mut max_depth = 0;
    for c in wkt.chars() {
        match c {
            '(' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            ')' => depth -= 1,
            _ => {}
        }
    }
    assert_eq!(max_depth, 3);
    assert_eq!(depth, 0);
}

#[test]
fn test_wkt_round_trip() {
    let collection = sample();
    let outcome = import(&collection, &ImportOptions::default(), &mut TracingSink).unwrap();

    for (record, kind) in outcome
        .records
        .iter()
        .zip(["MultiPolygon", "Polygon", "Polygon"])
    {
        let geometry = WktStr(&record.wkt).to_geo().unwrap();
        let parsed_kind = match &geometry {
            geo::Geometry::Polygon(_) => "Polygon",
            geo::Geometry::MultiPolygon(_) => "MultiPolygon",
            other => panic!("Unexpected geometry {:?}", other),
        };
        assert_eq!(parsed_kind, kind);
    }

    // Coordonnées identiques après relecture
    let point = WktStr("POINT(155000.123456789 463000.5)").to_geo().unwrap();
    let wkt = geojson_to_wkt(&json!({"type": "Point", "coordinates": [155000.123456789, 463000.5]}))
        .unwrap();
    assert_eq!(WktStr(&wkt).to_geo().unwrap(), point);

    let multipoint = geojson_to_wkt(&json!({
        "type": "MultiPoint",
        "coordinates": [[0.1, 0.2], [1e-7, 123456789.987]]
    }))
    .unwrap();
    match WktStr(&multipoint).to_geo().unwrap() {
        geo::Geometry::MultiPoint(mp) => {
            assert_eq!(mp.0.len(), 2);
            assert_eq!(mp.0[0].x(), 0.1);
            assert_eq!(mp.0[1].x(), 1e-7);
            assert_eq!(mp.0[1].y(), 123456789.987);
        }
        other => panic!("Expected MultiPoint, got {:?}", other),
    }
}

#[test]
fn test_load_sample_into_memory_layer() {
    let outcome = import(&sample(), &ImportOptions::default(), &mut TracingSink).unwrap();
    let mut layer = MemoryLayer::default();

    let added = load_layer("geluid_weg", &outcome, &mut layer).unwrap();
    assert_eq!(added, 3);
    assert_eq!(
        layer.spec.as_ref().unwrap().memory_uri(),
        "MultiPolygon?crs=EPSG:28992"
    );
    assert_eq!(layer.schema.len(), 5);
}

#[test]
fn test_skip_reason_display() {
    let reason = SkipReason::FamilyMismatch {
        found: "Point".into(),
        layer: "MultiPolygon".into(),
    };
    assert_eq!(
        reason.to_string(),
        "geometry Point does not fit a MultiPolygon layer"
    );
}
