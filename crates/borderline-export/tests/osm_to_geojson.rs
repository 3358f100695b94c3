//! Integration test: run a small OSM extract through extraction, the
//! pipeline and GeoJSON export.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use borderline_export::{GeometryKind, parse_feature_collection, resimplify, to_feature_collection};
use borderline_osm::{AreaFilter, extract_tables};
use borderline_pipeline::{PipelineConfig, RunSummary, Tolerance, process_areas};

/// A unit square split over three ways (one drawn backwards, one with a
/// slight bulge), plus a relation whose boundary never closes.
const EXTRACT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="0.0" lon="0.0"/>
  <node id="2" lat="0.0" lon="1.0"/>
  <node id="3" lat="1.0" lon="1.0"/>
  <node id="4" lat="1.0" lon="0.0"/>
  <node id="5" lat="0.01" lon="0.5"/>
  <way id="10"><nd ref="1"/><nd ref="5"/><nd ref="2"/></way>
  <way id="11"><nd ref="3"/><nd ref="2"/></way>
  <way id="12"><nd ref="3"/><nd ref="4"/><nd ref="1"/></way>
  <way id="20"><nd ref="2"/><nd ref="3"/></way>
  <relation id="100">
    <member type="way" ref="10" role="outer"/>
    <member type="way" ref="11" role="outer"/>
    <member type="way" ref="12" role="outer"/>
    <tag k="name" v="Square"/>
    <tag k="admin_level" v="2"/>
    <tag k="boundary" v="administrative"/>
  </relation>
  <relation id="200">
    <member type="way" ref="20" role="outer"/>
    <member type="way" ref="99" role="outer"/>
    <tag k="NAME" v="Broken"/>
    <tag k="admin_level" v="4"/>
    <tag k="boundary" v="administrative"/>
  </relation>
</osm>"#;

#[test]
fn osm_extract_to_feature_collection() {
    let tables = extract_tables(EXTRACT).expect("extract should parse");
    let areas = tables.areas(&AreaFilter::default());
    assert_eq!(areas.len(), 2);

    let results = process_areas(areas, &PipelineConfig::default()).expect("valid config");

    let square = &results[0];
    assert_eq!(square.id, 100);
    assert!(square.is_complete());
    assert_eq!(square.rings.len(), 1);
    // The bulge is under the default tolerance and goes away.
    assert_eq!(square.vertex_count, 5);

    let broken = &results[1];
    assert_eq!(broken.name.as_deref(), Some("Broken"));
    assert!(broken.rings.is_empty());
    assert_eq!(broken.unmatched.len(), 1);

    let summary = RunSummary::from_results(&results);
    assert_eq!(summary.areas, 2);
    assert_eq!(summary.incomplete_areas, 1);
    assert_eq!(summary.input_vertices, 10);

    let collection = to_feature_collection(&results, GeometryKind::Polygon);
    let text = borderline_export::to_geojson_string(&collection).unwrap();

    let mut parsed = parse_feature_collection(&text).unwrap();
    assert_eq!(parsed.features.len(), 2);
    assert_eq!(parsed.features[0].property("count").unwrap(), 5);
    assert_eq!(parsed.features[0].property("name").unwrap(), "Square");
    assert!(parsed.features[1].geometry.is_none());
    assert_eq!(parsed.features[1].property("unmatched").unwrap(), 1);

    let resimplified = resimplify(&mut parsed, Tolerance::ZERO).unwrap();
    assert_eq!(resimplified.features, 1);
    assert_eq!(resimplified.skipped_features, 1);
    assert_eq!(resimplified.output_vertices, 5);
}

#[test]
fn admin_level_filter_selects_areas() {
    let tables = extract_tables(EXTRACT).unwrap();
    let filter = AreaFilter {
        admin_level: Some(2),
        ..AreaFilter::default()
    };
    let areas = tables.areas(&filter);
    let results = process_areas(areas, &PipelineConfig::default()).unwrap();
    let collection = to_feature_collection(&results, GeometryKind::MultiPolygon);

    assert_eq!(collection.features.len(), 1);
    assert_eq!(collection.features[0].property("id").unwrap(), 100);
}
