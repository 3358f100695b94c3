//! `FeatureCollection` building and re-simplification.
//!
//! Each [`AreaResult`] becomes one feature carrying `name`, `id`, `count`
//! (output vertices) and `unmatched` (segments that never closed)
//! properties.
//!
//! Stitched rings carry no outer/inner role, so the layout is recovered
//! from containment: a ring inside a shell is a hole of the smallest shell
//! containing it, and a ring inside a hole (an island in a lake) starts a
//! new shell. Each shell is written first, followed by its holes.

use geo::{Area as _, Contains, LineString, Polygon};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};

use borderline_pipeline::{AreaResult, Coordinate, Ring, Tolerance, simplify_coordinates};

use crate::error::ExportError;

/// Which GeoJSON geometry type an area is written as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeometryKind {
    /// A `Polygon` when the area has a single shell, a `MultiPolygon`
    /// when it has several (islands, exclaves).
    #[default]
    Polygon,
    /// Always a `MultiPolygon`, one polygon per shell.
    MultiPolygon,
}

/// What [`resimplify`] did to a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResimplifySummary {
    /// Features whose geometry was rewritten.
    pub features: usize,
    /// Features left alone (no geometry, or not polygonal).
    pub skipped_features: usize,
    /// Rings simplified.
    pub rings: usize,
    /// Positions before simplification.
    pub input_vertices: usize,
    /// Positions after simplification.
    pub output_vertices: usize,
    /// Rings that fell back to the minimum ring.
    pub degenerate_rings: usize,
}

/// Build the feature for one area.
///
/// An area without rings gets a `null` geometry; its `unmatched` property
/// still says how many segments were left open.
#[must_use]
pub fn to_feature(result: &AreaResult, kind: GeometryKind) -> Feature {
    let mut polygons = group_rings(&result.rings);
    let value = match kind {
        _ if polygons.is_empty() => None,
        GeometryKind::Polygon if polygons.len() == 1 => polygons.pop().map(Value::Polygon),
        _ => Some(Value::MultiPolygon(polygons)),
    };
    let geometry = value.map(Geometry::new);

    let mut feature = Feature {
        bbox: None,
        geometry,
        id: Some(Id::Number(result.id.into())),
        properties: None,
        foreign_members: None,
    };
    feature.set_property("name", result.name.clone());
    feature.set_property("id", result.id);
    feature.set_property("count", result.vertex_count);
    feature.set_property("unmatched", result.unmatched.len());
    feature
}

/// Build a collection with one feature per result, in input order.
#[must_use]
pub fn to_feature_collection(results: &[AreaResult], kind: GeometryKind) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: results.iter().map(|r| to_feature(r, kind)).collect(),
        foreign_members: None,
    }
}

/// Pretty-printed GeoJSON text for `collection`.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn to_geojson_string(collection: &FeatureCollection) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(collection)?)
}

/// Parse GeoJSON text that must hold a `FeatureCollection`.
///
/// # Errors
///
/// Returns [`ExportError::Parse`] for invalid GeoJSON and
/// [`ExportError::NotAFeatureCollection`] for a lone feature or geometry.
pub fn parse_feature_collection(input: &str) -> Result<FeatureCollection, ExportError> {
    match input.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) => Err(ExportError::NotAFeatureCollection("Feature")),
        GeoJson::Geometry(_) => Err(ExportError::NotAFeatureCollection("Geometry")),
    }
}

/// Simplify every polygon ring in `collection` again with `tolerance` and
/// rewrite each feature's `count` property.
///
/// Features without a `Polygon` or `MultiPolygon` geometry are skipped.
/// Positions keep only longitude and latitude.
///
/// # Errors
///
/// Returns [`ExportError::InvalidPosition`] for a position with fewer
/// than two values and [`ExportError::Pipeline`] for a ring that is not
/// closed or too short. Features before the failing one have already
/// been rewritten.
pub fn resimplify(
    collection: &mut FeatureCollection,
    tolerance: Tolerance,
) -> Result<ResimplifySummary, ExportError> {
    let mut summary = ResimplifySummary::default();

    for (index, feature) in collection.features.iter_mut().enumerate() {
        let Some(geometry) = feature.geometry.as_mut() else {
            summary.skipped_features += 1;
            continue;
        };
        let count = match &mut geometry.value {
            Value::Polygon(rings) => resimplify_rings(index, rings, tolerance, &mut summary)?,
            Value::MultiPolygon(polygons) => {
                let mut count = 0;
                for rings in polygons {
                    count += resimplify_rings(index, rings, tolerance, &mut summary)?;
                }
                count
            }
            _ => {
                log::debug!("feature {index}: not polygonal, leaving it as is");
                summary.skipped_features += 1;
                continue;
            }
        };
        feature.set_property("count", count);
        summary.features += 1;
    }

    Ok(summary)
}

fn resimplify_rings(
    feature: usize,
    rings: &mut [Vec<Vec<f64>>],
    tolerance: Tolerance,
    summary: &mut ResimplifySummary,
) -> Result<usize, ExportError> {
    let mut count = 0;
    for ring in rings {
        let coords = ring
            .iter()
            .map(|position| coordinate(feature, position))
            .collect::<Result<Vec<_>, _>>()?;
        let simplified = simplify_coordinates(&coords, tolerance)
            .map_err(|source| ExportError::Pipeline { feature, source })?;

        summary.rings += 1;
        summary.input_vertices += coords.len();
        summary.output_vertices += simplified.ring.len();
        if simplified.fallback {
            summary.degenerate_rings += 1;
        }

        count += simplified.ring.len();
        *ring = positions(simplified.ring.coords());
    }
    Ok(count)
}

fn coordinate(feature: usize, position: &[f64]) -> Result<Coordinate, ExportError> {
    match *position {
        [lon, lat, ..] => Ok(Coordinate::new(lon, lat)),
        _ => Err(ExportError::InvalidPosition {
            feature,
            position: position.to_vec(),
        }),
    }
}

fn positions(coords: &[Coordinate]) -> Vec<Vec<f64>> {
    coords.iter().map(|c| c.to_array().to_vec()).collect()
}

/// Group rings into polygons: each shell followed by its holes.
///
/// Rings are visited largest first, so every ring's containers have
/// already been seen; the last of them to contain it is the smallest.
/// Containment depth decides the role: even is a shell, odd is a hole.
/// Shells keep descending-area order; equal areas keep stitch order.
fn group_rings(rings: &[Ring]) -> Vec<Vec<Vec<Vec<f64>>>> {
    let mut ordered: Vec<(f64, Polygon, &Ring)> = rings
        .iter()
        .map(|ring| {
            let polygon = to_polygon(ring);
            (polygon.unsigned_area(), polygon, ring)
        })
        .collect();
    ordered.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut depth = Vec::with_capacity(ordered.len());
    let mut part_of: Vec<Option<usize>> = Vec::with_capacity(ordered.len());
    let mut polygons: Vec<Vec<Vec<Vec<f64>>>> = Vec::new();

    for (k, (_, polygon, ring)) in ordered.iter().enumerate() {
        let parent = (0..k).rev().find(|&p| ordered[p].1.contains(polygon));
        let level = parent.map_or(0, |p| depth[p] + 1);
        depth.push(level);

        let coords = positions(ring.coords());
        match parent.and_then(|p| part_of[p]) {
            Some(part) if level % 2 == 1 => {
                polygons[part].push(coords);
                part_of.push(None);
            }
            _ => {
                part_of.push(Some(polygons.len()));
                polygons.push(vec![coords]);
            }
        }
    }

    polygons
}

fn to_polygon(ring: &Ring) -> Polygon {
    let exterior: LineString = ring.coords().iter().map(|c| (c.lon, c.lat)).collect();
    Polygon::new(exterior, vec![])
}
