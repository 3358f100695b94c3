//! The three extracted tables and their resolution into [`Area`]s.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use borderline_pipeline::{Area, Coordinate, Segment};

/// Node, way and relation tables pulled from one OSM file.
///
/// Keys are OSM ids. `BTreeMap` keeps iteration (and so area order)
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsmTables {
    /// Node id -> position.
    pub nodes: BTreeMap<i64, Coordinate>,
    /// Way id -> ordered node ids.
    pub ways: BTreeMap<i64, Vec<i64>>,
    /// Relation id -> boundary relation.
    pub relations: BTreeMap<i64, RelationRecord>,
}

/// The parts of a relation the pipeline cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    /// `name` tag, or the upper-case `NAME` tag some extracts use.
    pub name: Option<String>,
    /// Parsed `admin_level` tag.
    pub admin_level: Option<u8>,
    /// `boundary` tag (e.g. `administrative`).
    pub boundary: Option<String>,
    /// Way members, in member order.
    pub ways: Vec<i64>,
}

/// Which relations become areas. The default accepts all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaFilter {
    /// Keep only relations with this `admin_level`.
    pub admin_level: Option<u8>,
    /// Keep only `boundary=administrative` relations.
    pub administrative_only: bool,
}

impl AreaFilter {
    /// Returns `true` if `relation` passes the filter.
    #[must_use]
    pub fn accepts(&self, relation: &RelationRecord) -> bool {
        if let Some(level) = self.admin_level
            && relation.admin_level != Some(level)
        {
            return false;
        }
        !self.administrative_only || relation.boundary.as_deref() == Some("administrative")
    }
}

impl OsmTables {
    /// Resolve relations into areas, in relation id order.
    ///
    /// Every segment of the returned areas has its coordinates filled in.
    /// Members missing from the extract are skipped with a warning, as is
    /// any way left with fewer than two known nodes.
    #[must_use]
    pub fn areas(&self, filter: &AreaFilter) -> Vec<Area> {
        self.relations
            .iter()
            .filter(|(_, relation)| filter.accepts(relation))
            .map(|(&id, relation)| self.resolve(id, relation))
            .collect()
    }

    fn resolve(&self, id: i64, relation: &RelationRecord) -> Area {
        let mut segments = Vec::with_capacity(relation.ways.len());

        for way_id in &relation.ways {
            let Some(node_ids) = self.ways.get(way_id) else {
                log::warn!("relation {id}: way {way_id} is not in the extract, skipping it");
                continue;
            };

            let coords: Vec<Coordinate> = node_ids
                .iter()
                .filter_map(|node_id| self.nodes.get(node_id).copied())
                .collect();
            let missing = node_ids.len() - coords.len();
            if missing > 0 {
                log::warn!("relation {id}: way {way_id} references {missing} missing node(s)");
            }

            match Segment::new(coords) {
                Ok(segment) => segments.push(segment),
                Err(_) => log::warn!(
                    "relation {id}: way {way_id} has fewer than 2 known nodes, skipping it"
                ),
            }
        }

        Area {
            id,
            name: relation.name.clone(),
            segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> OsmTables {
        let mut t = OsmTables::default();
        for (id, lon, lat) in [(1, 0.0, 0.0), (2, 1.0, 0.0), (3, 1.0, 1.0), (4, 0.0, 1.0)] {
            t.nodes.insert(id, Coordinate::new(lon, lat));
        }
        t.ways.insert(10, vec![1, 2, 3]);
        t.ways.insert(11, vec![3, 4, 1]);
        t.ways.insert(12, vec![4, 99]);
        t.relations.insert(
            100,
            RelationRecord {
                name: Some("Square".to_string()),
                admin_level: Some(2),
                boundary: Some("administrative".to_string()),
                ways: vec![10, 11],
            },
        );
        t.relations.insert(
            200,
            RelationRecord {
                name: None,
                admin_level: Some(4),
                boundary: None,
                ways: vec![10, 12, 13],
            },
        );
        t
    }

    #[test]
    fn resolves_relations_in_id_order() {
        let areas = tables().areas(&AreaFilter::default());
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].id, 100);
        assert_eq!(areas[0].name.as_deref(), Some("Square"));
        assert_eq!(areas[0].segments.len(), 2);
        assert_eq!(
            areas[0].segments[0].coords(),
            &[
                Coordinate::new(0.0, 0.0),
                Coordinate::new(1.0, 0.0),
                Coordinate::new(1.0, 1.0)
            ]
        );
    }

    #[test]
    fn skips_missing_ways_and_short_ways() {
        let areas = tables().areas(&AreaFilter::default());
        // Way 12 resolves to a single node, way 13 does not exist.
        assert_eq!(areas[1].id, 200);
        assert_eq!(areas[1].segments.len(), 1);
    }

    #[test]
    fn filter_by_admin_level() {
        let filter = AreaFilter {
            admin_level: Some(4),
            ..AreaFilter::default()
        };
        let areas = tables().areas(&filter);
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].id, 200);
    }

    #[test]
    fn filter_administrative_only() {
        let filter = AreaFilter {
            administrative_only: true,
            ..AreaFilter::default()
        };
        let areas = tables().areas(&filter);
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].id, 100);
    }
}
