//! OSM XML extraction.
//!
//! The document is parsed once. Nodes, ways and relations are then pulled
//! out by three extractors running in parallel over that shared tree, and
//! joined before anything downstream starts.
//!
//! Only what boundary assembly needs is kept: node positions, way node
//! lists, and relation names, levels and way members.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use roxmltree::{Document, Node};

use borderline_pipeline::Coordinate;

use crate::error::OsmError;
use crate::tables::{OsmTables, RelationRecord};

/// Read an `.osm` file from disk and extract its tables.
///
/// # Errors
///
/// Returns [`OsmError::Io`] if the file cannot be read, otherwise any
/// error from [`extract_tables`].
pub fn read_tables(path: &Path) -> Result<OsmTables, OsmError> {
    let xml = std::fs::read_to_string(path)?;
    log::info!("read {} ({} bytes)", path.display(), xml.len());
    extract_tables(&xml)
}

/// Extract node, way and relation tables from OSM XML.
///
/// # Errors
///
/// Returns [`OsmError::Xml`] for malformed XML, and
/// [`OsmError::MissingAttribute`] / [`OsmError::InvalidAttribute`] for
/// elements whose ids, references or positions cannot be read.
pub fn extract_tables(xml: &str) -> Result<OsmTables, OsmError> {
    let doc = Document::parse(xml)?;
    let doc = &doc;
    let (nodes, (ways, relations)) = rayon::join(
        || extract_nodes(doc),
        || rayon::join(|| extract_ways(doc), || extract_relations(doc)),
    );

    let tables = OsmTables {
        nodes: nodes?,
        ways: ways?,
        relations: relations?,
    };
    log::info!(
        "found {} nodes, {} ways, {} relations",
        tables.nodes.len(),
        tables.ways.len(),
        tables.relations.len()
    );
    Ok(tables)
}

fn extract_nodes(doc: &Document<'_>) -> Result<BTreeMap<i64, Coordinate>, OsmError> {
    let mut nodes = BTreeMap::new();
    for node in elements(doc, "node") {
        let id = attribute(node, "id")?;
        let lon = attribute(node, "lon")?;
        let lat = attribute(node, "lat")?;
        nodes.insert(id, Coordinate::new(lon, lat));
    }
    Ok(nodes)
}

fn extract_ways(doc: &Document<'_>) -> Result<BTreeMap<i64, Vec<i64>>, OsmError> {
    let mut ways = BTreeMap::new();
    for way in elements(doc, "way") {
        let id = attribute(way, "id")?;
        let node_ids = children(way, "nd")
            .map(|nd| attribute(nd, "ref"))
            .collect::<Result<Vec<i64>, _>>()?;
        ways.insert(id, node_ids);
    }
    Ok(ways)
}

fn extract_relations(doc: &Document<'_>) -> Result<BTreeMap<i64, RelationRecord>, OsmError> {
    let mut relations = BTreeMap::new();
    for relation in elements(doc, "relation") {
        let id = attribute(relation, "id")?;
        let mut record = RelationRecord::default();
        let mut upper_name = None;

        for tag in children(relation, "tag") {
            let (Some(k), Some(v)) = (tag.attribute("k"), tag.attribute("v")) else {
                continue;
            };
            match k {
                "name" => record.name = Some(v.to_string()),
                "NAME" => upper_name = Some(v.to_string()),
                "admin_level" => record.admin_level = v.trim().parse().ok(),
                "boundary" => record.boundary = Some(v.to_string()),
                _ => {}
            }
        }
        record.name = record.name.or(upper_name);

        for member in children(relation, "member") {
            if member.attribute("type") == Some("way") {
                record.ways.push(attribute(member, "ref")?);
            }
        }

        relations.insert(id, record);
    }
    Ok(relations)
}

fn elements<'a, 'input>(
    doc: &'a Document<'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    doc.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn children<'a, 'input>(
    parent: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    parent
        .children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn attribute<T: FromStr>(node: Node<'_, '_>, name: &'static str) -> Result<T, OsmError> {
    let element = || node.tag_name().name().to_string();
    let raw = node
        .attribute(name)
        .ok_or_else(|| OsmError::MissingAttribute {
            element: element(),
            attribute: name,
        })?;
    raw.parse().map_err(|_| OsmError::InvalidAttribute {
        element: element(),
        attribute: name,
        value: raw.to_string(),
    })
}
