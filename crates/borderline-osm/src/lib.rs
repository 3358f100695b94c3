//! borderline-osm: boundary extraction from OSM XML.
//!
//! Produces the tables the pipeline consumes: node positions, way node
//! lists and boundary relations. [`OsmTables::areas`] then resolves each
//! relation into a [`borderline_pipeline::Area`] whose segments already
//! carry coordinates.

pub mod cache;
pub mod error;
pub mod reader;
pub mod tables;

pub use cache::load_or_extract;
pub use error::OsmError;
pub use reader::{extract_tables, read_tables};
pub use tables::{AreaFilter, OsmTables, RelationRecord};
