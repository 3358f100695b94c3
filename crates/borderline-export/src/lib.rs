//! borderline-export: GeoJSON output (sans-IO)
//!
//! Turns pipeline results into a GeoJSON `FeatureCollection`, one feature
//! per area, and re-simplifies collections that were written earlier.
//! Callers do their own file I/O with the strings produced here.

pub mod collection;
pub mod error;

pub use collection::{
    GeometryKind, ResimplifySummary, parse_feature_collection, resimplify, to_feature,
    to_feature_collection, to_geojson_string,
};
pub use error::ExportError;
