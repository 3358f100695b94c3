//! Error type for OSM extraction.

use thiserror::Error;

/// Errors from reading OSM data or its cache.
#[derive(Error, Debug)]
pub enum OsmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse OSM XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("<{element}> is missing the `{attribute}` attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("<{element}> has an invalid `{attribute}` value: {value:?}")]
    InvalidAttribute {
        element: String,
        attribute: &'static str,
        value: String,
    },

    #[error("cache error: {0}")]
    Cache(#[from] bincode::Error),
}
