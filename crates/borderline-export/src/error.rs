//! Error type for GeoJSON export and re-simplification.

use borderline_pipeline::PipelineError;
use thiserror::Error;

/// Errors from building, reading or re-simplifying GeoJSON.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A ring in feature `feature` was rejected by the pipeline.
    #[error("feature {feature}: {source}")]
    Pipeline {
        feature: usize,
        #[source]
        source: PipelineError,
    },

    #[error("expected a GeoJSON FeatureCollection, found a {0}")]
    NotAFeatureCollection(&'static str),

    #[error("failed to parse GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    /// A position with fewer than two values.
    #[error("feature {feature}: position {position:?} needs a longitude and a latitude")]
    InvalidPosition { feature: usize, position: Vec<f64> },

    #[error("failed to serialize GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
}
