//! borderline-pipeline: Pure ring assembly pipeline (sans-IO).
//!
//! Turns the loose boundary segments of an administrative area into
//! closed, simplified rings through:
//! validation -> stitching -> Douglas-Peucker simplification.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! coordinates and returns structured data. Map parsing lives in
//! `borderline-osm`, document emission in `borderline-export`.
//!
//! Distances are plain Euclidean distances on raw coordinates. At the
//! sub-degree tolerances this is meant for that is an acceptable
//! approximation; nothing here reprojects or corrects for it.

pub mod area;
pub mod diagnostics;
pub mod simplify;
pub mod stitch;
pub mod types;

pub use area::{AreaResult, process_area, process_areas};
pub use diagnostics::RunSummary;
pub use simplify::{Simplified, simplify, simplify_coordinates, simplify_rings};
pub use stitch::{Stitched, stitch};
pub use types::{
    Area, Coordinate, MIN_RING_LEN, PipelineConfig, PipelineError, Ring, Segment, Tolerance,
};
