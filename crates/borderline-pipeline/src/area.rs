//! Per-area pipeline: validate, stitch, simplify.
//!
//! Areas share nothing, so [`process_areas`] runs one rayon task per area
//! and collects results in input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::simplify::simplify;
use crate::stitch::stitch;
use crate::types::{Area, PipelineConfig, PipelineError, Ring, Segment, Tolerance};

/// Output of the pipeline for one area.
///
/// Carries everything the export needs to write one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaResult {
    /// Source identifier of the area.
    pub id: i64,
    /// Display name, if known.
    pub name: Option<String>,
    /// Simplified closed rings, in stitch order.
    pub rings: Vec<Ring>,
    /// Segments that never closed (incomplete topology), unsimplified.
    pub unmatched: Vec<Segment>,
    /// Coordinates across all input segments.
    pub input_vertices: usize,
    /// Coordinates across all output rings.
    pub vertex_count: usize,
    /// Rings that needed the minimum-ring fallback during simplification.
    pub degenerate_rings: usize,
}

impl AreaResult {
    /// Returns `true` if every segment was assembled into a ring.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Run stitching and simplification for one area.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidTolerance`] if `config` holds a
/// negative or non-finite tolerance. Unclosed segments are not an error;
/// they are reported in [`AreaResult::unmatched`].
pub fn process_area(area: Area, config: &PipelineConfig) -> Result<AreaResult, PipelineError> {
    let (stitch_tolerance, simplify_tolerance) = config.validate()?;
    Ok(run(area, stitch_tolerance, simplify_tolerance))
}

/// Run the pipeline for many areas in parallel.
///
/// Results keep the order of `areas`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidTolerance`] before any area is
/// processed if `config` is invalid.
pub fn process_areas(
    areas: Vec<Area>,
    config: &PipelineConfig,
) -> Result<Vec<AreaResult>, PipelineError> {
    let (stitch_tolerance, simplify_tolerance) = config.validate()?;
    Ok(areas
        .into_par_iter()
        .map(|area| run(area, stitch_tolerance, simplify_tolerance))
        .collect())
}

fn run(area: Area, stitch_tolerance: Tolerance, simplify_tolerance: Tolerance) -> AreaResult {
    let input_vertices = area.vertex_count();
    let segment_count = area.segments.len();

    let stitched = stitch(area.segments, stitch_tolerance);

    let mut degenerate_rings = 0;
    let rings: Vec<Ring> = stitched
        .rings
        .iter()
        .map(|ring| {
            let simplified = simplify(ring, simplify_tolerance);
            if simplified.fallback {
                degenerate_rings += 1;
            }
            simplified.ring
        })
        .collect();
    let vertex_count = rings.iter().map(Ring::len).sum();

    log::debug!(
        "area {} ({}): {segment_count} segments -> {} rings, {} unmatched, {input_vertices} -> {vertex_count} vertices",
        area.id,
        area.name.as_deref().unwrap_or("unnamed"),
        rings.len(),
        stitched.unmatched.len(),
    );
    if !stitched.unmatched.is_empty() {
        log::warn!(
            "area {}: {} segment(s) could not be closed into rings",
            area.id,
            stitched.unmatched.len()
        );
    }

    AreaResult {
        id: area.id,
        name: area.name,
        rings,
        unmatched: stitched.unmatched,
        input_vertices,
        vertex_count,
        degenerate_rings,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Coordinate;

    fn area(id: i64, pieces: &[&[(f64, f64)]]) -> Area {
        Area::from_coordinates(
            id,
            Some(format!("area {id}")),
            pieces
                .iter()
                .map(|p| p.iter().copied().map(Coordinate::from).collect())
                .collect(),
        )
        .unwrap()
    }

    fn square_area(id: i64) -> Area {
        area(
            id,
            &[
                &[(0.0, 0.0), (5.0, 0.0)],
                &[(5.0, 0.0), (5.0, 5.0)],
                &[(5.0, 5.0), (0.0, 5.0)],
                &[(0.0, 5.0), (0.0, 0.0)],
            ],
        )
    }

    #[test]
    fn square_survives_small_tolerance() {
        let result = process_area(square_area(1), &PipelineConfig::default()).unwrap();
        assert!(result.is_complete());
        assert_eq!(result.rings.len(), 1);
        assert_eq!(result.vertex_count, 5);
        assert_eq!(result.input_vertices, 8);
        assert_eq!(result.degenerate_rings, 0);
        assert_eq!(result.name.as_deref(), Some("area 1"));
    }

    #[test]
    fn square_with_huge_tolerance_is_flagged_degenerate() {
        let config = PipelineConfig {
            simplify_tolerance: 10.0,
            ..PipelineConfig::default()
        };
        let result = process_area(square_area(1), &config).unwrap();
        assert_eq!(result.rings.len(), 1);
        assert_eq!(result.rings[0].len(), 4);
        assert_eq!(result.degenerate_rings, 1);
    }

    #[test]
    fn incomplete_area_keeps_its_rings() {
        let mut a = square_area(2);
        a.segments
            .push(Segment::new(vec![Coordinate::new(9.0, 9.0), Coordinate::new(9.5, 9.5)]).unwrap());
        let result = process_area(a, &PipelineConfig::default()).unwrap();
        assert_eq!(result.rings.len(), 1);
        assert_eq!(result.unmatched.len(), 1);
        assert!(!result.is_complete());
    }

    #[test]
    fn empty_area_yields_nothing() {
        let result = process_area(area(3, &[]), &PipelineConfig::default()).unwrap();
        assert!(result.rings.is_empty());
        assert!(result.unmatched.is_empty());
        assert_eq!(result.vertex_count, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PipelineConfig {
            stitch_tolerance: f64::NAN,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            process_area(square_area(1), &config),
            Err(PipelineError::InvalidTolerance(_))
        ));
        assert!(process_areas(vec![square_area(1)], &config).is_err());
    }

    #[test]
    fn process_areas_preserves_order() {
        let areas: Vec<Area> = (0..32).map(square_area).collect();
        let results = process_areas(areas, &PipelineConfig::default()).unwrap();
        let ids: Vec<i64> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn area_result_serde_round_trip() {
        let result = process_area(square_area(4), &PipelineConfig::default()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: AreaResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
