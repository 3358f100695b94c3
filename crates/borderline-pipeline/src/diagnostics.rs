//! Run diagnostics: counts across all processed areas.
//!
//! Collected after the fact from [`AreaResult`]s, so the pipeline itself
//! stays free of bookkeeping. The CLI prints [`RunSummary::report`] or the
//! JSON serialization.

use serde::{Deserialize, Serialize};

use crate::area::AreaResult;

/// Aggregate counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Areas processed.
    pub areas: usize,
    /// Rings produced across all areas.
    pub rings: usize,
    /// Areas left with at least one unmatched segment.
    pub incomplete_areas: usize,
    /// Unmatched segments across all areas.
    pub unmatched_segments: usize,
    /// Rings that hit the minimum-ring fallback.
    pub degenerate_rings: usize,
    /// Coordinates fed into stitching.
    pub input_vertices: usize,
    /// Coordinates across all output rings.
    pub output_vertices: usize,
    /// Areas that were incomplete, as `(id, name, unmatched count)`.
    pub incomplete: Vec<IncompleteArea>,
}

/// One area with incomplete topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteArea {
    /// Area identifier.
    pub id: i64,
    /// Area name, if known.
    pub name: Option<String>,
    /// Number of segments that never closed.
    pub unmatched: usize,
}

impl RunSummary {
    /// Tally a batch of results.
    #[must_use]
    pub fn from_results(results: &[AreaResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.add(result);
        }
        summary
    }

    /// Add one area's counts.
    pub fn add(&mut self, result: &AreaResult) {
        self.areas += 1;
        self.rings += result.rings.len();
        self.unmatched_segments += result.unmatched.len();
        self.degenerate_rings += result.degenerate_rings;
        self.input_vertices += result.input_vertices;
        self.output_vertices += result.vertex_count;
        if !result.is_complete() {
            self.incomplete_areas += 1;
            self.incomplete.push(IncompleteArea {
                id: result.id,
                name: result.name.clone(),
                unmatched: result.unmatched.len(),
            });
        }
    }

    /// Fraction of input vertices kept, or `None` for an empty run.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn retention(&self) -> Option<f64> {
        (self.input_vertices > 0).then(|| self.output_vertices as f64 / self.input_vertices as f64)
    }

    /// Human-readable multi-line report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Run summary\n{}", "=".repeat(40)));
        lines.push(format!("{:<24} {:>12}", "Areas", self.areas));
        lines.push(format!("{:<24} {:>12}", "Rings", self.rings));
        lines.push(format!("{:<24} {:>12}", "Incomplete areas", self.incomplete_areas));
        lines.push(format!("{:<24} {:>12}", "Unmatched segments", self.unmatched_segments));
        lines.push(format!("{:<24} {:>12}", "Degenerate rings", self.degenerate_rings));
        lines.push(format!("{:<24} {:>12}", "Input vertices", self.input_vertices));
        lines.push(format!("{:<24} {:>12}", "Output vertices", self.output_vertices));
        if let Some(retention) = self.retention() {
            lines.push(format!("{:<24} {:>11.1}%", "Retained", retention * 100.0));
        }

        if !self.incomplete.is_empty() {
            lines.push(String::new());
            lines.push(format!("Incomplete areas\n{}", "-".repeat(40)));
            for area in &self.incomplete {
                lines.push(format!(
                    "{:<12} {:<20} {:>5} unmatched",
                    area.id,
                    area.name.as_deref().unwrap_or("-"),
                    area.unmatched,
                ));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Coordinate, Ring, Segment};

    fn triangle() -> Ring {
        Ring::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 0.0),
        ])
        .unwrap()
    }

    fn result(id: i64, unmatched: usize) -> AreaResult {
        AreaResult {
            id,
            name: Some(format!("r{id}")),
            rings: vec![triangle()],
            unmatched: (0..unmatched)
                .map(|_| {
                    Segment::new(vec![Coordinate::new(5.0, 5.0), Coordinate::new(6.0, 6.0)])
                        .unwrap()
                })
                .collect(),
            input_vertices: 8,
            vertex_count: 4,
            degenerate_rings: usize::from(id == 2),
        }
    }

    #[test]
    fn empty_summary() {
        let summary = RunSummary::from_results(&[]);
        assert_eq!(summary, RunSummary::default());
        assert!(summary.retention().is_none());
    }

    #[test]
    fn tallies_counts() {
        let summary = RunSummary::from_results(&[result(1, 0), result(2, 3)]);
        assert_eq!(summary.areas, 2);
        assert_eq!(summary.rings, 2);
        assert_eq!(summary.incomplete_areas, 1);
        assert_eq!(summary.unmatched_segments, 3);
        assert_eq!(summary.degenerate_rings, 1);
        assert_eq!(summary.input_vertices, 16);
        assert_eq!(summary.output_vertices, 8);
        assert!((summary.retention().unwrap() - 0.5).abs() < f64::EPSILON);
        assert_eq!(
            summary.incomplete,
            vec![IncompleteArea {
                id: 2,
                name: Some("r2".to_string()),
                unmatched: 3
            }]
        );
    }

    #[test]
    fn report_lists_incomplete_areas() {
        let report = RunSummary::from_results(&[result(1, 0), result(2, 3)]).report();
        assert!(report.contains("Areas"));
        assert!(report.contains("Incomplete areas"));
        assert!(report.contains("r2"));
        assert!(report.contains("50.0%"));
    }

    #[test]
    fn report_rows_are_aligned() {
        let report = RunSummary::from_results(&[result(1, 0), result(2, 3)]).report();
        let areas_row = format!("{:<24} {:>12}", "Areas", 2);
        assert!(report.lines().any(|line| line == areas_row));
        assert!(!report.ends_with('\n'));
    }

    #[test]
    fn summary_serde_round_trip() {
        let summary = RunSummary::from_results(&[result(2, 1)]);
        let json = serde_json::to_string(&summary).unwrap();
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
