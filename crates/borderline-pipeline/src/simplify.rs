//! Ring simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! Reduces the vertex count of a closed ring by removing points that lie
//! within a tolerance of the line between their retained neighbours. The
//! ring's start/end coordinate is the fixed anchor, so closure survives
//! any tolerance.
//!
//! When the tolerance is large enough to reduce a ring below
//! [`MIN_RING_LEN`] coordinates, a fallback keeps the ring minimally
//! valid and flags the result so callers can detect heavy loss.

use crate::types::{Coordinate, MIN_RING_LEN, PipelineError, Ring, Tolerance};

/// Output of [`simplify`].
#[derive(Debug, Clone, PartialEq)]
pub struct Simplified {
    /// The simplified ring. Always closed, always at least
    /// [`MIN_RING_LEN`] coordinates.
    pub ring: Ring,
    /// `true` when plain Douglas-Peucker would have left fewer than
    /// [`MIN_RING_LEN`] coordinates and the minimum-ring fallback was used.
    pub fallback: bool,
}

/// Simplify a single ring using the Ramer-Douglas-Peucker algorithm.
///
/// Points within `tolerance` of the line between their bounding anchors
/// are removed. A zero tolerance returns the ring unchanged.
#[must_use = "returns the simplified ring"]
pub fn simplify(ring: &Ring, tolerance: Tolerance) -> Simplified {
    if tolerance.is_zero() {
        return Simplified {
            ring: ring.clone(),
            fallback: false,
        };
    }

    let points = ring.coords();
    let last = points.len() - 1;

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[last] = true;

    rdp(points, 0, last, tolerance.value(), &mut kept);

    let fallback = kept.iter().filter(|&&k| k).count() < MIN_RING_LEN;
    if fallback {
        keep_minimum_ring(points, &mut kept);
    }

    let simplified: Vec<Coordinate> = points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    // Anchors and the fallback guarantee a closed ring of at least
    // MIN_RING_LEN coordinates.
    Simplified {
        ring: Ring::new(simplified).unwrap_or_else(|_| ring.clone()),
        fallback,
    }
}

/// Relative slack, scaled by coordinate magnitude, within which raw
/// input counts as closed. Covers float rounding, not real gaps.
const CLOSURE_SLACK: f64 = 1e-12;

/// Validate a raw coordinate sequence as a ring, then simplify it.
///
/// A last coordinate that differs from the first only by float rounding
/// is replaced with an exact copy of the first, so the output is exactly
/// closed.
///
/// # Errors
///
/// Returns [`PipelineError::MalformedRing`] if `coords` is not closed or
/// has fewer than [`MIN_RING_LEN`] coordinates. Nothing is simplified in
/// that case.
pub fn simplify_coordinates(
    coords: &[Coordinate],
    tolerance: Tolerance,
) -> Result<Simplified, PipelineError> {
    let mut coords = coords.to_vec();
    if let Some(&first) = coords.first()
        && let Some(last) = coords.last_mut()
        && closes_within_rounding(first, *last)
    {
        *last = first;
    }
    let ring = Ring::new(coords)?;
    Ok(simplify(&ring, tolerance))
}

fn closes_within_rounding(first: Coordinate, last: Coordinate) -> bool {
    let scale = first.lon.abs().max(first.lat.abs()).max(1.0);
    first.distance(last) <= CLOSURE_SLACK * scale
}

/// Simplify multiple rings, applying RDP to each independently.
#[must_use = "returns the simplified rings"]
pub fn simplify_rings(rings: &[Ring], tolerance: Tolerance) -> Vec<Simplified> {
    rings.iter().map(|ring| simplify(ring, tolerance)).collect()
}

/// Ramer-Douglas-Peucker over `points[start..=end]`.
///
/// Finds the point between each pair of retained anchors that is farthest
/// from the line through them. If that distance exceeds `tolerance`, the
/// point is kept and both halves are processed. Iterative so stack depth
/// does not grow with ring size.
fn rdp(points: &[Coordinate], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    let mut spans = vec![(start, end)];

    while let Some((start, end)) = spans.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_idx = start;

        for i in (start + 1)..end {
            let d = perpendicular_distance(points[i], points[start], points[end]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > tolerance {
            kept[max_idx] = true;
            spans.push((max_idx, end));
            spans.push((start, max_idx));
        }
    }
}

/// Force the ring back up to [`MIN_RING_LEN`] coordinates.
///
/// Keeps the anchor (already kept), the interior point farthest from it,
/// and the interior point farthest from the line through those two.
fn keep_minimum_ring(points: &[Coordinate], kept: &mut [bool]) {
    let anchor = points[0];
    let interior = 1..points.len() - 1;

    let far = farthest(interior.clone(), |i| anchor.distance_squared(points[i]));
    kept[far] = true;

    let wide = farthest(interior.filter(|&i| i != far), |i| {
        perpendicular_distance(points[i], anchor, points[far])
    });
    kept[wide] = true;
}

/// Index with the largest `score`; the first one wins ties.
fn farthest(indices: impl Iterator<Item = usize>, score: impl Fn(usize) -> f64) -> usize {
    let mut best = (0, f64::NEG_INFINITY);
    for i in indices {
        let s = score(i);
        if s > best.1 {
            best = (i, s);
        }
    }
    best.0
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// Uses the formula: |cross(b-a, p-a)| / |b-a|.
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
pub(crate) fn perpendicular_distance(p: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        // a and b are the same point.
        return p.distance(a);
    }

    // |cross product| / |line length|
    let cross = dx.mul_add(a.lat - p.lat, -(dy * (a.lon - p.lon)));
    cross.abs() / length_sq.sqrt()
}
