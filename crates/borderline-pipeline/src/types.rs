//! Shared types for the borderline ring assembly pipeline.

use serde::{Deserialize, Serialize};

/// A 2D point in raw map coordinates.
///
/// No projection is applied anywhere in the pipeline; distances are plain
/// Euclidean distances on these values, which is only a reasonable
/// approximation at sub-degree tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude (x).
    pub lon: f64,
    /// Latitude (y).
    pub lat: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Squared Euclidean distance to another coordinate.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.lon - other.lon;
        let dy = self.lat - other.lat;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another coordinate.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns `true` if `other` is the same coordinate, or lies within
    /// `tolerance` of it.
    ///
    /// A zero tolerance means exact equality only.
    #[must_use]
    pub fn matches(self, other: Self, tolerance: Tolerance) -> bool {
        self == other || self.distance(other) <= tolerance.value()
    }

    /// The coordinate as a `[lon, lat]` array, the layout used by the
    /// spatial index and by GeoJSON positions.
    #[must_use]
    pub const fn to_array(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

/// A non-negative, finite distance in coordinate units.
///
/// Used both for endpoint matching while stitching and as the
/// simplification error bound. The two are configured separately; see
/// [`PipelineConfig`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tolerance(f64);

impl Tolerance {
    /// Exact matching / no simplification.
    pub const ZERO: Self = Self(0.0);

    /// Create a tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTolerance`] if `value` is negative,
    /// NaN or infinite.
    pub fn new(value: f64) -> Result<Self, PipelineError> {
        if value.is_finite() && value >= 0.0 {
            // Normalizes -0.0.
            Ok(Self(value.abs()))
        } else {
            Err(PipelineError::InvalidTolerance(value))
        }
    }

    /// The raw distance.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Returns `true` for a zero tolerance.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f64> for Tolerance {
    type Error = PipelineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tolerance> for f64 {
    fn from(tolerance: Tolerance) -> Self {
        tolerance.0
    }
}

/// An open polyline fragment of a boundary: at least two coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coordinate>", into = "Vec<Coordinate>")]
pub struct Segment(Vec<Coordinate>);

impl Segment {
    /// Create a segment.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedSegment`] if fewer than two
    /// coordinates are supplied. The reported index is 0; callers that
    /// build segments in bulk use [`Area::from_coordinates`] to get the
    /// real position.
    pub fn new(coords: Vec<Coordinate>) -> Result<Self, PipelineError> {
        if coords.len() < 2 {
            return Err(PipelineError::MalformedSegment {
                index: 0,
                len: coords.len(),
            });
        }
        Ok(Self(coords))
    }

    /// First coordinate.
    #[must_use]
    pub fn head(&self) -> Coordinate {
        self.0[0]
    }

    /// Last coordinate.
    #[must_use]
    pub fn tail(&self) -> Coordinate {
        self.0[self.0.len() - 1]
    }

    /// Number of coordinates (always at least 2).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the head and tail match within `tolerance`.
    #[must_use]
    pub fn is_closed(&self, tolerance: Tolerance) -> bool {
        self.head().matches(self.tail(), tolerance)
    }

    /// Returns a slice of all coordinates.
    #[must_use]
    pub fn coords(&self) -> &[Coordinate] {
        &self.0
    }

    /// Consumes the segment and returns its coordinates.
    #[must_use]
    pub fn into_coords(self) -> Vec<Coordinate> {
        self.0
    }

    /// Same coordinates, opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut coords = self.0.clone();
        coords.reverse();
        Self(coords)
    }

    /// Wrap coordinates known to hold at least two entries.
    pub(crate) const fn from_vec_unchecked(coords: Vec<Coordinate>) -> Self {
        Self(coords)
    }
}

impl TryFrom<Vec<Coordinate>> for Segment {
    type Error = PipelineError;

    fn try_from(coords: Vec<Coordinate>) -> Result<Self, Self::Error> {
        Self::new(coords)
    }
}

impl From<Segment> for Vec<Coordinate> {
    fn from(segment: Segment) -> Self {
        segment.0
    }
}

impl From<Ring> for Segment {
    fn from(ring: Ring) -> Self {
        Self(ring.0)
    }
}

/// Minimum number of coordinates in a ring: three distinct vertices plus
/// the closing repeat.
pub const MIN_RING_LEN: usize = 4;

/// A closed polyline: first coordinate equals last, at least
/// [`MIN_RING_LEN`] coordinates.
///
/// Winding order is whatever the input produced; it is never corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coordinate>", into = "Vec<Coordinate>")]
pub struct Ring(Vec<Coordinate>);

impl Ring {
    /// Create a ring.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedRing`] if there are fewer than
    /// [`MIN_RING_LEN`] coordinates or the first and last coordinates are
    /// not identical. Raw input that closes only up to float rounding goes
    /// through [`crate::simplify_coordinates`] instead.
    pub fn new(coords: Vec<Coordinate>) -> Result<Self, PipelineError> {
        let closed = coords.first() == coords.last();
        if coords.len() < MIN_RING_LEN || !closed {
            return Err(PipelineError::MalformedRing {
                len: coords.len(),
                closed,
            });
        }
        Ok(Self(coords))
    }

    /// Number of coordinates, including the closing repeat.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The shared start/end coordinate.
    #[must_use]
    pub fn anchor(&self) -> Coordinate {
        self.0[0]
    }

    /// Returns a slice of all coordinates.
    #[must_use]
    pub fn coords(&self) -> &[Coordinate] {
        &self.0
    }

    /// Consumes the ring and returns its coordinates.
    #[must_use]
    pub fn into_coords(self) -> Vec<Coordinate> {
        self.0
    }
}

impl TryFrom<Vec<Coordinate>> for Ring {
    type Error = PipelineError;

    fn try_from(coords: Vec<Coordinate>) -> Result<Self, Self::Error> {
        Self::new(coords)
    }
}

impl From<Ring> for Vec<Coordinate> {
    fn from(ring: Ring) -> Self {
        ring.0
    }
}

/// One administrative area: the unit of work for the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// Source identifier (the boundary relation id).
    pub id: i64,
    /// Display name, if the source carried one.
    pub name: Option<String>,
    /// Unassembled boundary pieces. Order is only used to break ties.
    pub segments: Vec<Segment>,
}

impl Area {
    /// Build an area from raw coordinate sequences, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedSegment`] for the first sequence
    /// with fewer than two coordinates.
    pub fn from_coordinates(
        id: i64,
        name: Option<String>,
        sequences: Vec<Vec<Coordinate>>,
    ) -> Result<Self, PipelineError> {
        let segments = sequences
            .into_iter()
            .enumerate()
            .map(|(index, coords)| {
                let len = coords.len();
                Segment::new(coords).map_err(|_| PipelineError::MalformedSegment { index, len })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { id, name, segments })
    }

    /// Total coordinates across all segments.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }
}

/// Configuration for the per-area pipeline.
///
/// The two tolerances are logically independent: one decides when two
/// endpoints are "the same node", the other bounds the simplification
/// error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fallback distance for endpoint matching, used only when no exact
    /// endpoint match exists in the pool.
    pub stitch_tolerance: f64,

    /// Douglas-Peucker error bound. Zero disables simplification.
    pub simplify_tolerance: f64,
}

impl PipelineConfig {
    /// Default endpoint matching tolerance (about 10 cm at the equator
    /// in degrees).
    pub const DEFAULT_STITCH_TOLERANCE: f64 = 1e-6;

    /// Default simplification tolerance.
    pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.15;

    /// Check both tolerances and return them as validated values.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTolerance`] for a negative or
    /// non-finite tolerance.
    pub fn validate(&self) -> Result<(Tolerance, Tolerance), PipelineError> {
        Ok((
            Tolerance::new(self.stitch_tolerance)?,
            Tolerance::new(self.simplify_tolerance)?,
        ))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stitch_tolerance: Self::DEFAULT_STITCH_TOLERANCE,
            simplify_tolerance: Self::DEFAULT_SIMPLIFY_TOLERANCE,
        }
    }
}

/// Errors that can occur during pipeline processing.
///
/// Incomplete topology and heavy simplification are not errors; they are
/// reported on the result values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// A segment had fewer than two coordinates.
    #[error("segment {index} has {len} coordinate(s), need at least 2")]
    MalformedSegment {
        /// Position of the segment in its area.
        index: usize,
        /// Number of coordinates supplied.
        len: usize,
    },

    /// A ring was too short or not closed.
    #[error("malformed ring: {len} coordinate(s), closed: {closed} (need at least 4, closed)")]
    MalformedRing {
        /// Number of coordinates supplied.
        len: usize,
        /// Whether the first and last coordinates were identical.
        closed: bool,
    },

    /// A tolerance was negative, NaN or infinite.
    #[error("invalid tolerance {0}: must be finite and non-negative")]
    InvalidTolerance(f64),
}
