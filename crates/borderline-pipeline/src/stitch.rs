//! Segment stitching: assemble an area's open boundary pieces into rings.
//!
//! Boundary data arrives as many short ways whose endpoints touch. This
//! module greedily merges pairs of segments at shared endpoints until no
//! merge is possible, then promotes every closed result to a [`Ring`].
//!
//! Matching is exact first: a tolerance match is only considered when no
//! exact endpoint match exists anywhere in the pool, so genuinely distinct
//! borders that merely come close are not bridged while shared node
//! identity is available.
//!
//! Ties are broken by pool order (input order, with merged segments
//! taking the lower position), so the output is deterministic.

use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::types::{Coordinate, MIN_RING_LEN, Ring, Segment, Tolerance};

/// Result of [`stitch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stitched {
    /// Every closed loop found, in pool order.
    pub rings: Vec<Ring>,
    /// Segments that never closed. Non-empty means the area's topology is
    /// incomplete; the rings are still usable.
    pub unmatched: Vec<Segment>,
}

impl Stitched {
    /// Returns `true` if every segment ended up in a ring.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Stitch open segments into closed rings.
///
/// `tolerance` is the fallback endpoint matching distance; zero means
/// exact coordinate equality only. It also decides when a segment's head
/// and tail are close enough to count as closed.
#[must_use = "returns the stitched rings"]
pub fn stitch(segments: Vec<Segment>, tolerance: Tolerance) -> Stitched {
    let mut pool = segments;

    while let Some((i, j, merge)) = find_merge(&pool, Tolerance::ZERO, tolerance).or_else(|| {
        if tolerance.is_zero() {
            None
        } else {
            find_merge(&pool, tolerance, tolerance)
        }
    }) {
        // j > i, so removing j leaves i in place.
        let other = pool.remove(j);
        if let Merge::Join(join) = merge {
            let merged = join.apply(&pool[i], &other);
            pool[i] = merged;
        }
    }

    partition(pool, tolerance)
}

/// How two segments touch, named `(end of first, end of second)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    TailHead,
    TailTail,
    HeadHead,
    HeadTail,
}

impl Join {
    /// Test order for each candidate pair.
    const ALL: [Self; 4] = [Self::TailHead, Self::TailTail, Self::HeadHead, Self::HeadTail];

    /// The two endpoints this configuration joins.
    fn ends(self, first: &Segment, second: &Segment) -> (Coordinate, Coordinate) {
        match self {
            Self::TailHead => (first.tail(), second.head()),
            Self::TailTail => (first.tail(), second.tail()),
            Self::HeadHead => (first.head(), second.head()),
            Self::HeadTail => (first.head(), second.tail()),
        }
    }

    /// Concatenate the two segments so the joined ends abut.
    ///
    /// `first` keeps its orientation; `second` is reversed when needed.
    /// Identical touching coordinates are emitted once; coordinates that
    /// only match within tolerance are both kept.
    fn apply(self, first: &Segment, second: &Segment) -> Segment {
        let (mut coords, follow) = match self {
            Self::TailHead => (first.coords().to_vec(), second.coords().to_vec()),
            Self::TailTail => (first.coords().to_vec(), second.reversed().into_coords()),
            Self::HeadHead => (second.reversed().into_coords(), first.coords().to_vec()),
            Self::HeadTail => (second.coords().to_vec(), first.coords().to_vec()),
        };
        let skip = usize::from(coords.last() == follow.first());
        coords.extend_from_slice(&follow[skip..]);
        Segment::from_vec_unchecked(coords)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Merge {
    /// Same coordinates (either direction): keep one copy.
    Duplicate,
    Join(Join),
}

/// Decide whether `first` and `second` merge at `radius`, and how.
fn classify(first: &Segment, second: &Segment, radius: Tolerance) -> Option<Merge> {
    if first.coords() == second.coords() || first.coords().iter().eq(second.coords().iter().rev())
    {
        return Some(Merge::Duplicate);
    }
    Join::ALL
        .into_iter()
        .find(|join| {
            let (a, b) = join.ends(first, second);
            a.matches(b, radius)
        })
        .map(Merge::Join)
}

type Endpoint = GeomWithData<[f64; 2], usize>;

/// Find the first mergeable pair `(i, j)`, `i < j`, in pool order.
///
/// Equivalent to scanning every pair, but candidates for each `i` come
/// from an R-tree over the open segments' endpoints.
fn find_merge(
    pool: &[Segment],
    radius: Tolerance,
    closure: Tolerance,
) -> Option<(usize, usize, Merge)> {
    let open: Vec<bool> = pool.iter().map(|s| !is_loop(s, closure)).collect();

    let endpoints: Vec<Endpoint> = pool
        .iter()
        .enumerate()
        .filter(|&(i, _)| open[i])
        .flat_map(|(i, s)| {
            [
                Endpoint::new(s.head().to_array(), i),
                Endpoint::new(s.tail().to_array(), i),
            ]
        })
        .collect();
    if endpoints.len() < 4 {
        return None;
    }
    let index = RTree::bulk_load(endpoints);
    let max_squared_radius = search_radius_squared(radius);

    for (i, first) in pool.iter().enumerate() {
        if !open[i] {
            continue;
        }

        let mut candidates: Vec<usize> = [first.head(), first.tail()]
            .into_iter()
            .flat_map(|end| index.locate_within_distance(end.to_array(), max_squared_radius))
            .map(|endpoint| endpoint.data)
            .filter(|&j| j > i)
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        // The index query is slightly generous; `classify` has the final say.
        for j in candidates {
            if let Some(merge) = classify(first, &pool[j], radius) {
                return Some((i, j, merge));
            }
        }
    }

    None
}

/// Squared query radius for the endpoint index, padded so rounding in
/// the index's distance computation never hides a real match.
fn search_radius_squared(radius: Tolerance) -> f64 {
    let r = radius.value();
    r * r * (1.0 + 1e-9)
}

/// Whether `segment` is finished and takes no further merges.
///
/// Exactly equal ends always close a loop. Ends that only meet within
/// `tolerance` close it only when the segment is long enough to become a
/// ring once the head is repeated, so a way shorter than the tolerance
/// still joins its neighbours.
fn is_loop(segment: &Segment, tolerance: Tolerance) -> bool {
    segment.head() == segment.tail()
        || (segment.len() >= MIN_RING_LEN - 1 && segment.is_closed(tolerance))
}

/// Split the final pool into rings and leftovers.
fn partition(pool: Vec<Segment>, tolerance: Tolerance) -> Stitched {
    let mut stitched = Stitched::default();

    for segment in pool {
        if !is_loop(&segment, tolerance) {
            stitched.unmatched.push(segment);
            continue;
        }

        let mut coords = segment.coords().to_vec();
        if segment.head() != segment.tail() {
            // Closed within tolerance: repeat the head so first == last.
            coords.push(segment.head());
        }
        match Ring::new(coords) {
            Ok(ring) => stitched.rings.push(ring),
            Err(_) => stitched.unmatched.push(segment),
        }
    }

    stitched
}
