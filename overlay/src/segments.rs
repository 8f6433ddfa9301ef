//! The prepared input rings, and the segments they're made of.

use std::{cmp::Ordering, ops::Range};

use malachite::Rational;

use crate::{
    exact,
    geom::{double_area, BoundingBox, Point, Segment},
    geometry::{MultiLinestring, MultiPolygon, Ring},
    intersection::SegmentRatio,
    num::Float,
    turn::SegmentId,
};

/// Identifies a ring of one of the input geometries.
#[derive(Clone, Copy, Debug, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize)]
pub struct RingId {
    pub source: usize,
    pub multi: usize,
    pub ring: usize,
}

impl From<SegmentId> for RingId {
    fn from(seg: SegmentId) -> Self {
        RingId {
            source: seg.source,
            multi: seg.multi,
            ring: seg.ring,
        }
    }
}

/// An index into our ring arena.
///
/// Unlike a [`RingId`], this is only meaningful for the [`Rings`] that produced it.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct RingIdx(pub usize);

impl std::fmt::Debug for RingIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r_{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RingKind {
    /// A closed ring bounding an area, which is on the right of the ring's
    /// direction of travel if `interior_on_right`.
    Areal { interior_on_right: bool },
    /// An open linestring.
    Linear,
}

/// The number of segments in a [`Block`].
const BLOCK_SIZE: usize = 16;

/// A run of consecutive segments of a ring, with the exact bounds of their points.
#[derive(Clone, Debug)]
pub struct Block {
    pub segments: Range<usize>,
    pub bounds: exact::Bounds,
}

#[derive(Clone, Debug)]
pub struct PreparedRing<F: Float> {
    pub id: RingId,
    pub kind: RingKind,
    /// Without duplicates, and without the closing point.
    pub points: Vec<Point<F>>,
    /// The same points, converted exactly.
    pub exact: Vec<exact::Point>,
    pub bbox: BoundingBox<F>,
    /// Covers all the segments, in order. Ray casts skip the blocks they can't hit.
    pub blocks: Vec<Block>,
}

impl<F: Float> PreparedRing<F> {
    fn new(id: RingId, kind: RingKind, points: Vec<Point<F>>) -> Self {
        let exact: Vec<exact::Point> = points.iter().map(exact::Point::from_point).collect();
        let bbox = BoundingBox::from_points(&points);
        let mut ring = PreparedRing {
            id,
            kind,
            points,
            exact,
            bbox,
            blocks: Vec::new(),
        };
        let n = ring.exact.len();
        ring.blocks = (0..ring.num_segments())
            .step_by(BLOCK_SIZE)
            .filter_map(|start| {
                let segments = start..(start + BLOCK_SIZE).min(ring.num_segments());
                // A segment's end point is the start of the next one, wrapping around.
                let points = (segments.start..=segments.end).map(|i| &ring.exact[i % n]);
                exact::Bounds::around(points).map(|bounds| Block { segments, bounds })
            })
            .collect();
        ring
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.kind, RingKind::Areal { .. })
    }

    pub fn num_segments(&self) -> usize {
        if self.is_closed() {
            self.points.len()
        } else {
            self.points.len().saturating_sub(1)
        }
    }

    pub fn segment_id(&self, segment: usize) -> SegmentId {
        SegmentId::new(self.id.source, self.id.multi, self.id.ring, segment)
    }

    /// The `i`th point, wrapping around for closed rings.
    pub fn point(&self, i: usize) -> &Point<F> {
        &self.points[i % self.points.len()]
    }

    pub fn segment(&self, i: usize) -> Segment<F> {
        Segment::new(self.point(i).clone(), self.point(i + 1).clone())
    }

    pub fn exact_segment(&self, i: usize) -> exact::Segment {
        let n = self.exact.len();
        exact::Segment::new(self.exact[i % n].clone(), self.exact[(i + 1) % n].clone())
    }

    /// The point before the start of segment `i`, if there is one.
    pub fn prev_point(&self, i: usize) -> Option<&Point<F>> {
        if i > 0 {
            Some(&self.points[i - 1])
        } else if self.is_closed() {
            self.points.last()
        } else {
            None
        }
    }

    /// The index of the segment after `i`, if there is one.
    pub fn next_segment(&self, i: usize) -> Option<usize> {
        if i + 1 < self.num_segments() {
            Some(i + 1)
        } else if self.is_closed() {
            Some(0)
        } else {
            None
        }
    }

    pub fn exact_segments(&self) -> impl Iterator<Item = exact::Segment> + '_ {
        (0..self.num_segments()).map(|i| self.exact_segment(i))
    }

    /// The position of a point at `fraction` along segment `segment`.
    ///
    /// The end of one segment is the start of the next, so this is normalized
    /// to make equal points have equal positions.
    pub fn position(&self, segment: usize, fraction: &SegmentRatio<F>) -> RingPosition {
        if fraction.is_one() {
            if let Some(next) = self.next_segment(segment) {
                return RingPosition {
                    segment: next,
                    fraction: Rational::from(0),
                };
            }
        }
        RingPosition {
            segment,
            fraction: fraction.to_exact(),
        }
    }
}

/// A position along a ring: a segment, and an exact fraction along it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RingPosition {
    pub segment: usize,
    pub fraction: Rational,
}

impl RingPosition {
    pub fn start() -> Self {
        RingPosition {
            segment: 0,
            fraction: Rational::from(0),
        }
    }

    /// Is this position at the start of its segment?
    pub fn is_vertex(&self) -> bool {
        self.fraction == 0
    }
}

/// The rings of a polygon, as a range of indices into the ring arena.
///
/// The first ring in the range is the exterior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolygonRings {
    pub source: usize,
    pub multi: usize,
    pub rings: Range<usize>,
}

impl PolygonRings {
    pub fn exterior(&self) -> RingIdx {
        RingIdx(self.rings.start)
    }

    pub fn interiors(&self) -> impl Iterator<Item = RingIdx> {
        (self.rings.start + 1..self.rings.end).map(RingIdx)
    }
}

/// The arena of prepared rings.
///
/// Rings are stored in `(source, multi, ring)` order, so they can be looked
/// up by their id.
#[derive(Clone, Debug)]
pub struct Rings<F: Float> {
    rings: Vec<PreparedRing<F>>,
    polygons: Vec<PolygonRings>,
}

impl<F: Float> Default for Rings<F> {
    fn default() -> Self {
        Self {
            rings: Vec::new(),
            polygons: Vec::new(),
        }
    }
}

impl<F: Float> Rings<F> {
    pub fn get(&self, idx: RingIdx) -> &PreparedRing<F> {
        &self.rings[idx.0]
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RingIdx, &PreparedRing<F>)> + '_ {
        self.rings.iter().enumerate().map(|(i, r)| (RingIdx(i), r))
    }

    pub fn polygons(&self) -> &[PolygonRings] {
        &self.polygons
    }

    pub fn find(&self, id: RingId) -> Option<RingIdx> {
        self.rings
            .binary_search_by(|r| r.id.cmp(&id))
            .ok()
            .map(RingIdx)
    }

    /// Panics if the segment doesn't belong to this arena.
    pub fn ring_of(&self, seg: SegmentId) -> RingIdx {
        self.find(seg.into())
            .unwrap_or_else(|| panic!("unknown segment {seg:?}"))
    }

    /// The largest absolute coordinate.
    pub fn magnitude(&self) -> F {
        let mut max = F::from_f32(0.0);
        for r in &self.rings {
            for c in [&r.bbox.min_x, &r.bbox.max_x, &r.bbox.min_y, &r.bbox.max_y] {
                let c = c.clone().abs();
                if c > max {
                    max = c;
                }
            }
        }
        max
    }

    fn push(&mut self, ring: PreparedRing<F>) {
        debug_assert!(self.rings.last().map_or(true, |last| last.id < ring.id));
        self.rings.push(ring);
    }

    /// Adds the rings of a multi-polygon.
    ///
    /// Duplicate points are removed, and optionally spikes. Rings with fewer than
    /// three points left are dropped, and a polygon whose exterior is dropped is
    /// dropped entirely.
    pub fn add_areal(&mut self, source: usize, mp: &MultiPolygon<F>, remove_spikes: bool) {
        for (multi, poly) in mp.iter().enumerate() {
            let Some(exterior) = prepare_ring(&poly.exterior, remove_spikes) else {
                log::debug!("dropping degenerate polygon {source}.{multi}");
                continue;
            };
            let start = self.rings.len();
            let id = RingId {
                source,
                multi,
                ring: 0,
            };
            // The interior of a polygon is on the right of a clockwise exterior,
            // and on the right of a counter-clockwise hole.
            let cw = double_area(&exterior) < F::from_f32(0.0);
            self.push(PreparedRing::new(
                id,
                RingKind::Areal {
                    interior_on_right: cw,
                },
                exterior,
            ));
            for (k, hole) in poly.interiors.iter().enumerate() {
                let Some(hole) = prepare_ring(hole, remove_spikes) else {
                    log::debug!("dropping degenerate hole {source}.{multi}.{}", k + 1);
                    continue;
                };
                let ccw = double_area(&hole) > F::from_f32(0.0);
                self.push(PreparedRing::new(
                    RingId { ring: k + 1, ..id },
                    RingKind::Areal {
                        interior_on_right: ccw,
                    },
                    hole,
                ));
            }
            self.polygons.push(PolygonRings {
                source,
                multi,
                rings: start..self.rings.len(),
            });
        }
    }

    /// Adds the linestrings of a multi-linestring, removing duplicate points.
    pub fn add_linear(&mut self, source: usize, lines: &MultiLinestring<F>) {
        for (multi, line) in lines.0.iter().enumerate() {
            let mut points = line.points.clone();
            points.dedup();
            if points.len() < 2 {
                log::debug!("dropping degenerate linestring {source}.{multi}");
                continue;
            }
            self.push(PreparedRing::new(
                RingId {
                    source,
                    multi,
                    ring: 0,
                },
                RingKind::Linear,
                points,
            ));
        }
    }
}

/// Removes duplicate points (cyclically) and, if asked, spikes.
fn prepare_ring<F: Float>(ring: &Ring<F>, remove_spikes: bool) -> Option<Vec<Point<F>>> {
    let mut points = ring.open_points().to_vec();
    dedup_cyclic(&mut points);
    if remove_spikes {
        remove_ring_spikes(&mut points);
    }
    (points.len() >= 3).then_some(points)
}

fn dedup_cyclic<T: PartialEq>(points: &mut Vec<T>) {
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
}

/// Is `b` the tip of a spike, going from `a` to `b` and straight back towards `a`?
fn is_spike<F: Float>(a: &Point<F>, b: &Point<F>, c: &Point<F>) -> bool {
    F::orient(a, b, c) == Ordering::Equal && (a - b).dot(&(c - b)) > F::from_f32(0.0)
}

fn remove_ring_spikes<F: Float>(points: &mut Vec<Point<F>>) {
    let mut changed = true;
    while changed && points.len() >= 3 {
        changed = false;
        let mut i = 0;
        while i < points.len() && points.len() >= 3 {
            let n = points.len();
            let prev = &points[(i + n - 1) % n];
            let next = &points[(i + 1) % n];
            if is_spike(prev, &points[i], next) {
                points.remove(i);
                dedup_cyclic(points);
                changed = true;
            } else {
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ordered_float::NotNan;

    use super::*;
    use crate::geometry::{Linestring, Polygon};

    type F = NotNan<f64>;

    fn p(x: f32, y: f32) -> Point<F> {
        Point::new(x, y)
    }

    #[test]
    fn duplicates_are_removed() {
        let ring = Ring::from_coords(&[
            (0.0, 0.0),
            (0.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (1.0, 0.0),
            (0.0, 0.0),
        ]);
        let points = prepare_ring::<F>(&ring, false).unwrap();
        assert_eq!(points, vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)]);
    }

    #[test]
    fn spikes_are_removed() {
        // A square with a spike sticking out of its top.
        let ring = Ring::from_coords(&[
            (0.0, 0.0),
            (0.0, 2.0),
            (1.0, 2.0),
            (1.0, 5.0),
            (1.0, 2.0),
            (2.0, 2.0),
            (2.0, 0.0),
        ]);
        let points = prepare_ring::<F>(&ring, true).unwrap();
        assert_eq!(
            points,
            vec![p(0.0, 0.0), p(0.0, 2.0), p(1.0, 2.0), p(2.0, 2.0), p(2.0, 0.0)]
        );

        // Nothing but a spike.
        let ring = Ring::from_coords(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert!(prepare_ring::<F>(&ring, true).is_none());
    }

    #[test]
    fn lookup_and_orientation() {
        let mut rings = Rings::<F>::default();
        let square = Polygon::from_coords(
            &[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)],
            &[&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)]],
        );
        rings.add_areal(0, &MultiPolygon(vec![square.clone()]), true);
        rings.add_areal(1, &MultiPolygon(vec![square.reversed()]), true);
        rings.add_linear(2, &MultiLinestring(vec![Linestring::from_coords(&[(0.0, 0.0), (5.0, 5.0)])]));

        assert_eq!(rings.len(), 5);
        assert_eq!(rings.polygons().len(), 2);

        let hole = rings
            .find(RingId {
                source: 0,
                multi: 0,
                ring: 1,
            })
            .unwrap();
        assert_eq!(hole, RingIdx(1));
        assert_eq!(
            rings.get(hole).kind,
            RingKind::Areal {
                interior_on_right: true
            }
        );
        // Reversing the polygon flips the side its interior is on.
        assert_eq!(
            rings.get(RingIdx(2)).kind,
            RingKind::Areal {
                interior_on_right: false
            }
        );

        let line = rings.get(RingIdx(4));
        assert_eq!(line.num_segments(), 1);
        assert_eq!(line.prev_point(0), None);
        assert_eq!(rings.get(RingIdx(0)).prev_point(0), Some(&p(4.0, 0.0)));
        assert_eq!(rings.magnitude().into_inner(), 5.0);
    }
}
