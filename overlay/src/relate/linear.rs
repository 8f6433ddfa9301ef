//! Cutting rings and linestrings at their turns, and walking along the pieces.

use std::collections::{HashMap, HashSet};

use crate::{
    enrich::{walk_ring, SubRange},
    exact,
    geom::Point,
    num::Float,
    segments::{PreparedRing, RingIdx, RingPosition},
    winding::{sample_parameters, Location},
};

use super::matrix::{Accumulator, Dimension};

/// A stretch of a ring or linestring between two consecutive turn positions.
#[derive(Clone, Debug)]
pub struct RingPiece<F: Float> {
    pub ring: RingIdx,
    pub from: RingPosition,
    pub to: RingPosition,
    pub ranges: Vec<SubRange>,
    /// A point in the relative interior of the piece.
    pub sample: exact::Point,
    pub points: Vec<Point<F>>,
}

/// The point at a position, using the given turn points where there are some.
fn point_at<F: Float>(
    ring: &PreparedRing<F>,
    pos: &RingPosition,
    turn_points: &HashMap<RingPosition, Point<F>>,
) -> Point<F> {
    if let Some(p) = turn_points.get(pos) {
        return p.clone();
    }
    if pos.is_vertex() {
        ring.point(pos.segment).clone()
    } else {
        // Only the end of a linestring gets here without a turn.
        ring.point(pos.segment + 1).clone()
    }
}

/// Cuts a ring at the given positions.
///
/// Linestrings are also cut at their ends. A closed ring without positions
/// is a single piece going all the way around. Pieces with no interior point
/// other than the ones in `avoid` are dropped.
pub fn split_ring<F: Float>(
    ring_idx: RingIdx,
    ring: &PreparedRing<F>,
    turn_points: &HashMap<RingPosition, Point<F>>,
    avoid: &HashSet<exact::Point>,
) -> Vec<RingPiece<F>> {
    let mut positions: Vec<RingPosition> = turn_points.keys().cloned().collect();
    let closed = ring.is_closed();
    if !closed {
        let n = ring.num_segments();
        positions.push(RingPosition::start());
        positions.push(RingPosition {
            segment: n - 1,
            fraction: malachite::Rational::from(1),
        });
    }
    positions.sort();
    positions.dedup();

    let mut bounds: Vec<(RingPosition, RingPosition)> =
        positions.windows(2).map(|w| (w[0].clone(), w[1].clone())).collect();
    if closed {
        match (positions.first(), positions.last()) {
            (Some(first), Some(last)) => bounds.push((last.clone(), first.clone())),
            _ => bounds.push((RingPosition::start(), RingPosition::start())),
        }
    }

    let mut ret = Vec::with_capacity(bounds.len());
    for (from, to) in bounds {
        let (ranges, vertices) = walk_ring(ring, &from, &to);
        let Some(sample) = sample_piece(ring, &ranges, avoid) else {
            log::debug!("no sample point between {from:?} and {to:?} on {ring_idx:?}");
            continue;
        };
        let mut points = vec![point_at(ring, &from, turn_points)];
        points.extend(vertices.iter().map(|&v| ring.point(v).clone()));
        points.push(point_at(ring, &to, turn_points));
        points.dedup();
        ret.push(RingPiece {
            ring: ring_idx,
            from,
            to,
            ranges,
            sample,
            points,
        });
    }
    ret
}

fn sample_piece<F: Float>(
    ring: &PreparedRing<F>,
    ranges: &[SubRange],
    avoid: &HashSet<exact::Point>,
) -> Option<exact::Point> {
    for range in ranges {
        let seg = ring.exact_segment(range.segment);
        for t in sample_parameters() {
            let p = seg.at(&(&range.from + (&range.to - &range.from) * t));
            if !avoid.contains(&p) {
                return Some(p);
            }
        }
    }
    None
}

/// Where a linestring is, relative to the other geometry, as we walk along it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WalkState {
    #[default]
    Outside,
    Entered,
    Exited,
}

/// Follows a linestring through the other geometry, piece by piece, filling
/// in the rows of the matrix for the linestring's interior and boundary.
#[derive(Clone, Debug)]
pub struct LinearWalker {
    /// The input the linestring belongs to.
    source: usize,
    pub state: WalkState,
    /// How many times the linestring entered the interior.
    pub entries: usize,
}

impl LinearWalker {
    pub fn new(source: usize) -> Self {
        LinearWalker {
            source,
            state: WalkState::default(),
            entries: 0,
        }
    }

    fn update(&self, acc: &mut Accumulator, own: Location, other: Location, dim: Dimension) {
        if self.source == 0 {
            acc.update(own, other, dim);
        } else {
            acc.update(other, own, dim);
        }
    }

    /// Moves onto the next piece, which is at `location` relative to the other geometry.
    pub fn step(&mut self, location: Location, acc: &mut Accumulator) {
        self.update(acc, Location::Interior, location, Dimension::Curve);
        match location {
            Location::Interior => {
                if self.state != WalkState::Entered {
                    self.entries += 1;
                }
                self.state = WalkState::Entered;
            }
            Location::Exterior => {
                if self.state == WalkState::Entered {
                    self.state = WalkState::Exited;
                }
            }
            Location::Boundary => {}
        }
    }

    /// Records the two ends of the linestring, once all the pieces are done.
    ///
    /// Each end comes with its location relative to the linestring's own
    /// input, and relative to the other one. Ends that aren't on the boundary
    /// (because some other linestring ends there too) are interior points,
    /// and those are left to the caller.
    pub fn finish(&self, ends: [(Location, Location); 2], acc: &mut Accumulator) {
        for (own, other) in ends {
            if own == Location::Boundary {
                self.update(acc, own, other, Dimension::Point);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ordered_float::NotNan;

    use super::*;
    use crate::{
        geometry::{Linestring, MultiLinestring, MultiPolygon, Polygon},
        segments::Rings,
    };

    type F = NotNan<f64>;

    fn pos(segment: usize, num: i32, den: i32) -> RingPosition {
        RingPosition {
            segment,
            fraction: malachite::Rational::from(num) / malachite::Rational::from(den),
        }
    }

    #[test]
    fn linestring_pieces() {
        let mut rings = Rings::<F>::default();
        let line = Linestring::from_coords(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)]);
        rings.add_linear(0, &MultiLinestring(vec![line]));
        let ring = rings.get(RingIdx(0));

        let mut turns = HashMap::new();
        turns.insert(pos(0, 1, 2), Point::from_f64(2.0, 0.0));
        let pieces = split_ring(RingIdx(0), ring, &turns, &HashSet::new());
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].points, vec![Point::from_f64(0.0, 0.0), Point::from_f64(2.0, 0.0)]);
        assert_eq!(
            pieces[1].points,
            vec![Point::from_f64(2.0, 0.0), Point::from_f64(4.0, 0.0), Point::from_f64(4.0, 4.0)]
        );
        assert_eq!(pieces[0].sample, exact::Point::new(1.0, 0.0));
    }

    #[test]
    fn untouched_ring_is_one_piece() {
        let mut rings = Rings::<F>::default();
        let square = Polygon::from_coords(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)], &[]);
        rings.add_areal(0, &MultiPolygon(vec![square]), true);
        let ring = rings.get(RingIdx(0));

        // The usual sample point is avoided.
        let avoid: HashSet<_> = [exact::Point::new(0.0, 1.0)].into_iter().collect();
        let pieces = split_ring(RingIdx(0), ring, &HashMap::new(), &avoid);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].ranges.len(), 4);
        assert_eq!(pieces[0].points.len(), 5);
        assert_ne!(pieces[0].sample, exact::Point::new(0.0, 1.0));
    }

    #[test]
    fn walker_states() {
        let mut acc = Accumulator::new(None);
        let mut walker = LinearWalker::new(0);
        walker.step(Location::Exterior, &mut acc);
        assert_eq!(walker.state, WalkState::Outside);
        walker.step(Location::Interior, &mut acc);
        walker.step(Location::Boundary, &mut acc);
        walker.step(Location::Exterior, &mut acc);
        assert_eq!(walker.state, WalkState::Exited);
        walker.step(Location::Interior, &mut acc);
        assert_eq!(walker.entries, 2);
        assert_eq!(acc.matrix.to_string(), "111FFFFFF");
    }

    #[test]
    fn walker_records_boundary_ends() {
        // A linestring from the second input, starting inside the first
        // geometry and ending at a point that some other linestring also ends at.
        let mut acc = Accumulator::new(None);
        let mut walker = LinearWalker::new(1);
        walker.step(Location::Interior, &mut acc);
        walker.finish(
            [
                (Location::Boundary, Location::Interior),
                (Location::Interior, Location::Exterior),
            ],
            &mut acc,
        );
        assert_eq!(acc.matrix.get(Location::Interior, Location::Interior), Dimension::Curve);
        assert_eq!(acc.matrix.get(Location::Interior, Location::Boundary), Dimension::Point);
        assert_eq!(acc.matrix.get(Location::Exterior, Location::Interior), Dimension::Empty);
    }
}
