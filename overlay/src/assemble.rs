//! Turning loose rings into polygons.

use crate::{
    config::Orientation,
    enrich::{sample_coverage, whole_ring},
    exact,
    geom::{double_area, BoundingBox, Point},
    geometry::{MultiPolygon, Polygon, Ring},
    num::Float,
    segments::{RingIdx, Rings},
    traverse::{RingOrigin, TraversedRing},
    winding::{locate_in_ring, Location},
    OverlayKind,
};

/// Decides what to do with the input rings that have no turns on them.
///
/// Such a ring is either entirely on the boundary of the result or entirely
/// off it, so a single sample is enough.
pub fn select_untouched<F: Float>(
    rings: &Rings<F>,
    untouched: &[RingIdx],
    kind: OverlayKind,
) -> Vec<TraversedRing<F>> {
    let mut ret = Vec::new();
    for &idx in untouched {
        let ring = rings.get(idx);
        let Some((left, right)) = sample_coverage(rings, ring, &whole_ring(ring)) else {
            log::warn!("couldn't sample untouched ring {idx:?}, dropping it");
            continue;
        };
        let (left, right) = (kind.includes(left), kind.includes(right));
        if left == right {
            continue;
        }
        let mut points = ring.points.clone();
        if left {
            points.reverse();
        }
        ret.push(TraversedRing {
            points,
            origin: RingOrigin::Original(ring.segment_id(0)),
        });
    }
    ret
}

struct Candidate<F: Float> {
    points: Vec<Point<F>>,
    exact: Vec<exact::Point>,
    bbox: BoundingBox<F>,
    area: F,
}

/// Finds a point strictly inside or strictly outside `outer`, from among the
/// vertices and edge midpoints of `inner`, and reports which it is.
fn locate_ring(outer: &[exact::Point], inner: &[exact::Point]) -> Location {
    let half = malachite::Rational::from(1) / malachite::Rational::from(2);
    let n = inner.len();
    let midpoints = (0..n).map(|i| inner[i].affine(&inner[(i + 1) % n], &half));
    for p in inner.iter().cloned().chain(midpoints) {
        match locate_in_ring(outer, &p) {
            Location::Boundary => continue,
            loc => return loc,
        }
    }
    Location::Boundary
}

/// Nests rings into polygons.
///
/// Rings with the result on their right (clockwise ones) are exteriors, and
/// the rest are holes. Each hole goes into the smallest exterior containing it.
/// Rings enclosing no more than `min_area` are dropped.
pub fn assemble<F: Float>(
    candidates: Vec<TraversedRing<F>>,
    orientation: Orientation,
    min_area: &F,
) -> MultiPolygon<F> {
    let zero = F::from_f32(0.0);
    let min_double_area = min_area.clone() + min_area;
    let mut exteriors = Vec::new();
    let mut holes = Vec::new();
    for ring in candidates {
        if ring.points.len() < 3 {
            log::debug!("dropping ring {:?} with {} points", ring.origin, ring.points.len());
            continue;
        }
        let area = double_area(&ring.points);
        if area == zero || area.clone().abs() <= min_double_area {
            log::debug!("dropping ring {:?} with double area {area:?}", ring.origin);
            continue;
        }
        let candidate = Candidate {
            exact: ring.points.iter().map(exact::Point::from_point).collect(),
            bbox: BoundingBox::from_points(&ring.points),
            points: ring.points,
            area: area.clone().abs(),
        };
        if area < zero {
            exteriors.push(candidate);
        } else {
            holes.push(candidate);
        }
    }

    let mut interiors: Vec<Vec<Ring<F>>> = vec![Vec::new(); exteriors.len()];
    for hole in holes {
        let parent = exteriors
            .iter()
            .enumerate()
            .filter(|(_, ext)| ext.bbox.contains(&hole.bbox) && ext.area > hole.area)
            .filter(|(_, ext)| locate_ring(&ext.exact, &hole.exact) == Location::Interior)
            .min_by(|(_, a), (_, b)| a.area.cmp(&b.area))
            .map(|(i, _)| i);
        match parent {
            Some(i) => interiors[i].push(Ring::new(hole.points).close()),
            None => log::warn!("dropping a hole with no exterior around it"),
        }
    }

    let polygons = exteriors
        .into_iter()
        .zip(interiors)
        .map(|(ext, holes)| Polygon::new(Ring::new(ext.points).close(), holes));
    let mp = MultiPolygon(polygons.collect());
    match orientation {
        Orientation::Clockwise => mp,
        Orientation::CounterClockwise => mp.reversed(),
    }
}

#[cfg(test)]
mod tests {
    use ordered_float::NotNan;

    use super::*;

    type F = NotNan<f64>;

    fn zero() -> F {
        F::from_f32(0.0)
    }

    fn ring(coords: &[(f64, f64)], n: usize) -> TraversedRing<F> {
        TraversedRing {
            points: coords.iter().map(|&(x, y)| Point::from_f64(x, y)).collect(),
            origin: RingOrigin::Traversed(n),
        }
    }

    #[test]
    fn holes_go_in_the_smallest_exterior() {
        let big = ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)], 0);
        let hole = ring(&[(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)], 1);
        let island = ring(&[(2.0, 2.0), (2.0, 8.0), (8.0, 8.0), (8.0, 2.0)], 2);
        let inner_hole = ring(&[(3.0, 3.0), (4.0, 3.0), (4.0, 4.0), (3.0, 4.0)], 3);

        let mp = assemble(vec![big, hole, island, inner_hole], Orientation::Clockwise, &zero());
        assert_eq!(mp.len(), 2);
        assert_eq!(mp.0[0].interiors.len(), 1);
        assert_eq!(mp.0[1].interiors.len(), 1);
        assert_eq!(mp.0[1].interiors[0].points[0], Point::from_f64(3.0, 3.0));
        assert_eq!(mp.area().into_inner(), 100.0 - 64.0 + 36.0 - 1.0);
        assert!(mp.0[0].exterior.is_clockwise());
    }

    #[test]
    fn degenerate_and_orphaned_rings_are_dropped() {
        let flat = ring(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)], 0);
        let orphan = ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0)], 1);
        let mp = assemble(vec![flat, orphan], Orientation::Clockwise, &zero());
        assert!(mp.is_empty());
    }

    #[test]
    fn counter_clockwise_output() {
        let square = ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)], 0);
        let mp = assemble(vec![square], Orientation::CounterClockwise, &zero());
        assert!(!mp.0[0].exterior.is_clockwise());
        // Output rings are closed.
        assert_eq!(mp.0[0].exterior.points.len(), 5);
    }

    #[test]
    fn slivers_are_dropped() {
        let square = ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)], 0);
        let sliver = ring(&[(2.0, 0.0), (2.0, 1.0), (2.0 + 1e-12, 0.0)], 1);
        let mp = assemble(vec![square.clone(), sliver.clone()], Orientation::Clockwise, &zero());
        assert_eq!(mp.len(), 2);

        let min_area = F::from_f64(1e-9);
        let mp = assemble(vec![square, sliver], Orientation::Clockwise, &min_area);
        assert_eq!(mp.len(), 1);
        assert_eq!(mp.area().into_inner(), 1.0);
    }
}
