//! Exact winding numbers and point location.
//!
//! Everything here is done in rational arithmetic, so that all the decisions
//! about which side of which ring a point is on agree with each other.

use std::cmp::Ordering;

use malachite::Rational;

use crate::{
    exact::{self, orient},
    num::Float,
    segments::{PolygonRings, RingKind, Rings},
};

/// Where a point is relative to a geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Location {
    Interior,
    Boundary,
    Exterior,
}

/// The contribution of the segment `a -> b` to the winding number at `p`,
/// counting crossings of the ray from `p` in the positive x direction.
fn crossing(a: &exact::Point, b: &exact::Point, p: &exact::Point) -> i32 {
    if a.y <= p.y {
        if b.y > p.y && orient(a, b, p) == Ordering::Greater {
            return 1;
        }
    } else if b.y <= p.y && orient(a, b, p) == Ordering::Less {
        return -1;
    }
    0
}

/// The winding number of a closed ring around `p`, which must not be on the ring.
///
/// Counter-clockwise rings wind positively.
pub fn ring_winding(points: &[exact::Point], p: &exact::Point) -> i32 {
    let n = points.len();
    (0..n)
        .map(|i| crossing(&points[i], &points[(i + 1) % n], p))
        .sum()
}

/// Locates `p` relative to the area enclosed by a single ring.
pub fn locate_in_ring(points: &[exact::Point], p: &exact::Point) -> Location {
    let n = points.len();
    let on_ring = (0..n).any(|i| {
        exact::Segment::new(points[i].clone(), points[(i + 1) % n].clone()).contains(p)
    });
    if on_ring {
        Location::Boundary
    } else if ring_winding(points, p) != 0 {
        Location::Interior
    } else {
        Location::Exterior
    }
}

/// The winding numbers of every areal ring, on both sides of a short piece of
/// some ring's segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideWindings {
    pub left: Vec<i32>,
    pub right: Vec<i32>,
}

/// Computes the winding numbers just to the left and just to the right of
/// `sample`, a point in the interior of `segment`.
///
/// Segments passing through the sample are left out of the ray cast, and
/// account for the difference between the two sides. They must all be
/// collinear with `segment`; if any other segment (or any vertex) touches the
/// sample, this returns `None` and a different sample is needed.
pub fn side_windings<F: Float>(
    rings: &Rings<F>,
    segment: &exact::Segment,
    sample: &exact::Point,
) -> Option<SideWindings> {
    // Cast the ray across the segment, not along it.
    let horizontal = segment.start.y == segment.end.y;
    let frame = |p: &exact::Point| if horizontal { p.rotated() } else { p.clone() };
    let seg = if horizontal {
        segment.rotated()
    } else {
        segment.clone()
    };
    let p = frame(sample);
    let upward = seg.end.y > seg.start.y;

    let mut east = vec![0; rings.len()];
    let mut west = vec![0; rings.len()];
    for (idx, ring) in rings.iter() {
        if !ring.is_closed() {
            continue;
        }
        let n = ring.exact.len();
        let mut winding = 0;
        let mut through = 0;
        // In the rotated frame the ray heads east, which is north in the real one.
        let blocks = ring.blocks.iter().filter(|b| b.bounds.meets_ray(sample, horizontal));
        for i in blocks.flat_map(|b| b.segments.clone()) {
            let a = frame(&ring.exact[i]);
            let b = frame(&ring.exact[(i + 1) % n]);
            if exact::Segment::new(a.clone(), b.clone()).contains(&p) {
                let collinear = orient(&seg.start, &seg.end, &a) == Ordering::Equal
                    && orient(&seg.start, &seg.end, &b) == Ordering::Equal;
                if !collinear || a == p || b == p {
                    return None;
                }
                through += if b.y > a.y { 1 } else { -1 };
            } else {
                winding += crossing(&a, &b, &p);
            }
        }
        east[idx.0] = winding;
        west[idx.0] = winding + through;
    }

    // Heading up the ray frame, east is on the right.
    Some(if upward {
        SideWindings {
            left: west,
            right: east,
        }
    } else {
        SideWindings {
            left: east,
            right: west,
        }
    })
}

/// Does a polygon cover a point, given the winding numbers of all rings there?
///
/// A point is covered if it's inside the exterior or inside a hole, but not both.
pub fn polygon_covers(poly: &PolygonRings, windings: &[i32]) -> bool {
    let in_exterior = windings[poly.exterior().0] != 0;
    let in_hole = poly.interiors().any(|r| windings[r.0] != 0);
    in_exterior != in_hole
}

/// The number of polygons of each source covering a point.
pub fn coverage<F: Float>(rings: &Rings<F>, windings: &[i32]) -> [usize; 2] {
    let mut ret = [0; 2];
    for poly in rings.polygons() {
        if poly.source < 2 && polygon_covers(poly, windings) {
            ret[poly.source] += 1;
        }
    }
    ret
}

/// Locates an exact point relative to the areal rings of one source.
pub fn locate_areal<F: Float>(rings: &Rings<F>, source: usize, p: &exact::Point) -> Location {
    let on_boundary = rings.iter().any(|(_, ring)| {
        ring.id.source == source
            && matches!(ring.kind, RingKind::Areal { .. })
            && ring.exact_segments().any(|s| s.contains(p))
    });
    if on_boundary {
        return Location::Boundary;
    }
    let mut windings = vec![0; rings.len()];
    for (idx, ring) in rings.iter() {
        if ring.id.source == source && ring.is_closed() {
            windings[idx.0] = ring_winding(&ring.exact, p);
        }
    }
    let covered = rings
        .polygons()
        .iter()
        .any(|poly| poly.source == source && polygon_covers(poly, &windings));
    if covered {
        Location::Interior
    } else {
        Location::Exterior
    }
}

/// The parameters at which we try to sample a piece of segment, in order.
pub fn sample_parameters() -> impl Iterator<Item = Rational> {
    [(1, 2), (1, 3), (2, 3), (1, 4), (3, 4), (1, 5), (4, 5), (1, 7), (6, 7)]
        .into_iter()
        .map(|(n, d)| Rational::from(n) / Rational::from(d))
}

#[cfg(test)]
mod tests {
    use ordered_float::NotNan;

    use super::*;
    use crate::geometry::{MultiPolygon, Polygon};

    type F = NotNan<f64>;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<F> {
        Polygon::from_coords(&[(x0, y0), (x0, y1), (x1, y1), (x1, y0)], &[])
    }

    fn pt(x: f64, y: f64) -> exact::Point {
        exact::Point::new(x, y)
    }

    #[test]
    fn winding_signs() {
        let cw = vec![pt(0.0, 0.0), pt(0.0, 2.0), pt(2.0, 2.0), pt(2.0, 0.0)];
        let mut ccw = cw.clone();
        ccw.reverse();
        assert_eq!(ring_winding(&cw, &pt(1.0, 1.0)), -1);
        assert_eq!(ring_winding(&ccw, &pt(1.0, 1.0)), 1);
        assert_eq!(ring_winding(&ccw, &pt(3.0, 1.0)), 0);
        // On the line through a vertex.
        assert_eq!(ring_winding(&ccw, &pt(-1.0, 2.0)), 0);
        assert_eq!(locate_in_ring(&cw, &pt(0.0, 1.0)), Location::Boundary);
        assert_eq!(locate_in_ring(&cw, &pt(1.0, 1.0)), Location::Interior);
    }

    #[test]
    fn sides_of_a_shared_edge() {
        let mut rings = Rings::<F>::default();
        rings.add_areal(0, &MultiPolygon(vec![square(0.0, 0.0, 2.0, 2.0)]), true);
        rings.add_areal(1, &MultiPolygon(vec![square(2.0, 0.0, 4.0, 2.0)]), true);

        // The right edge of the first square, heading down.
        let seg = exact::Segment::new(pt(2.0, 2.0), pt(2.0, 0.0));
        let w = side_windings(&rings, &seg, &pt(2.0, 1.0)).unwrap();
        // Heading down, the first square is on the right.
        assert_eq!(w.right, vec![-1, 0]);
        assert_eq!(w.left, vec![0, -1]);
        assert_eq!(coverage(&rings, &w.right), [1, 0]);
        assert_eq!(coverage(&rings, &w.left), [0, 1]);

        // The top edge, heading right: a horizontal segment.
        let seg = exact::Segment::new(pt(0.0, 2.0), pt(2.0, 2.0));
        let w = side_windings(&rings, &seg, &pt(1.0, 2.0)).unwrap();
        assert_eq!(w.right, vec![-1, 0]);
        assert_eq!(w.left, vec![0, 0]);

        // A sample on a vertex of the other square is rejected.
        assert!(side_windings(&rings, &exact::Segment::new(pt(2.0, 2.0), pt(2.0, 0.0)), &pt(2.0, 0.0)).is_none());
    }

    #[test]
    fn holes_and_overlaps() {
        let mut rings = Rings::<F>::default();
        let with_hole = Polygon::from_coords(
            &[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)],
            &[&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]],
        );
        rings.add_areal(0, &MultiPolygon(vec![with_hole, square(2.0, 2.0, 6.0, 6.0)]), true);

        assert_eq!(locate_areal(&rings, 0, &pt(0.5, 0.5)), Location::Interior);
        assert_eq!(locate_areal(&rings, 0, &pt(1.5, 1.5)), Location::Exterior);
        // In the hole, but covered by the second polygon.
        assert_eq!(locate_areal(&rings, 0, &pt(2.5, 2.5)), Location::Interior);
        assert_eq!(locate_areal(&rings, 0, &pt(1.0, 2.0)), Location::Boundary);
        assert_eq!(locate_areal(&rings, 1, &pt(0.5, 0.5)), Location::Exterior);

        assert_eq!(coverage(&rings, &windings(&rings, &pt(2.5, 2.5))), [1, 0]);
        assert_eq!(coverage(&rings, &windings(&rings, &pt(3.5, 3.5))), [2, 0]);
    }

    fn windings(rings: &Rings<F>, p: &exact::Point) -> Vec<i32> {
        rings
            .iter()
            .map(|(_, ring)| if ring.is_closed() { ring_winding(&ring.exact, p) } else { 0 })
            .collect()
    }

    #[test]
    fn side_windings_agree_with_nearby_points() {
        // A long zigzag, so that most blocks are missed by any given ray,
        // crossed by a box.
        let mut zigzag: Vec<(f64, f64)> =
            (0..=100).map(|i| (i as f64, if i % 2 == 0 { 2.0 } else { 4.0 })).collect();
        zigzag.extend([(100.0, 0.0), (0.0, 0.0)]);
        let mut rings = Rings::<F>::default();
        rings.add_areal(0, &MultiPolygon(vec![Polygon::from_coords(&zigzag, &[])]), true);
        rings.add_areal(1, &MultiPolygon(vec![square(10.25, 1.25, 50.25, 3.75)]), true);
        assert!(rings.get(crate::segments::RingIdx(0)).blocks.len() > 5);

        let eps = Rational::from(1) / Rational::from(1024);
        let mut checked = 0;
        for (_, ring) in rings.iter() {
            for seg in ring.exact_segments() {
                let mid = seg.at(&(Rational::from(1) / Rational::from(2)));
                let Some(w) = side_windings(&rings, &seg, &mid) else {
                    continue;
                };
                let d = seg.direction();
                let (dx, dy) = (&eps * &d.x, &eps * &d.y);
                let left = exact::Point {
                    x: &mid.x - &dy,
                    y: &mid.y + &dx,
                };
                let right = exact::Point {
                    x: &mid.x + &dy,
                    y: &mid.y - &dx,
                };
                assert_eq!(w.left, windings(&rings, &left), "left of {seg:?}");
                assert_eq!(w.right, windings(&rings, &right), "right of {seg:?}");
                checked += 1;
            }
        }
        assert!(checked >= 100);
    }
}
