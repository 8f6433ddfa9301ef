//! Intersecting two segments.
//!
//! Every topological decision here (does the segment pair cross, touch at an
//! endpoint, or overlap?) is made with side tests only. The ratios computed
//! afterwards never overrule them: they are clamped to agree.

use std::cmp::Ordering;

use malachite::Rational;

use crate::{
    geom::{Point, Segment},
    num::Float,
    strategy::{Side, Strategy},
};

/// A position along a segment, as a fraction `num / den` with `den > 0`.
///
/// Comparisons between ratios are exact. A ratio is exactly zero or one only
/// when the position coincides with an endpoint.
#[derive(Clone, serde::Serialize)]
pub struct SegmentRatio<F: Float> {
    num: F,
    den: F,
}

impl<F: Float> std::fmt::Debug for SegmentRatio<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}/{:?}", self.num, self.den)
    }
}

impl<F: Float> SegmentRatio<F> {
    pub fn new(num: F, den: F) -> Self {
        let zero = F::from_f32(0.0);
        debug_assert!(den != zero);
        if den < zero {
            SegmentRatio {
                num: -num,
                den: -den,
            }
        } else {
            SegmentRatio { num, den }
        }
    }

    pub fn zero() -> Self {
        SegmentRatio {
            num: F::from_f32(0.0),
            den: F::from_f32(1.0),
        }
    }

    pub fn one() -> Self {
        SegmentRatio {
            num: F::from_f32(1.0),
            den: F::from_f32(1.0),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.num == F::from_f32(0.0)
    }

    pub fn is_one(&self) -> bool {
        self.num == self.den
    }

    /// Is this ratio in `[0, 1]`?
    pub fn on_segment(&self) -> bool {
        self.num >= F::from_f32(0.0) && self.num <= self.den
    }

    /// The (rounded) value of this ratio.
    pub fn value(&self) -> F {
        self.num.clone() / &self.den
    }

    pub fn to_exact(&self) -> Rational {
        self.num.to_exact() / self.den.to_exact()
    }

    /// Clamps into `[0, 1]`.
    fn clamped(self) -> Self {
        if self.num < F::from_f32(0.0) {
            SegmentRatio::zero()
        } else if self.num > self.den {
            SegmentRatio::one()
        } else {
            self
        }
    }
}

impl<F: Float> PartialEq for SegmentRatio<F> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<F: Float> Eq for SegmentRatio<F> {}

impl<F: Float> PartialOrd for SegmentRatio<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: Float> Ord for SegmentRatio<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.den == other.den {
            return self.num.cmp(&other.num);
        }
        let lhs = self.num.to_exact() * other.den.to_exact();
        let rhs = other.num.to_exact() * self.den.to_exact();
        lhs.cmp(&rhs)
    }
}

/// Where on a segment an intersection point lies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum OnSegment {
    Start,
    Interior,
    End,
}

impl OnSegment {
    fn of<F: Float>(ratio: &SegmentRatio<F>) -> OnSegment {
        if ratio.is_zero() {
            OnSegment::Start
        } else if ratio.is_one() {
            OnSegment::End
        } else {
            OnSegment::Interior
        }
    }
}

/// A single point shared by two segments.
#[derive(Clone, Debug)]
pub struct IntersectionPoint<F: Float> {
    pub point: Point<F>,
    pub ra: SegmentRatio<F>,
    pub rb: SegmentRatio<F>,
    pub at_a: OnSegment,
    pub at_b: OnSegment,
}

#[derive(Clone, Debug)]
pub enum SegmentIntersection<F: Float> {
    Disjoint,
    /// One of the segments has zero length.
    Degenerate,
    /// The segments share exactly one point and aren't collinear.
    Single(IntersectionPoint<F>),
    /// The segments lie on the same line and share one point (if they touch
    /// end-to-end) or two (the ends of their overlap), ordered along `a`.
    Collinear {
        points: Vec<IntersectionPoint<F>>,
        opposite: bool,
    },
}

/// The position of `p` along `seg`, measured in the dominant axis of `seg`.
///
/// Only meaningful if `p` is on the line through `seg`.
pub fn ratio_along<F: Float>(seg: &Segment<F>, p: &Point<F>) -> SegmentRatio<F> {
    let dx = seg.end.x.clone() - &seg.start.x;
    let dy = seg.end.y.clone() - &seg.start.y;
    if dx.clone().abs() >= dy.clone().abs() {
        SegmentRatio::new(p.x.clone() - &seg.start.x, dx)
    } else {
        SegmentRatio::new(p.y.clone() - &seg.start.y, dy)
    }
}

fn located<F: Float>(p: &Point<F>, seg: &Segment<F>) -> (SegmentRatio<F>, OnSegment) {
    if *p == seg.start {
        (SegmentRatio::zero(), OnSegment::Start)
    } else if *p == seg.end {
        (SegmentRatio::one(), OnSegment::End)
    } else {
        (ratio_along(seg, p).clamped(), OnSegment::Interior)
    }
}

/// Intersects the segments `a` and `b`.
pub fn segment_intersection<F: Float>(
    strategy: &dyn Strategy<F>,
    a: &Segment<F>,
    b: &Segment<F>,
) -> SegmentIntersection<F> {
    if a.is_degenerate() || b.is_degenerate() {
        return SegmentIntersection::Degenerate;
    }
    if !a.bounding_box().intersects(&b.bounding_box()) {
        return SegmentIntersection::Disjoint;
    }

    let sa1 = strategy.side(&b.start, &b.end, &a.start);
    let sa2 = strategy.side(&b.start, &b.end, &a.end);
    let sb1 = strategy.side(&a.start, &a.end, &b.start);
    let sb2 = strategy.side(&a.start, &a.end, &b.end);

    let same_side = |s: Side, t: Side| s != Side::Collinear && s == t;
    if same_side(sa1, sa2) || same_side(sb1, sb2) {
        return SegmentIntersection::Disjoint;
    }

    if [sa1, sa2, sb1, sb2].iter().all(|s| *s == Side::Collinear) {
        return collinear_intersection(a, b);
    }

    let single = if sa1 == Side::Collinear {
        let (rb, at_b) = located(&a.start, b);
        IntersectionPoint {
            point: a.start.clone(),
            ra: SegmentRatio::zero(),
            rb,
            at_a: OnSegment::Start,
            at_b,
        }
    } else if sa2 == Side::Collinear {
        let (rb, at_b) = located(&a.end, b);
        IntersectionPoint {
            point: a.end.clone(),
            ra: SegmentRatio::one(),
            rb,
            at_a: OnSegment::End,
            at_b,
        }
    } else if sb1 == Side::Collinear {
        IntersectionPoint {
            point: b.start.clone(),
            ra: ratio_along(a, &b.start).clamped(),
            rb: SegmentRatio::zero(),
            at_a: OnSegment::Interior,
            at_b: OnSegment::Start,
        }
    } else if sb2 == Side::Collinear {
        IntersectionPoint {
            point: b.end.clone(),
            ra: ratio_along(a, &b.end).clamped(),
            rb: SegmentRatio::one(),
            at_a: OnSegment::Interior,
            at_b: OnSegment::End,
        }
    } else {
        // A proper crossing. Cramer's rule on a.start + t (a.end - a.start) = b.start + s (b.end - b.start).
        let u = &a.end - &a.start;
        let v = &b.end - &b.start;
        let w = &b.start - &a.start;
        let den = u.cross(&v);
        let ra = SegmentRatio::new(w.cross(&v), den.clone()).clamped();
        let rb = SegmentRatio::new(w.cross(&u), den).clamped();
        IntersectionPoint {
            point: a.start.affine(&a.end, &ra.value()),
            ra,
            rb,
            at_a: OnSegment::Interior,
            at_b: OnSegment::Interior,
        }
    };
    SegmentIntersection::Single(single)
}

fn collinear_intersection<F: Float>(a: &Segment<F>, b: &Segment<F>) -> SegmentIntersection<F> {
    let opposite = (&a.end - &a.start).dot(&(&b.end - &b.start)) < F::from_f32(0.0);

    let mut points: Vec<IntersectionPoint<F>> = Vec::with_capacity(4);
    let mut push = |point: &Point<F>, ra: SegmentRatio<F>, rb: SegmentRatio<F>| {
        if !ra.on_segment() || !rb.on_segment() {
            return;
        }
        if points.iter().any(|ip| ip.point == *point) {
            return;
        }
        points.push(IntersectionPoint {
            point: point.clone(),
            at_a: OnSegment::of(&ra),
            at_b: OnSegment::of(&rb),
            ra,
            rb,
        });
    };

    let exact = |p: &Point<F>, seg: &Segment<F>| {
        if *p == seg.start {
            SegmentRatio::zero()
        } else if *p == seg.end {
            SegmentRatio::one()
        } else {
            ratio_along(seg, p)
        }
    };

    push(&a.start, SegmentRatio::zero(), exact(&a.start, b));
    push(&a.end, SegmentRatio::one(), exact(&a.end, b));
    push(&b.start, exact(&b.start, a), SegmentRatio::zero());
    push(&b.end, exact(&b.end, a), SegmentRatio::one());

    if points.is_empty() {
        return SegmentIntersection::Disjoint;
    }
    points.sort_by(|p, q| p.ra.cmp(&q.ra));
    SegmentIntersection::Collinear { points, opposite }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use ordered_float::NotNan;

    use super::*;
    use crate::strategy::Cartesian;

    type F = NotNan<f64>;

    fn seg(x0: f32, y0: f32, x1: f32, y1: f32) -> Segment<F> {
        Segment::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    fn isect(a: &Segment<F>, b: &Segment<F>) -> SegmentIntersection<F> {
        segment_intersection(&Cartesian, a, b)
    }

    #[test]
    fn crossing() {
        let res = isect(&seg(0.0, 0.0, 2.0, 2.0), &seg(0.0, 2.0, 2.0, 0.0));
        assert_matches!(res, SegmentIntersection::Single(ip) => {
            assert_eq!(ip.point, Point::new(1.0, 1.0));
            assert_eq!(ip.at_a, OnSegment::Interior);
            assert_eq!(ip.at_b, OnSegment::Interior);
            assert_eq!(ip.ra.value().into_inner(), 0.5);
        });
    }

    #[test]
    fn disjoint_and_degenerate() {
        assert_matches!(
            isect(&seg(0.0, 0.0, 1.0, 0.0), &seg(0.0, 1.0, 1.0, 1.0)),
            SegmentIntersection::Disjoint
        );
        // On the same line, but not overlapping.
        assert_matches!(
            isect(&seg(0.0, 0.0, 1.0, 0.0), &seg(2.0, 0.0, 3.0, 0.0)),
            SegmentIntersection::Disjoint
        );
        assert_matches!(
            isect(&seg(0.0, 0.0, 0.0, 0.0), &seg(0.0, 0.0, 1.0, 1.0)),
            SegmentIntersection::Degenerate
        );
    }

    #[test]
    fn touching_endpoint_is_exact() {
        // b starts in the middle of a.
        let res = isect(&seg(0.0, 0.0, 4.0, 0.0), &seg(1.0, 0.0, 1.0, 3.0));
        assert_matches!(res, SegmentIntersection::Single(ip) => {
            assert_eq!(ip.at_a, OnSegment::Interior);
            assert_eq!(ip.at_b, OnSegment::Start);
            assert!(ip.rb.is_zero());
            assert_eq!(ip.ra.value().into_inner(), 0.25);
        });

        // Two segments meeting at a shared vertex.
        let res = isect(&seg(0.0, 0.0, 1.0, 1.0), &seg(1.0, 1.0, 2.0, 0.0));
        assert_matches!(res, SegmentIntersection::Single(ip) => {
            assert_eq!(ip.at_a, OnSegment::End);
            assert_eq!(ip.at_b, OnSegment::Start);
        });
    }

    #[test]
    fn collinear_overlap() {
        let res = isect(&seg(0.0, 0.0, 4.0, 0.0), &seg(6.0, 0.0, 2.0, 0.0));
        assert_matches!(res, SegmentIntersection::Collinear { points, opposite } => {
            assert!(opposite);
            assert_eq!(points.len(), 2);
            assert_eq!(points[0].point, Point::new(2.0, 0.0));
            assert_eq!(points[0].at_b, OnSegment::End);
            assert_eq!(points[1].point, Point::new(4.0, 0.0));
            assert_eq!(points[1].at_a, OnSegment::End);
            assert_eq!(points[1].rb.value().into_inner(), 0.5);
        });

        // Touching end to end.
        let res = isect(&seg(0.0, 0.0, 0.0, 2.0), &seg(0.0, 2.0, 0.0, 5.0));
        assert_matches!(res, SegmentIntersection::Collinear { points, opposite: false } => {
            assert_eq!(points.len(), 1);
            assert_eq!(points[0].at_a, OnSegment::End);
            assert_eq!(points[0].at_b, OnSegment::Start);
        });
    }

    #[test]
    fn ratios_compare_exactly() {
        let third = SegmentRatio::new(F::from_f32(1.0), F::from_f32(3.0));
        let two_sixths = SegmentRatio::new(F::from_f32(-2.0), F::from_f32(-6.0));
        assert_eq!(third, two_sixths);
        assert!(third < SegmentRatio::new(F::from_f32(1.0), F::from_f32(2.0)));
        assert!(SegmentRatio::<F>::zero() < third);
    }
}
