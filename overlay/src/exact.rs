//! Exact geometric primitives, using rational arithmetic.
//!
//! The turn graph is built from floating-point coordinates, but every decision
//! that has to agree with every other decision (which side of a ring a sample
//! point lies on, which way an edge leaves a node) is made here.

use std::cmp::Ordering;

use malachite::Rational;

use crate::num::Float;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub y: Rational,
    pub x: Rational,
}

impl Point {
    // TryInto so that we can use floats (panicking on infinities and nans).
    pub fn new(x: impl TryInto<Rational>, y: impl TryInto<Rational>) -> Point {
        Point {
            x: x.try_into().ok().unwrap(),
            y: y.try_into().ok().unwrap(),
        }
    }

    pub fn from_point<F: Float>(p: &crate::geom::Point<F>) -> Point {
        Point {
            x: p.x.to_exact(),
            y: p.y.to_exact(),
        }
    }

    pub fn affine(&self, other: &Point, t: &Rational) -> Point {
        Point {
            x: &self.x + t * (&other.x - &self.x),
            y: &self.y + t * (&other.y - &self.y),
        }
    }

    /// Rotates a quarter-turn clockwise about the origin.
    pub fn rotated(&self) -> Point {
        Point {
            x: self.y.clone(),
            y: -self.x.clone(),
        }
    }
}

impl<'a> std::ops::Sub<&'a Point> for &'a Point {
    type Output = Vector;

    fn sub(self, rhs: &'a Point) -> Vector {
        Vector {
            x: &self.x - &rhs.x,
            y: &self.y - &rhs.y,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vector {
    pub x: Rational,
    pub y: Rational,
}

impl Vector {
    /// The direction of the positive x axis.
    pub fn east() -> Vector {
        Vector {
            x: Rational::from(1),
            y: Rational::from(0),
        }
    }

    pub fn cross(&self, other: &Vector) -> Rational {
        &self.x * &other.y - &self.y * &other.x
    }

    pub fn dot(&self, other: &Vector) -> Rational {
        &self.x * &other.x + &self.y * &other.y
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    pub fn reversed(&self) -> Vector {
        Vector {
            x: -self.x.clone(),
            y: -self.y.clone(),
        }
    }
}

/// The sign of the orientation determinant of `a`, `b`, `c`.
///
/// `Greater` if `c` is to the left of the line from `a` to `b`.
pub fn orient(a: &Point, b: &Point, c: &Point) -> Ordering {
    (b - a).cross(&(c - a)).cmp(&Rational::from(0))
}

/// Which quarter-turn class `v` falls into, going clockwise from `reference`:
/// 0 along it, 1 strictly clockwise by less than a half-turn, 2 opposite, and
/// 3 for the rest.
fn clockwise_class(reference: &Vector, v: &Vector) -> u8 {
    match reference.cross(v).cmp(&Rational::from(0)) {
        Ordering::Less => 1,
        Ordering::Greater => 3,
        Ordering::Equal => {
            if reference.dot(v) > 0 {
                0
            } else {
                2
            }
        }
    }
}

/// Compares the directions `a` and `b` by their clockwise angle from `reference`.
///
/// The reference direction itself comes first. No vector may be zero.
pub fn cmp_clockwise(reference: &Vector, a: &Vector, b: &Vector) -> Ordering {
    let class_a = clockwise_class(reference, a);
    let class_b = clockwise_class(reference, b);
    class_a.cmp(&class_b).then_with(|| {
        if class_a % 2 == 0 {
            Ordering::Equal
        } else {
            // Less if b is clockwise from a.
            a.cross(b).cmp(&Rational::from(0))
        }
    })
}

/// Do `a` and `b` point in exactly the same direction?
pub fn same_direction(a: &Vector, b: &Vector) -> bool {
    clockwise_class(a, b) == 0
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Segment {
        Segment { start, end }
    }

    pub fn at(&self, t: &Rational) -> Point {
        self.start.affine(&self.end, t)
    }

    /// Is `p` on this (closed) segment?
    pub fn contains(&self, p: &Point) -> bool {
        let between = |a: &Rational, b: &Rational, x: &Rational| {
            (a <= x && x <= b) || (b <= x && x <= a)
        };
        orient(&self.start, &self.end, p) == Ordering::Equal
            && between(&self.start.x, &self.end.x, &p.x)
            && between(&self.start.y, &self.end.y, &p.y)
    }

    pub fn direction(&self) -> Vector {
        &self.end - &self.start
    }

    pub fn rotated(&self) -> Segment {
        Segment {
            start: self.start.rotated(),
            end: self.end.rotated(),
        }
    }
}

/// An axis-aligned box with exact bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: Rational,
    pub min_y: Rational,
    pub max_x: Rational,
    pub max_y: Rational,
}

impl Bounds {
    /// Returns `None` if there are no points.
    pub fn around<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Bounds> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut ret = Bounds {
            min_x: first.x.clone(),
            min_y: first.y.clone(),
            max_x: first.x.clone(),
            max_y: first.y.clone(),
        };
        for p in points {
            if p.x < ret.min_x {
                ret.min_x = p.x.clone();
            }
            if p.x > ret.max_x {
                ret.max_x = p.x.clone();
            }
            if p.y < ret.min_y {
                ret.min_y = p.y.clone();
            }
            if p.y > ret.max_y {
                ret.max_y = p.y.clone();
            }
        }
        Some(ret)
    }

    /// Could anything in the box touch the ray from `p` heading east (or
    /// north, if `north`)?
    pub fn meets_ray(&self, p: &Point, north: bool) -> bool {
        if north {
            self.min_x <= p.x && p.x <= self.max_x && self.max_y >= p.y
        } else {
            self.min_y <= p.y && p.y <= self.max_y && self.max_x >= p.x
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: i32, y: i32) -> Vector {
        Vector {
            x: Rational::from(x),
            y: Rational::from(y),
        }
    }

    #[test]
    fn clockwise_from_east() {
        let mut dirs = vec![v(0, 1), v(-1, 0), v(0, -1), v(2, 0), v(1, -1)];
        dirs.sort_by(|a, b| cmp_clockwise(&Vector::east(), a, b));
        assert_eq!(dirs, vec![v(2, 0), v(1, -1), v(0, -1), v(-1, 0), v(0, 1)]);
        assert!(same_direction(&v(1, 1), &v(3, 3)));
        assert!(!same_direction(&v(1, 1), &v(-1, -1)));
    }

    #[test]
    fn segment_contains() {
        let s = Segment::new(Point::new(0, 0), Point::new(4, 2));
        assert!(s.contains(&Point::new(2, 1)));
        assert!(s.contains(&Point::new(4, 2)));
        assert!(!s.contains(&Point::new(6, 3)));
        assert!(!s.contains(&Point::new(2, 1.5)));

        let mid = s.at(&(Rational::from(1) / Rational::from(2)));
        assert_eq!(mid, Point::new(2, 1));
    }

    #[test]
    fn rotation_preserves_orientation() {
        let a = Point::new(0, 0);
        let b = Point::new(1, 0);
        let c = Point::new(0, 1);
        assert_eq!(orient(&a, &b, &c), Ordering::Greater);
        assert_eq!(
            orient(&a.rotated(), &b.rotated(), &c.rotated()),
            Ordering::Greater
        );
    }

    #[test]
    fn bounds_and_rays() {
        let b = Bounds::around(&[Point::new(0, 0), Point::new(2, 4), Point::new(1, -1)]).unwrap();
        assert_eq!((b.min_x.clone(), b.max_y.clone()), (Rational::from(0), Rational::from(4)));
        assert!(b.meets_ray(&Point::new(-5, 3), false));
        assert!(b.meets_ray(&Point::new(2, 3), false));
        assert!(!b.meets_ray(&Point::new(3, 3), false));
        assert!(!b.meets_ray(&Point::new(0, 5), false));
        assert!(b.meets_ray(&Point::new(1, -10), true));
        assert!(!b.meets_ray(&Point::new(1, 4.5), true));
        assert!(Bounds::around(std::iter::empty()).is_none());
    }
}
