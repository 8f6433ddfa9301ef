//! A thin abstraction over the different numerical types we support.

use std::{cmp::Ordering, hash::Hash};

use malachite::Rational;
use ordered_float::NotNan;

use crate::geom::Point;

/// A trait for abstracting over the properties we need from numerical types.
///
/// This is implemented for `NotNan<f64>`, `NotNan<f32>`, and `malachite::Rational`.
/// Orientation tests are exact for all of them: the floating-point types go
/// through adaptive-precision predicates, and the rationals are exact anyway.
pub trait Float:
    Sized
    + std::ops::Add<Self, Output = Self>
    + std::ops::Sub<Self, Output = Self>
    + std::ops::Mul<Self, Output = Self>
    + std::ops::Div<Self, Output = Self>
    + std::ops::Neg<Output = Self>
    + for<'a> std::ops::Add<&'a Self, Output = Self>
    + for<'a> std::ops::Sub<&'a Self, Output = Self>
    + for<'a> std::ops::Mul<&'a Self, Output = Self>
    + for<'a> std::ops::Div<&'a Self, Output = Self>
    + Clone
    + std::fmt::Debug
    + Ord
    + Eq
    + Hash
    + 'static
{
    /// Converts from an `f32`. Panics on NaN.
    fn from_f32(x: f32) -> Self;

    /// Converts from an `f64`, possibly losing precision. Panics on NaN.
    fn from_f64(x: f64) -> Self;

    /// The exact value of this number.
    fn to_exact(&self) -> Rational;

    /// The absolute value.
    fn abs(self) -> Self;

    /// Is this number finite? Rationals always are.
    fn is_finite(&self) -> bool;

    /// The sign of the orientation determinant of `a`, `b`, `c`.
    ///
    /// Returns `Greater` if `c` is to the left of the directed line from `a`
    /// to `b`, `Less` if it's to the right, and `Equal` if the three points
    /// are collinear. This must be exact.
    fn orient(a: &Point<Self>, b: &Point<Self>, c: &Point<Self>) -> Ordering;

    /// The tolerance for treating coordinates of magnitude `magnitude` as equal,
    /// if we allow `ulps` units of relative error. Exact types return zero.
    fn tolerance(magnitude: &Self, ulps: u32) -> Self;
}

fn sign_f64(det: f64) -> Ordering {
    if det > 0.0 {
        Ordering::Greater
    } else if det < 0.0 {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

impl Float for Rational {
    fn from_f32(x: f32) -> Self {
        Rational::try_from(x).unwrap()
    }

    fn from_f64(x: f64) -> Self {
        Rational::try_from(x).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.clone()
    }

    fn abs(self) -> Self {
        <Rational as malachite::num::arithmetic::traits::Abs>::abs(self)
    }

    fn is_finite(&self) -> bool {
        true
    }

    fn orient(a: &Point<Self>, b: &Point<Self>, c: &Point<Self>) -> Ordering {
        let det = (&b.x - &a.x) * (&c.y - &a.y) - (&b.y - &a.y) * (&c.x - &a.x);
        det.cmp(&Rational::from(0))
    }

    fn tolerance(_magnitude: &Self, _ulps: u32) -> Self {
        Rational::from(0)
    }
}

impl Float for NotNan<f32> {
    fn from_f32(x: f32) -> Self {
        NotNan::try_from(x).unwrap()
    }

    fn from_f64(x: f64) -> Self {
        NotNan::try_from(x as f32).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.into_inner().try_into().unwrap()
    }

    fn abs(self) -> Self {
        self.into_inner().abs().try_into().unwrap()
    }

    fn is_finite(&self) -> bool {
        self.into_inner().is_finite()
    }

    fn orient(a: &Point<Self>, b: &Point<Self>, c: &Point<Self>) -> Ordering {
        // Widening to f64 is exact, so the adaptive predicate stays exact.
        let coord = |p: &Point<Self>| robust::Coord {
            x: f64::from(p.x.into_inner()),
            y: f64::from(p.y.into_inner()),
        };
        sign_f64(robust::orient2d(coord(a), coord(b), coord(c)))
    }

    fn tolerance(magnitude: &Self, ulps: u32) -> Self {
        let eps = magnitude.into_inner().abs() * f32::EPSILON * ulps as f32;
        NotNan::new(eps).unwrap_or_else(|_| Self::from_f32(0.0))
    }
}

impl Float for NotNan<f64> {
    fn from_f32(x: f32) -> Self {
        NotNan::try_from(f64::from(x)).unwrap()
    }

    fn from_f64(x: f64) -> Self {
        NotNan::try_from(x).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.into_inner().try_into().unwrap()
    }

    fn abs(self) -> Self {
        self.into_inner().abs().try_into().unwrap()
    }

    fn is_finite(&self) -> bool {
        self.into_inner().is_finite()
    }

    fn orient(a: &Point<Self>, b: &Point<Self>, c: &Point<Self>) -> Ordering {
        let coord = |p: &Point<Self>| robust::Coord {
            x: p.x.into_inner(),
            y: p.y.into_inner(),
        };
        sign_f64(robust::orient2d(coord(a), coord(b), coord(c)))
    }

    fn tolerance(magnitude: &Self, ulps: u32) -> Self {
        // The basic relative error of addition and subtraction is EPSILON / 2,
        // so `ulps` of them leaves plenty of room for a handful of operations.
        let eps = magnitude.into_inner().abs() * f64::EPSILON * f64::from(ulps);
        NotNan::new(eps).unwrap_or_else(|_| Self::from_f32(0.0))
    }
}
