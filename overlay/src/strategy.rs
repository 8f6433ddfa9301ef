//! The coordinate-system dependent predicates, behind a trait object.

use std::cmp::Ordering;

use crate::{geom::Point, num::Float};

/// Where a point lies relative to a directed line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Side {
    Right,
    Collinear,
    Left,
}

impl Side {
    pub fn from_ordering(ord: Ordering) -> Side {
        match ord {
            Ordering::Less => Side::Right,
            Ordering::Equal => Side::Collinear,
            Ordering::Greater => Side::Left,
        }
    }

    /// -1, 0, or 1.
    pub fn sign(self) -> i8 {
        match self {
            Side::Right => -1,
            Side::Collinear => 0,
            Side::Left => 1,
        }
    }
}

/// The side predicate used by the overlay and relate engines.
///
/// Implementations must be consistent: if `side(a, b, p)` is `Collinear` then
/// so are all the other permutations of the same three points.
pub trait Strategy<F: Float>: Sync {
    /// Is `p` to the left of, to the right of, or on the line from `a` to `b`?
    fn side(&self, a: &Point<F>, b: &Point<F>, p: &Point<F>) -> Side;
}

/// Plain cartesian coordinates with exact orientation tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cartesian;

impl<F: Float> Strategy<F> for Cartesian {
    fn side(&self, a: &Point<F>, b: &Point<F>, p: &Point<F>) -> Side {
        Side::from_ordering(F::orient(a, b, p))
    }
}

pub(crate) static CARTESIAN: Cartesian = Cartesian;
