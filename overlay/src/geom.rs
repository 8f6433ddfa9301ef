use ordered_float::NotNan;

use crate::{num::Float, Error};

// Points are sorted by `y` and then by `x`
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Point<F: Float> {
    pub y: F,
    pub x: F,
}

impl<F: Float> std::fmt::Debug for Point<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl<F: Float> Point<F> {
    pub fn new(x: f32, y: f32) -> Self {
        Point {
            x: F::from_f32(x),
            y: F::from_f32(y),
        }
    }

    /// Panics if either coordinate is NaN.
    pub fn from_f64(x: f64, y: f64) -> Self {
        Point {
            x: F::from_f64(x),
            y: F::from_f64(y),
        }
    }

    pub fn affine(&self, other: &Self, t: &F) -> Self {
        Point {
            x: self.x.clone() + t.clone() * (other.x.clone() - &self.x),
            y: self.y.clone() + t.clone() * (other.y.clone() - &self.y),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl TryFrom<(f64, f64)> for Point<NotNan<f64>> {
    type Error = Error;

    fn try_from((x, y): (f64, f64)) -> Result<Self, Error> {
        let coord = |c: f64| NotNan::new(c).map_err(|_| Error::NaN);
        let p = Point {
            x: coord(x)?,
            y: coord(y)?,
        };
        if p.is_finite() {
            Ok(p)
        } else {
            Err(Error::Infinity)
        }
    }
}

impl<F: Float> std::ops::Sub for &Point<F> {
    type Output = Vector<F>;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x.clone() - &rhs.x,
            y: self.y.clone() - &rhs.y,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vector<F: Float> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Vector<F> {
    pub fn cross(&self, other: &Vector<F>) -> F {
        self.x.clone() * &other.y - self.y.clone() * &other.x
    }

    pub fn dot(&self, other: &Vector<F>) -> F {
        self.x.clone() * &other.x + self.y.clone() * &other.y
    }
}

/// A directed segment, keeping the direction of the ring it came from.
///
/// The start point may be bigger than the end point.
#[derive(Clone, PartialEq, Eq)]
pub struct Segment<F: Float> {
    pub start: Point<F>,
    pub end: Point<F>,
}

impl<F: Float> std::fmt::Debug for Segment<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.start, self.end)
    }
}

impl<F: Float> Segment<F> {
    pub fn new(start: Point<F>, end: Point<F>) -> Self {
        Segment { start, end }
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn bounding_box(&self) -> BoundingBox<F> {
        BoundingBox::from_points([&self.start, &self.end])
    }

    pub fn reversed(&self) -> Self {
        Segment {
            start: self.end.clone(),
            end: self.start.clone(),
        }
    }
}

/// An axis-aligned, closed bounding box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundingBox<F: Float> {
    pub min_x: F,
    pub min_y: F,
    pub max_x: F,
    pub max_y: F,
}

impl<F: Float> BoundingBox<F> {
    /// Panics if there are no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point<F>>) -> Self {
        let mut points = points.into_iter();
        let first = points.next().expect("a bounding box needs at least one point");
        let mut ret = BoundingBox {
            min_x: first.x.clone(),
            min_y: first.y.clone(),
            max_x: first.x.clone(),
            max_y: first.y.clone(),
        };
        for p in points {
            ret.expand_point(p);
        }
        ret
    }

    pub fn expand_point(&mut self, p: &Point<F>) {
        if p.x < self.min_x {
            self.min_x = p.x.clone();
        }
        if p.x > self.max_x {
            self.max_x = p.x.clone();
        }
        if p.y < self.min_y {
            self.min_y = p.y.clone();
        }
        if p.y > self.max_y {
            self.max_y = p.y.clone();
        }
    }

    pub fn expand(&mut self, other: &BoundingBox<F>) {
        if other.min_x < self.min_x {
            self.min_x = other.min_x.clone();
        }
        if other.max_x > self.max_x {
            self.max_x = other.max_x.clone();
        }
        if other.min_y < self.min_y {
            self.min_y = other.min_y.clone();
        }
        if other.max_y > self.max_y {
            self.max_y = other.max_y.clone();
        }
    }

    /// Do the two (closed) boxes share at least a point?
    pub fn intersects(&self, other: &BoundingBox<F>) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn contains(&self, other: &BoundingBox<F>) -> bool {
        self.min_x <= other.min_x
            && other.max_x <= self.max_x
            && self.min_y <= other.min_y
            && other.max_y <= self.max_y
    }

    /// The lower and upper bounds in one dimension (0 for x, 1 for y).
    pub fn range(&self, dim: usize) -> (&F, &F) {
        if dim == 0 {
            (&self.min_x, &self.max_x)
        } else {
            (&self.min_y, &self.max_y)
        }
    }
}

pub(crate) fn cyclic_pairs<T>(xs: &[T]) -> impl Iterator<Item = (&T, &T)> {
    xs.windows(2)
        .map(|pair| (&pair[0], &pair[1]))
        .chain(xs.last().zip(xs.first()))
}

/// Twice the signed area of a cyclic sequence of points.
///
/// This is positive for counter-clockwise rings.
pub(crate) fn double_area<F: Float>(points: &[Point<F>]) -> F {
    let mut sum = F::from_f32(0.0);
    if points.len() < 3 {
        return sum;
    }
    // Measuring relative to the first point keeps the products small.
    let origin = &points[0];
    for (p, q) in cyclic_pairs(points) {
        sum = sum + (p - origin).cross(&(q - origin));
    }
    sum
}
