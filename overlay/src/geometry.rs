//! The geometries we accept as input and produce as output.

use crate::{
    geom::{double_area, Point},
    num::Float,
};

/// A closed ring of points.
///
/// The first point may or may not be repeated at the end; everything in this
/// crate treats rings cyclically. Rings produced by an overlay always repeat it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Ring<F: Float> {
    pub points: Vec<Point<F>>,
}

impl<F: Float> Ring<F> {
    pub fn new(points: Vec<Point<F>>) -> Self {
        Ring { points }
    }

    /// Panics on NaN coordinates.
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Ring::new(coords.iter().map(|&(x, y)| Point::from_f64(x, y)).collect())
    }

    /// The points without the closing repetition of the first point.
    pub fn open_points(&self) -> &[Point<F>] {
        match self.points.as_slice() {
            [first, rest @ .., last] if first == last && !rest.is_empty() => {
                &self.points[..self.points.len() - 1]
            }
            ps => ps,
        }
    }

    /// Twice the signed area, positive for counter-clockwise rings.
    pub(crate) fn double_signed_area(&self) -> F {
        double_area(self.open_points())
    }

    /// The (unsigned) area enclosed by this ring.
    pub fn area(&self) -> F {
        self.double_signed_area().abs() / F::from_f32(2.0)
    }

    pub fn is_clockwise(&self) -> bool {
        self.double_signed_area() < F::from_f32(0.0)
    }

    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Ring { points }
    }

    /// Appends the first point to the end, unless it's already there.
    pub(crate) fn close(mut self) -> Self {
        if let (Some(first), Some(last)) = (self.points.first(), self.points.last()) {
            if first != last {
                let first = first.clone();
                self.points.push(first);
            }
        }
        self
    }
}

/// An exterior ring with some holes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Polygon<F: Float> {
    pub exterior: Ring<F>,
    pub interiors: Vec<Ring<F>>,
}

impl<F: Float> Polygon<F> {
    pub fn new(exterior: Ring<F>, interiors: Vec<Ring<F>>) -> Self {
        Polygon {
            exterior,
            interiors,
        }
    }

    /// Panics on NaN coordinates.
    pub fn from_coords(exterior: &[(f64, f64)], interiors: &[&[(f64, f64)]]) -> Self {
        Polygon::new(
            Ring::from_coords(exterior),
            interiors.iter().map(|ring| Ring::from_coords(ring)).collect(),
        )
    }

    /// The area of the exterior minus the areas of the holes.
    pub fn area(&self) -> F {
        self.interiors
            .iter()
            .fold(self.exterior.area(), |acc, hole| acc - hole.area())
    }

    /// The polygon with every ring's point order reversed.
    pub fn reversed(&self) -> Self {
        Polygon {
            exterior: self.exterior.reversed(),
            interiors: self.interiors.iter().map(Ring::reversed).collect(),
        }
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring<F>> + '_ {
        std::iter::once(&self.exterior).chain(&self.interiors)
    }
}

/// An ordered collection of polygons.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct MultiPolygon<F: Float>(pub Vec<Polygon<F>>);

impl<F: Float> Default for MultiPolygon<F> {
    fn default() -> Self {
        MultiPolygon(Vec::new())
    }
}

impl<F: Float> MultiPolygon<F> {
    pub fn area(&self) -> F {
        self.0
            .iter()
            .fold(F::from_f32(0.0), |acc, poly| acc + poly.area())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Polygon<F>> + '_ {
        self.0.iter()
    }

    /// The total number of holes.
    pub fn num_interiors(&self) -> usize {
        self.0.iter().map(|poly| poly.interiors.len()).sum()
    }

    pub fn reversed(&self) -> Self {
        MultiPolygon(self.0.iter().map(Polygon::reversed).collect())
    }
}

/// An open curve.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Linestring<F: Float> {
    pub points: Vec<Point<F>>,
}

impl<F: Float> Linestring<F> {
    pub fn new(points: Vec<Point<F>>) -> Self {
        Linestring { points }
    }

    /// Panics on NaN coordinates.
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Linestring::new(coords.iter().map(|&(x, y)| Point::from_f64(x, y)).collect())
    }

    /// A linestring is closed if it ends where it starts. Closed linestrings
    /// have no boundary.
    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct MultiLinestring<F: Float>(pub Vec<Linestring<F>>);

impl<F: Float> Default for MultiLinestring<F> {
    fn default() -> Self {
        MultiLinestring(Vec::new())
    }
}

impl<F: Float> MultiLinestring<F> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Any of the geometries we know about.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Geometry<F: Float> {
    Point(Point<F>),
    Linestring(Linestring<F>),
    MultiLinestring(MultiLinestring<F>),
    Ring(Ring<F>),
    Polygon(Polygon<F>),
    MultiPolygon(MultiPolygon<F>),
}

impl<F: Float> Geometry<F> {
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "point",
            Geometry::Linestring(_) => "linestring",
            Geometry::MultiLinestring(_) => "multi-linestring",
            Geometry::Ring(_) => "ring",
            Geometry::Polygon(_) => "polygon",
            Geometry::MultiPolygon(_) => "multi-polygon",
        }
    }

    /// The topological dimension: 0 for points, 1 for curves, 2 for areas.
    pub fn dimension(&self) -> u8 {
        match self {
            Geometry::Point(_) => 0,
            Geometry::Linestring(_) | Geometry::MultiLinestring(_) => 1,
            Geometry::Ring(_) | Geometry::Polygon(_) | Geometry::MultiPolygon(_) => 2,
        }
    }

    pub fn points(&self) -> Box<dyn Iterator<Item = &Point<F>> + '_> {
        match self {
            Geometry::Point(p) => Box::new(std::iter::once(p)),
            Geometry::Linestring(l) => Box::new(l.points.iter()),
            Geometry::MultiLinestring(ls) => Box::new(ls.0.iter().flat_map(|l| &l.points)),
            Geometry::Ring(r) => Box::new(r.points.iter()),
            Geometry::Polygon(poly) => Box::new(poly.rings().flat_map(|r| &r.points)),
            Geometry::MultiPolygon(mp) => {
                Box::new(mp.0.iter().flat_map(|poly| poly.rings()).flat_map(|r| &r.points))
            }
        }
    }

    /// The areal view of this geometry, if it has one.
    pub fn to_multi_polygon(&self) -> Option<MultiPolygon<F>> {
        match self {
            Geometry::Ring(r) => Some(MultiPolygon(vec![Polygon::new(r.clone(), Vec::new())])),
            Geometry::Polygon(poly) => Some(MultiPolygon(vec![poly.clone()])),
            Geometry::MultiPolygon(mp) => Some(mp.clone()),
            _ => None,
        }
    }

    /// The linear view of this geometry, if it has one.
    pub fn to_multi_linestring(&self) -> Option<MultiLinestring<F>> {
        match self {
            Geometry::Linestring(l) => Some(MultiLinestring(vec![l.clone()])),
            Geometry::MultiLinestring(ls) => Some(ls.clone()),
            _ => None,
        }
    }
}

impl<F: Float> From<Point<F>> for Geometry<F> {
    fn from(p: Point<F>) -> Self {
        Geometry::Point(p)
    }
}

impl<F: Float> From<Linestring<F>> for Geometry<F> {
    fn from(l: Linestring<F>) -> Self {
        Geometry::Linestring(l)
    }
}

impl<F: Float> From<MultiLinestring<F>> for Geometry<F> {
    fn from(ls: MultiLinestring<F>) -> Self {
        Geometry::MultiLinestring(ls)
    }
}

impl<F: Float> From<Ring<F>> for Geometry<F> {
    fn from(r: Ring<F>) -> Self {
        Geometry::Ring(r)
    }
}

impl<F: Float> From<Polygon<F>> for Geometry<F> {
    fn from(poly: Polygon<F>) -> Self {
        Geometry::Polygon(poly)
    }
}

impl<F: Float> From<MultiPolygon<F>> for Geometry<F> {
    fn from(mp: MultiPolygon<F>) -> Self {
        Geometry::MultiPolygon(mp)
    }
}
