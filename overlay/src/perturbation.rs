//! Random perturbations of polygons, for testing robustness.
//!
//! Starting from a few base rings, we nudge points by a few ulps (or by small
//! additive amounts) and subdivide segments at slightly-off points. The results
//! are exactly the kind of nearly-degenerate inputs that break naive overlays.

use ordered_float::NotNan;
use proptest::{arbitrary::any, prop_oneof, strategy::Strategy};

use crate::geom::Point;

type Float = NotNan<f64>;

#[derive(Clone, Copy, Debug)]
pub enum FloatPerturbation {
    /// Perturb by between -128 and 127 ulps.
    Ulp(i8),
    /// Perturb by a bounded additive amount.
    Eps(f64),
}

impl FloatPerturbation {
    fn apply(&self, f: Float) -> Float {
        match self {
            FloatPerturbation::Ulp(n) => {
                let mut x = f.into_inner();
                for _ in 0..n.unsigned_abs() {
                    x = if *n > 0 { x.next_up() } else { x.next_down() };
                }
                Float::new(x).unwrap()
            }
            FloatPerturbation::Eps(x) => f + x,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PointPerturbation {
    pub x: FloatPerturbation,
    pub y: FloatPerturbation,
}

impl PointPerturbation {
    pub fn apply(&self, p: Point<Float>) -> Point<Float> {
        Point {
            x: self.x.apply(p.x),
            y: self.y.apply(p.y),
        }
    }
}

/// A recipe for building a ring out of one of the base rings.
#[derive(Clone, Debug)]
pub enum RingPerturbation {
    Base {
        idx: usize,
    },
    Point {
        perturbation: PointPerturbation,
        idx: usize,
        next: Box<RingPerturbation>,
    },
    Subdivision {
        // Between 0.0 and 1.0
        t: f64,
        idx: usize,
        next: Box<RingPerturbation>,
    },
}

pub fn float_perturbation(eps: f64) -> impl Strategy<Value = FloatPerturbation> {
    prop_oneof![
        any::<i8>().prop_map(FloatPerturbation::Ulp),
        (-eps..=eps).prop_map(FloatPerturbation::Eps)
    ]
}

pub fn point_perturbation(eps: f64) -> impl Strategy<Value = PointPerturbation> {
    (float_perturbation(eps), float_perturbation(eps)).prop_map(|(x, y)| PointPerturbation { x, y })
}

pub fn ring_perturbation(eps: f64) -> impl Strategy<Value = RingPerturbation> {
    let leaf = any::<usize>().prop_map(|idx| RingPerturbation::Base { idx });
    leaf.prop_recursive(4, 16, 1, move |inner| {
        prop_oneof![
            (point_perturbation(eps), any::<usize>(), inner.clone()).prop_map(
                |(perturbation, idx, next)| RingPerturbation::Point {
                    perturbation,
                    idx,
                    next: Box::new(next),
                }
            ),
            (0.0..1.0, any::<usize>(), inner).prop_map(|(t, idx, next)| {
                RingPerturbation::Subdivision {
                    t,
                    idx,
                    next: Box::new(next),
                }
            }),
        ]
    })
}

fn index<T>(arr: &[T], idx: usize) -> &T {
    &arr[idx % arr.len()]
}

fn index_mut<T>(arr: &mut [T], idx: usize) -> &mut T {
    let len = arr.len();
    &mut arr[idx % len]
}

pub fn realize_ring(base_rings: &[Vec<Point<Float>>], pert: &RingPerturbation) -> Vec<Point<Float>> {
    match pert {
        RingPerturbation::Base { idx } => index(base_rings, *idx).to_owned(),
        RingPerturbation::Point {
            perturbation,
            idx,
            next,
        } => {
            let mut next = realize_ring(base_rings, next);
            let p = index_mut(&mut next, *idx);
            *p = perturbation.apply(p.clone());
            next
        }
        RingPerturbation::Subdivision { t, idx, next } => {
            let mut next = realize_ring(base_rings, next);
            let idx = *idx % next.len();
            let p0 = index(&next, idx).clone();
            let p1 = index(&next, idx + 1).clone();
            next.insert(idx + 1, p0.affine(&p1, &Float::new(*t).unwrap()));
            next
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        geometry::{MultiPolygon, Polygon, Ring},
        NoVisitor, Overlay, OverlayKind,
    };

    fn base_rings() -> Vec<Vec<Point<Float>>> {
        let ring = |coords: &[(f64, f64)]| {
            coords
                .iter()
                .map(|&(x, y)| Point::from_f64(x, y))
                .collect::<Vec<_>>()
        };
        vec![
            ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]),
            ring(&[(0.5, 0.5), (0.5, 1.5), (1.5, 1.5), (1.5, 0.5)]),
            ring(&[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]),
            ring(&[(1.0, 0.0), (1.0, 1.0), (2.0, 1.0), (2.0, 0.0)]),
        ]
    }

    fn geometry(points: Vec<Point<Float>>) -> crate::Geometry<Float> {
        MultiPolygon(vec![Polygon::new(Ring::new(points), Vec::new())]).into()
    }

    proptest! {
        #[test]
        fn perturbed_overlays_succeed(
            a in ring_perturbation(0.1),
            b in ring_perturbation(0.1),
        ) {
            let base = base_rings();
            let a = geometry(realize_ring(&base, &a));
            let b = geometry(realize_ring(&base, &b));
            let overlay = Overlay::default();
            for kind in [OverlayKind::Union, OverlayKind::Intersection, OverlayKind::SymDifference] {
                let out = overlay.apply(kind, &a, &b, &mut NoVisitor).unwrap();
                for poly in out.iter() {
                    for ring in poly.rings() {
                        prop_assert!(ring.points.len() >= 4);
                        prop_assert_eq!(ring.points.first(), ring.points.last());
                    }
                }
            }
        }
    }
}
