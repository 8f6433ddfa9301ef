use malachite::Rational;
use overlay::{Geometry, MultiPolygon, NoVisitor, Overlay, OverlayKind, Polygon};
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
struct Rect {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl Rect {
    fn polygon(&self) -> Polygon<Rational> {
        let (x0, y0, x1, y1) = (self.x0 as f64, self.y0 as f64, self.x1 as f64, self.y1 as f64);
        Polygon::from_coords(&[(x0, y0), (x0, y1), (x1, y1), (x1, y0)], &[])
    }

    fn geometry(&self) -> Geometry<Rational> {
        self.polygon().into()
    }

    fn area(&self) -> i32 {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }

    fn overlap(&self, other: &Rect) -> i32 {
        let w = self.x1.min(other.x1) - self.x0.max(other.x0);
        let h = self.y1.min(other.y1) - self.y0.max(other.y0);
        w.max(0) * h.max(0)
    }
}

fn rect() -> impl Strategy<Value = Rect> {
    (0..8i32, 0..8i32, 1..5i32, 1..5i32).prop_map(|(x0, y0, w, h)| Rect {
        x0,
        y0,
        x1: x0 + w,
        y1: y0 + h,
    })
}

#[derive(Clone, Copy, Debug)]
struct Triangle([(i32, i32); 3]);

impl Triangle {
    fn double_area(&self) -> i32 {
        let [(ax, ay), (bx, by), (cx, cy)] = self.0;
        (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
    }

    fn polygon(&self) -> Polygon<Rational> {
        let coords: Vec<(f64, f64)> = self.0.iter().map(|&(x, y)| (x as f64, y as f64)).collect();
        Polygon::from_coords(&coords, &[])
    }
}

fn triangle() -> impl Strategy<Value = Triangle> {
    prop::array::uniform3((0..6i32, 0..6i32))
        .prop_map(Triangle)
        .prop_filter("degenerate triangle", |t| t.double_area() != 0)
}

fn apply(kind: OverlayKind, a: &Geometry<Rational>, b: &Geometry<Rational>) -> MultiPolygon<Rational> {
    Overlay::default().apply(kind, a, b, &mut NoVisitor).unwrap()
}

fn area(x: i32) -> Rational {
    Rational::from(x)
}

proptest! {
    #[test]
    fn areas_add_up(a in rect(), b in rect()) {
        let (ga, gb) = (a.geometry(), b.geometry());
        let inter = apply(OverlayKind::Intersection, &ga, &gb);
        let union = apply(OverlayKind::Union, &ga, &gb);
        let diff = apply(OverlayKind::Difference, &ga, &gb);
        let sym = apply(OverlayKind::SymDifference, &ga, &gb);

        prop_assert_eq!(inter.area(), area(a.overlap(&b)));
        prop_assert_eq!(union.area() + inter.area(), area(a.area() + b.area()));
        prop_assert_eq!(diff.area() + inter.area(), area(a.area()));
        prop_assert_eq!(sym.area() + inter.area(), union.area());
    }

    #[test]
    fn input_orientation_is_irrelevant(a in rect(), b in rect()) {
        let ga = a.geometry();
        let gb = b.geometry();
        let reversed: Geometry<Rational> = MultiPolygon(vec![b.polygon().reversed()]).into();
        for kind in [OverlayKind::Intersection, OverlayKind::Union, OverlayKind::Difference] {
            let forward = apply(kind, &ga, &gb);
            let backward = apply(kind, &ga, &reversed);
            prop_assert_eq!(forward.area(), backward.area());
            prop_assert_eq!(forward.len(), backward.len());
        }
    }

    #[test]
    fn output_rings_are_closed_and_oriented(a in rect(), b in rect()) {
        let out = apply(OverlayKind::SymDifference, &a.geometry(), &b.geometry());
        for poly in out.iter() {
            prop_assert!(poly.exterior.is_clockwise());
            prop_assert!(poly.interiors.iter().all(|r| !r.is_clockwise()));
            for ring in poly.rings() {
                prop_assert!(ring.points.len() >= 4);
                prop_assert_eq!(ring.points.first(), ring.points.last());
            }
        }
    }

    #[test]
    fn output_polygons_do_not_overlap(a in rect(), b in rect()) {
        let out = apply(OverlayKind::SymDifference, &a.geometry(), &b.geometry());
        let polys: Vec<Geometry<Rational>> = out.iter().map(|p| p.clone().into()).collect();
        for (i, p) in polys.iter().enumerate() {
            for q in &polys[i + 1..] {
                prop_assert!(overlay::relate_mask(p, q, "F********").unwrap());
            }
        }
    }

    #[test]
    fn dissolve_merges_overlaps(a in rect(), b in rect()) {
        let both: Geometry<Rational> = MultiPolygon(vec![a.polygon(), b.polygon()]).into();
        let empty: Geometry<Rational> = MultiPolygon::default().into();
        let once = apply(OverlayKind::Dissolve, &both, &empty);
        prop_assert_eq!(once.area(), area(a.area() + b.area() - a.overlap(&b)));

        let twice = apply(OverlayKind::Dissolve, &once.clone().into(), &empty);
        prop_assert_eq!(twice.area(), once.area());
        prop_assert_eq!(twice.len(), once.len());
    }

    #[test]
    fn dissolving_triangles_matches_their_union(a in triangle(), b in triangle()) {
        let both: Geometry<Rational> = MultiPolygon(vec![a.polygon(), b.polygon()]).into();
        let empty: Geometry<Rational> = MultiPolygon::default().into();
        let dissolved = apply(OverlayKind::Dissolve, &both, &empty);
        let union = apply(OverlayKind::Union, &a.polygon().into(), &b.polygon().into());
        prop_assert_eq!(dissolved.area(), union.area());

        let inter = apply(OverlayKind::Intersection, &a.polygon().into(), &b.polygon().into());
        let sum = Rational::from(a.double_area().abs() + b.double_area().abs()) / Rational::from(2);
        prop_assert_eq!(union.area() + inter.area(), sum);
        for poly in dissolved.iter() {
            prop_assert!(poly.exterior.is_clockwise());
            prop_assert!(poly.interiors.iter().all(|r| !r.is_clockwise()));
        }
    }
}
