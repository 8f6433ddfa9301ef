use ordered_float::NotNan;
use overlay::{
    turn::{Turn, TurnPhase},
    Error, Geometry, MultiPolygon, Orientation, Overlay, OverlayConfig, OverlayKind,
    OverlayVisitor, Polygon,
};

type F = NotNan<f64>;

fn multi(polys: &[&[(f64, f64)]]) -> Geometry<F> {
    MultiPolygon(polys.iter().map(|p| Polygon::from_coords(p, &[])).collect()).into()
}

fn simplex_a() -> Geometry<F> {
    multi(&[
        &[(0.0, 1.0), (2.0, 5.0), (5.0, 3.0), (0.0, 1.0)],
        &[(1.0, 1.0), (5.0, 2.0), (5.0, 0.0), (1.0, 1.0)],
    ])
}

fn simplex_b() -> Geometry<F> {
    multi(&[&[(3.0, 0.0), (0.0, 3.0), (4.0, 5.0), (3.0, 0.0)]])
}

#[track_caller]
fn check(kind: OverlayKind, a: &Geometry<F>, b: &Geometry<F>, area: f64, polygons: usize) {
    let out = Overlay::default().apply(kind, a, b, &mut overlay::NoVisitor).unwrap();
    let actual = out.area().into_inner();
    assert!(
        (actual - area).abs() < 0.01,
        "{kind:?}: expected area {area}, got {actual}"
    );
    assert_eq!(out.len(), polygons, "{kind:?}: {out:?}");
}

#[test]
fn multi_simplex() {
    let a = simplex_a();
    let b = simplex_b();
    check(OverlayKind::Intersection, &a, &b, 6.42, 2);
    check(OverlayKind::Union, &a, &b, 14.58, 1);
    check(OverlayKind::Difference, &a, &b, 5.58, 5);
    check(OverlayKind::Difference, &b, &a, 2.58, 4);

    let sym = Overlay::default()
        .apply(OverlayKind::SymDifference, &a, &b, &mut overlay::NoVisitor)
        .unwrap();
    assert!((sym.area().into_inner() - 8.16).abs() < 0.01);
}

#[test]
fn orientation_of_the_inputs_does_not_matter() {
    let a = simplex_a();
    let b = simplex_b();
    let reversed = |g: &Geometry<F>| -> Geometry<F> {
        g.to_multi_polygon().unwrap().reversed().into()
    };
    let overlay = Overlay::default();
    for kind in [
        OverlayKind::Intersection,
        OverlayKind::Union,
        OverlayKind::Difference,
    ] {
        let forward = overlay.apply(kind, &a, &b, &mut overlay::NoVisitor).unwrap();
        let backward = overlay
            .apply(kind, &reversed(&a), &reversed(&b), &mut overlay::NoVisitor)
            .unwrap();
        assert!((forward.area() - backward.area()).abs() < 1e-9);
        assert_eq!(forward.len(), backward.len());
    }
}

#[test]
fn counter_clockwise_output() {
    let config = OverlayConfig {
        orientation: Orientation::CounterClockwise,
        ..OverlayConfig::default()
    };
    let out = Overlay::new(config)
        .apply(
            OverlayKind::Union,
            &simplex_a(),
            &simplex_b(),
            &mut overlay::NoVisitor,
        )
        .unwrap();
    assert!(out.iter().all(|p| !p.exterior.is_clockwise()));
    assert!((out.area().into_inner() - 14.58).abs() < 0.01);
}

#[test]
fn linear_inputs_are_rejected() {
    let line: Geometry<F> = overlay::Linestring::from_coords(&[(0.0, 0.0), (1.0, 1.0)]).into();
    let err = overlay::union(&line, &simplex_b()).unwrap_err();
    assert!(matches!(err, Error::NotAreal { .. }), "{err}");
}

#[derive(Default)]
struct Recorder {
    phases: Vec<(TurnPhase, usize)>,
    traversable: usize,
    visited: usize,
}

impl OverlayVisitor<F> for Recorder {
    fn visit_turns(&mut self, phase: TurnPhase, turns: &[Turn<F>]) {
        self.phases.push((phase, turns.len()));
        match phase {
            TurnPhase::Enriched => {
                self.traversable = turns.iter().filter(|t| t.is_traversable).count();
            }
            TurnPhase::Traversed => {
                self.visited = turns
                    .iter()
                    .flat_map(|t| &t.operations)
                    .filter(|op| op.visited)
                    .count();
            }
            TurnPhase::Classified => {}
        }
    }
}

#[test]
fn visitor_sees_every_phase() {
    let a: Geometry<F> =
        Polygon::from_coords(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)], &[]).into();
    let b: Geometry<F> =
        Polygon::from_coords(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)], &[]).into();
    let mut recorder = Recorder::default();
    let out = Overlay::default()
        .apply(OverlayKind::Union, &a, &b, &mut recorder)
        .unwrap();
    assert_eq!(out.area().into_inner(), 7.0);

    // The two crossings at (1, 2) and (2, 1).
    assert_eq!(
        recorder.phases,
        vec![
            (TurnPhase::Classified, 2),
            (TurnPhase::Enriched, 2),
            (TurnPhase::Traversed, 2)
        ]
    );
    assert_eq!(recorder.traversable, 2);
    assert_eq!(recorder.visited, 2);
}
