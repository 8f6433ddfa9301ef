//! Boolean operations on polygons, and the topological relations between geometries.
//!
//! The overlay finds every point where the boundaries of the inputs meet (a
//! "turn"), works out which pieces of boundary between the turns belong to the
//! result, and walks those pieces to build the output rings. All the
//! topological decisions are made with exact arithmetic, so degenerate inputs
//! (touching rings, shared edges, spikes, self-intersections) give consistent
//! answers.
//!
//! ```
//! use ordered_float::NotNan;
//! use overlay::{intersection, Geometry, Polygon};
//!
//! let a: Geometry<NotNan<f64>> =
//!     Polygon::from_coords(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)], &[]).into();
//! let b: Geometry<NotNan<f64>> =
//!     Polygon::from_coords(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)], &[]).into();
//! let out = intersection(&a, &b).unwrap();
//! assert_eq!(out.area().into_inner(), 1.0);
//! ```

mod assemble;
mod classify;
mod clip;
mod cluster;
mod config;
mod enrich;
mod equivalence;
mod error;
mod exact;
mod geom;
mod geometry;
mod intersection;
mod num;
mod partition;
pub mod relate;
mod sections;
mod segments;
mod strategy;
mod traverse;
pub mod turn;
mod visitor;
mod winding;

#[cfg(test)]
pub mod perturbation;

use ordered_float::NotNan;

pub use clip::{clip_linear, LinearClip};
pub use config::{OverlayConfig, Orientation, Tolerance};
pub use error::{ClassificationError, Error};
pub use geom::{Point, Segment};
pub use geometry::{Geometry, Linestring, MultiLinestring, MultiPolygon, Polygon, Ring};
pub use intersection::{segment_intersection, OnSegment, SegmentIntersection, SegmentRatio};
pub use num::Float;
pub use relate::{
    contains, covered_by, covers, crosses, disjoint, equals, intersects, overlaps, relate,
    relate_mask, touches, within, Dimension, Mask, Masks, Matrix,
};
pub use strategy::{Cartesian, Side, Strategy};
pub use visitor::{NoVisitor, OverlayVisitor};
pub use winding::Location;

use classify::{find_turns, TurnPolicy};
use cluster::cluster_turns;
use enrich::Graph;
use segments::Rings;
use strategy::CARTESIAN;
use turn::{Operation, TurnPhase};
use visitor::TraceVisitor;

/// The boolean operations we know how to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OverlayKind {
    /// The points in both inputs.
    Intersection,
    /// The points in either input.
    Union,
    /// The points in the first input but not the second.
    Difference,
    /// The points in exactly one of the inputs.
    SymDifference,
    /// The points in the first input, which may overlap itself. The second input is ignored.
    Dissolve,
}

impl OverlayKind {
    /// Is a point in the result, given how many polygons of each input cover it?
    pub fn includes(self, coverage: [usize; 2]) -> bool {
        let (a, b) = (coverage[0] > 0, coverage[1] > 0);
        match self {
            OverlayKind::Intersection => a && b,
            OverlayKind::Union => a || b,
            OverlayKind::Difference => a && !b,
            OverlayKind::SymDifference => a != b,
            OverlayKind::Dissolve => a,
        }
    }

    /// The operation given to turns whose outgoing edge is on the result boundary.
    pub fn target(self) -> Operation {
        match self {
            OverlayKind::Intersection | OverlayKind::Difference => Operation::Intersection,
            OverlayKind::Union | OverlayKind::SymDifference | OverlayKind::Dissolve => {
                Operation::Union
            }
        }
    }
}

/// A configured overlay.
pub struct Overlay<'s, F: Float> {
    pub config: OverlayConfig,
    strategy: &'s dyn Strategy<F>,
}

impl<F: Float> Overlay<'static, F> {
    pub fn new(config: OverlayConfig) -> Self {
        Overlay {
            config,
            strategy: &CARTESIAN,
        }
    }
}

impl<F: Float> Default for Overlay<'static, F> {
    fn default() -> Self {
        Overlay::new(OverlayConfig::default())
    }
}

fn areal<F: Float>(g: &Geometry<F>) -> Result<MultiPolygon<F>, Error> {
    let mp = g.to_multi_polygon().ok_or(Error::NotAreal { kind: g.kind() })?;
    if mp.iter().flat_map(|poly| poly.rings()).flat_map(|r| &r.points).all(Point::is_finite) {
        Ok(mp)
    } else {
        Err(Error::Infinity)
    }
}

impl<'s, F: Float> Overlay<'s, F> {
    /// Uses a different strategy for the side tests.
    pub fn with_strategy<'t>(self, strategy: &'t dyn Strategy<F>) -> Overlay<'t, F> {
        Overlay {
            config: self.config,
            strategy,
        }
    }

    /// Computes the boolean operation `kind` between `a` and `b`.
    ///
    /// Both geometries must be areal. For [`OverlayKind::Dissolve`], `b` is
    /// ignored (but still has to be areal).
    pub fn apply(
        &self,
        kind: OverlayKind,
        a: &Geometry<F>,
        b: &Geometry<F>,
        visitor: &mut dyn OverlayVisitor<F>,
    ) -> Result<MultiPolygon<F>, Error> {
        let a = areal(a)?;
        let b = areal(b)?;
        let mut rings = Rings::default();
        rings.add_areal(0, &a, self.config.remove_spikes);
        if kind != OverlayKind::Dissolve {
            rings.add_areal(1, &b, self.config.remove_spikes);
        }
        if self.config.trace_turns {
            self.run(kind, &rings, &mut TraceVisitor { inner: visitor })
        } else {
            self.run(kind, &rings, visitor)
        }
    }

    fn run(
        &self,
        kind: OverlayKind,
        rings: &Rings<F>,
        visitor: &mut dyn OverlayVisitor<F>,
    ) -> Result<MultiPolygon<F>, Error> {
        let self_pairs = self.config.self_turns || kind == OverlayKind::Dissolve;
        let mut turns = find_turns(
            rings,
            &self.config,
            self.strategy,
            self_pairs,
            TurnPolicy::default(),
        )?;
        visitor.visit_turns(TurnPhase::Classified, &turns);

        let tolerance = self.config.cluster_tolerance(&rings.magnitude());
        let mut nodes = cluster_turns(&mut turns, rings, &tolerance);
        let mut graph = Graph::build(&mut turns, rings, &nodes);
        graph.assign(kind, &mut turns, rings, &mut nodes);
        visitor.visit_turns(TurnPhase::Enriched, &turns);
        for (node, cluster) in nodes.cluster_of.iter().enumerate() {
            if let Some(c) = *cluster {
                let connections = graph.connections(node, &turns);
                visitor.visit_cluster_connections(c, &turns, &nodes.clusters[c], &connections);
            }
        }

        let mut candidates = traverse::traverse(&graph, &mut turns, rings);
        visitor.visit_turns(TurnPhase::Traversed, &turns);
        candidates.extend(assemble::select_untouched(rings, &graph.untouched, kind));
        let min_area = self.config.min_area(&rings.magnitude());
        let out = assemble::assemble(candidates, self.config.orientation, &min_area);
        log::debug!(
            "{kind:?}: {} turns, {} polygons with {} holes",
            turns.len(),
            out.len(),
            out.num_interiors()
        );
        Ok(out)
    }
}

fn default_overlay(
    kind: OverlayKind,
    a: &Geometry<NotNan<f64>>,
    b: &Geometry<NotNan<f64>>,
) -> Result<MultiPolygon<NotNan<f64>>, Error> {
    Overlay::default().apply(kind, a, b, &mut NoVisitor)
}

/// The intersection of two areal geometries, with the default configuration.
pub fn intersection(
    a: &Geometry<NotNan<f64>>,
    b: &Geometry<NotNan<f64>>,
) -> Result<MultiPolygon<NotNan<f64>>, Error> {
    default_overlay(OverlayKind::Intersection, a, b)
}

/// The union of two areal geometries, with the default configuration.
pub fn union(
    a: &Geometry<NotNan<f64>>,
    b: &Geometry<NotNan<f64>>,
) -> Result<MultiPolygon<NotNan<f64>>, Error> {
    default_overlay(OverlayKind::Union, a, b)
}

/// The difference `a - b` of two areal geometries, with the default configuration.
pub fn difference(
    a: &Geometry<NotNan<f64>>,
    b: &Geometry<NotNan<f64>>,
) -> Result<MultiPolygon<NotNan<f64>>, Error> {
    default_overlay(OverlayKind::Difference, a, b)
}

/// The symmetric difference of two areal geometries, with the default configuration.
pub fn sym_difference(
    a: &Geometry<NotNan<f64>>,
    b: &Geometry<NotNan<f64>>,
) -> Result<MultiPolygon<NotNan<f64>>, Error> {
    default_overlay(OverlayKind::SymDifference, a, b)
}

/// Resolves the self-intersections and overlaps of an areal geometry.
pub fn dissolve(a: &Geometry<NotNan<f64>>) -> Result<MultiPolygon<NotNan<f64>>, Error> {
    default_overlay(OverlayKind::Dissolve, a, &MultiPolygon::default().into())
}
