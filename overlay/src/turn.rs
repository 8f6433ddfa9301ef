//! Turns: the points where rings meet, and what each ring does there.

use crate::{geom::Point, intersection::SegmentRatio, num::Float};

/// Identifies a segment of one of the input geometries.
///
/// `ring` 0 is the exterior of polygon `multi`, and `ring` k + 1 is its k-th
/// interior. For linestrings, `multi` is the linestring and `ring` is always 0.
/// Segment indices refer to the prepared ring, after duplicate points and spikes
/// have been removed.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize)]
pub struct SegmentId {
    pub source: usize,
    pub multi: usize,
    pub ring: usize,
    pub segment: usize,
}

impl std::fmt::Debug for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "s{}.{}.{}:{}",
            self.source, self.multi, self.ring, self.segment
        )
    }
}

impl SegmentId {
    pub fn new(source: usize, multi: usize, ring: usize, segment: usize) -> Self {
        SegmentId {
            source,
            multi,
            ring,
            segment,
        }
    }
}

/// How two segments meet at a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Method {
    /// A degenerate segment, kept only on request.
    None,
    /// Both segments pass through the turn point.
    Cross,
    /// Both segments start at the turn point.
    Touch,
    /// One segment starts at the turn point, in the interior of the other.
    TouchInterior,
    /// The segments are identical (possibly reversed).
    Equal,
    /// The segments overlap along a stretch.
    Collinear,
}

/// What a ring does when it leaves a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Operation {
    /// Leaves on the outside of the other ring.
    Union,
    /// Leaves on the inside of the other ring.
    Intersection,
    /// Runs along the other ring in the same direction.
    Continue,
    /// Runs back along the other ring.
    Blocked,
    /// Doesn't leave at all.
    None,
}

/// Where a turn lies on an open linestring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub enum Position {
    /// At its first point.
    Front,
    #[default]
    Middle,
    /// At its last point.
    Back,
}

/// The data attached to a turn operation by enrichment.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct EnrichedInfo {
    /// The number of input polygons covering the left of the outgoing edge.
    pub count_left: usize,
    /// The number of input polygons covering the right of the outgoing edge.
    pub count_right: usize,
    /// The turn at the other end of the outgoing edge.
    pub travels_to_ip_index: Option<usize>,
    /// The first original vertex on the outgoing edge, if it has any.
    pub travels_to_vertex_index: Option<usize>,
    /// The turn at the start of the incoming edge.
    pub travels_from_ip_index: Option<usize>,
    /// The angular rank of the outgoing edge among all the traversable edges
    /// leaving the same point.
    pub rank: Option<usize>,
    /// The connected component of the turn graph.
    pub region_id: Option<usize>,
    /// The outgoing edge comes back to the point it started from.
    pub isolated: bool,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct TurnOperation<F: Float> {
    pub seg_id: SegmentId,
    /// How far along the segment the turn is.
    pub fraction: SegmentRatio<F>,
    pub operation: Operation,
    pub is_collinear: bool,
    pub position: Position,
    pub visited: bool,
    pub enriched: EnrichedInfo,
}

impl<F: Float> TurnOperation<F> {
    pub fn new(seg_id: SegmentId, fraction: SegmentRatio<F>, operation: Operation) -> Self {
        TurnOperation {
            seg_id,
            fraction,
            operation,
            is_collinear: false,
            position: Position::Middle,
            visited: false,
            enriched: EnrichedInfo::default(),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct Turn<F: Float> {
    pub point: Point<F>,
    pub method: Method,
    pub operations: [TurnOperation<F>; 2],
    pub cluster_id: Option<usize>,
    /// Set by enrichment if neither operation starts a piece of the turn graph.
    pub discarded: bool,
    pub is_traversable: bool,
}

impl<F: Float> Turn<F> {
    pub fn new(point: Point<F>, method: Method, operations: [TurnOperation<F>; 2]) -> Self {
        Turn {
            point,
            method,
            operations,
            cluster_id: None,
            discarded: false,
            is_traversable: true,
        }
    }

    /// Do both operations belong to the same input geometry?
    pub fn is_self_turn(&self) -> bool {
        self.operations[0].seg_id.source == self.operations[1].seg_id.source
    }

    pub fn has(&self, op: Operation) -> bool {
        self.operations.iter().any(|o| o.operation == op)
    }
}

/// A set of turns that share a point.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Cluster<F: Float> {
    pub turns: Vec<usize>,
    pub point: Point<F>,
    /// The number of traversable edges leaving the cluster.
    pub open_count: usize,
}

/// An edge of the turn graph touching a cluster, as reported to visitors.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Connection {
    /// The turn owning the edge.
    pub turn: usize,
    /// Which of the turn's operations owns it.
    pub op_index: usize,
    /// Does the edge leave the cluster (or arrive at it)?
    pub outgoing: bool,
    pub rank: Option<usize>,
    pub count_left: usize,
    pub count_right: usize,
}

/// The stages of an overlay at which visitors get to see the turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TurnPhase {
    Classified,
    Enriched,
    Traversed,
}
