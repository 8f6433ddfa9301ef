//! Enrichment: from a bag of classified turns to a graph we can walk.
//!
//! Every areal ring with turns on it is cut into pieces at its turns. A piece
//! runs from one node of the turn graph to the next node along the ring, and
//! is owned by the operation at its start. The region counts on both sides of
//! each piece are computed exactly, and those decide which pieces end up on the
//! boundary of the result, and in which direction.

use std::collections::HashMap;

use malachite::Rational;

use crate::{
    cluster::Nodes,
    equivalence::Equiv,
    exact::{self, cmp_clockwise, same_direction},
    geom::Point,
    num::Float,
    segments::{PreparedRing, RingIdx, RingKind, RingPosition, Rings},
    turn::{Connection, Operation, Turn},
    winding::{coverage, sample_parameters, side_windings},
    OverlayKind,
};

/// A part of a segment, between two exact fractions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubRange {
    pub segment: usize,
    pub from: Rational,
    pub to: Rational,
}

/// Identifies a turn operation: the turn index and the operation index.
pub type OpRef = (usize, usize);

/// The part of a ring between two consecutive nodes.
#[derive(Clone, Debug)]
pub struct Piece<F: Float> {
    pub ring: RingIdx,
    /// The operation at the start of the piece, which owns it.
    pub owner: OpRef,
    /// The owner of the next piece along the ring.
    pub next_owner: OpRef,
    pub from_node: usize,
    pub to_node: usize,
    /// From the start node to the end node, following the ring.
    pub points: Vec<Point<F>>,
    /// The first original vertex on the piece.
    pub first_vertex: Option<usize>,
    /// The non-empty parts of segments making up the piece.
    pub ranges: Vec<SubRange>,
    /// The number of polygons of each source covering each side.
    pub coverage_left: [usize; 2],
    pub coverage_right: [usize; 2],
    /// Did the coverage come from a sample point? If not, the piece is
    /// decided by the classified operation at its start.
    pub sampled: bool,
    /// An earlier piece with exactly the same points.
    pub coincides_with: Option<usize>,
    /// If this piece is on the boundary of the result, whether it's traversed
    /// in its own direction.
    pub forward: Option<bool>,
}

impl<F: Float> Piece<F> {
    /// Does the piece run in a straight line from its start to its end?
    pub fn is_straight(&self, ring: &PreparedRing<F>) -> bool {
        let dir = self.start_direction(ring);
        self.ranges[1..]
            .iter()
            .all(|r| same_direction(&dir, &ring.exact_segment(r.segment).direction()))
    }

    pub fn is_isolated(&self) -> bool {
        self.from_node == self.to_node
    }

    pub fn is_traversable(&self) -> bool {
        self.forward.is_some()
    }

    /// The direction of the piece as it leaves its start node.
    pub fn start_direction(&self, ring: &PreparedRing<F>) -> exact::Vector {
        ring.exact_segment(self.ranges[0].segment).direction()
    }

    /// The direction of the piece as it arrives at its end node.
    pub fn end_direction(&self, ring: &PreparedRing<F>) -> exact::Vector {
        ring.exact_segment(self.ranges[self.ranges.len() - 1].segment)
            .direction()
    }
}

/// The enriched turn graph.
#[derive(Clone, Debug)]
pub struct Graph<F: Float> {
    pub pieces: Vec<Piece<F>>,
    /// For each operation owning a piece, that piece.
    pub piece_of: HashMap<OpRef, usize>,
    /// The areal rings without any turns.
    pub untouched: Vec<RingIdx>,
    /// For each node, the traversable pieces leaving it, in clockwise order
    /// starting from the positive x axis.
    pub out_edges: Vec<Vec<usize>>,
}

#[derive(Clone, Debug)]
struct RingOp {
    op: OpRef,
    pos: RingPosition,
    node: usize,
}

/// Walks `ring` from `from` to `to`, returning the non-empty parts of segments
/// and the vertices passed along the way.
pub fn walk_ring<F: Float>(
    ring: &PreparedRing<F>,
    from: &RingPosition,
    to: &RingPosition,
) -> (Vec<SubRange>, Vec<usize>) {
    let n = ring.num_segments();
    let wraps = to <= from;
    let one = Rational::from(1);
    let mut ranges = Vec::new();
    let mut vertices = Vec::new();
    let mut segment = from.segment;
    let mut t0 = from.fraction.clone();
    let mut steps = 0;
    loop {
        if segment == to.segment && (steps > 0 || !wraps) {
            if to.fraction > t0 {
                ranges.push(SubRange {
                    segment,
                    from: t0,
                    to: to.fraction.clone(),
                });
            }
            break;
        }
        if t0 < one {
            ranges.push(SubRange {
                segment,
                from: t0,
                to: one.clone(),
            });
        }
        segment = (segment + 1) % n;
        t0 = Rational::from(0);
        steps += 1;
        if !(segment == to.segment && to.is_vertex()) {
            vertices.push(segment);
        }
        if steps > n {
            break;
        }
    }
    (ranges, vertices)
}

/// Samples the sides of some sub-ranges, returning the coverage on the left and on the right.
pub fn sample_coverage<F: Float>(
    rings: &Rings<F>,
    ring: &PreparedRing<F>,
    ranges: &[SubRange],
) -> Option<([usize; 2], [usize; 2])> {
    for range in ranges {
        let seg = ring.exact_segment(range.segment);
        for t in sample_parameters() {
            let t = &range.from + (&range.to - &range.from) * t;
            if let Some(w) = side_windings(rings, &seg, &seg.at(&t)) {
                return Some((coverage(rings, &w.left), coverage(rings, &w.right)));
            }
        }
    }
    None
}

/// The whole of a ring without turns, as a list of sub-ranges.
pub fn whole_ring<F: Float>(ring: &PreparedRing<F>) -> Vec<SubRange> {
    (0..ring.num_segments())
        .map(|segment| SubRange {
            segment,
            from: Rational::from(0),
            to: Rational::from(1),
        })
        .collect()
}

/// Which way a piece is on the boundary of the result, judging only by what
/// its ring does at the turn it starts from: `Intersection` if it heads into
/// the other input, `Union` if it heads away from it.
///
/// This ignores any other polygons of either input around the piece, so it is
/// only used for pieces whose sides couldn't be sampled.
fn classified_direction(
    kind: OverlayKind,
    source: usize,
    operation: Operation,
    interior_on_right: bool,
) -> Option<bool> {
    let inside_other = match operation {
        Operation::Intersection => true,
        Operation::Union => false,
        _ => return None,
    };
    let mut inside = [0, 0];
    inside[source] = 1;
    inside[1 - source] = usize::from(inside_other);
    let mut outside = inside;
    outside[source] = 0;
    let (left, right) = if interior_on_right {
        (outside, inside)
    } else {
        (inside, outside)
    };
    let (left, right) = (kind.includes(left), kind.includes(right));
    (left != right).then_some(right)
}

impl<F: Float> Graph<F> {
    /// Cuts the areal rings into pieces, and computes the coverage on each side of every piece.
    pub fn build(turns: &mut [Turn<F>], rings: &Rings<F>, nodes: &Nodes<F>) -> Graph<F> {
        let mut per_ring: Vec<Vec<RingOp>> = vec![Vec::new(); rings.len()];
        for (t, turn) in turns.iter().enumerate() {
            for (k, op) in turn.operations.iter().enumerate() {
                let ring_idx = rings.ring_of(op.seg_id);
                let ring = rings.get(ring_idx);
                if !ring.is_closed() {
                    continue;
                }
                per_ring[ring_idx.0].push(RingOp {
                    op: (t, k),
                    pos: ring.position(op.seg_id.segment, &op.fraction),
                    node: nodes.node_of[t],
                });
            }
        }

        let mut graph = Graph {
            pieces: Vec::new(),
            piece_of: HashMap::new(),
            untouched: Vec::new(),
            out_edges: vec![Vec::new(); nodes.len()],
        };
        for (ring_idx, ring) in rings.iter() {
            if !ring.is_closed() {
                continue;
            }
            let ops = std::mem::take(&mut per_ring[ring_idx.0]);
            if ops.is_empty() {
                graph.untouched.push(ring_idx);
                continue;
            }
            graph.add_ring_pieces(turns, ring_idx, ring, nodes, ops);
        }
        // The rest only repeat what other turns at the same node say.
        for (t, turn) in turns.iter_mut().enumerate() {
            turn.discarded = (0..2).all(|k| !graph.piece_of.contains_key(&(t, k)));
        }

        // Coincident pieces share the same coverage. Only the first of them
        // gets to be on the boundary of the result.
        let mut straight: HashMap<(usize, usize), usize> = HashMap::new();
        for i in 0..graph.pieces.len() {
            let piece = &graph.pieces[i];
            if piece.is_isolated() || !piece.is_straight(rings.get(piece.ring)) {
                continue;
            }
            let key = (
                piece.from_node.min(piece.to_node),
                piece.from_node.max(piece.to_node),
            );
            match straight.get(&key) {
                Some(&first) => graph.pieces[i].coincides_with = Some(first),
                None => {
                    straight.insert(key, i);
                }
            }
        }

        for i in 0..graph.pieces.len() {
            if let Some(first) = graph.pieces[i].coincides_with {
                let (left, right, sampled) = {
                    let first = &graph.pieces[first];
                    // Coincident pieces may run in opposite directions.
                    if first.from_node == graph.pieces[i].from_node {
                        (first.coverage_left, first.coverage_right, first.sampled)
                    } else {
                        (first.coverage_right, first.coverage_left, first.sampled)
                    }
                };
                let piece = &mut graph.pieces[i];
                piece.coverage_left = left;
                piece.coverage_right = right;
                piece.sampled = sampled;
                continue;
            }
            let piece = &graph.pieces[i];
            let ring = rings.get(piece.ring);
            match sample_coverage(rings, ring, &piece.ranges) {
                Some((left, right)) => {
                    let piece = &mut graph.pieces[i];
                    piece.coverage_left = left;
                    piece.coverage_right = right;
                    piece.sampled = true;
                }
                None => log::warn!(
                    "couldn't find a clean sample point on piece {i} of ring {:?}, falling back to its turn",
                    piece.ring
                ),
            }
        }

        for piece in &graph.pieces {
            let (t, k) = piece.owner;
            let enriched = &mut turns[t].operations[k].enriched;
            enriched.count_left = piece.coverage_left.iter().sum();
            enriched.count_right = piece.coverage_right.iter().sum();
            enriched.travels_to_ip_index = Some(piece.next_owner.0);
            enriched.travels_to_vertex_index = piece.first_vertex;
            enriched.isolated = piece.is_isolated();
            let (t, k) = piece.next_owner;
            turns[t].operations[k].enriched.travels_from_ip_index = Some(piece.owner.0);
        }
        log::debug!(
            "{} pieces, {} untouched rings",
            graph.pieces.len(),
            graph.untouched.len()
        );
        graph
    }

    fn add_ring_pieces(
        &mut self,
        turns: &mut [Turn<F>],
        ring_idx: RingIdx,
        ring: &PreparedRing<F>,
        nodes: &Nodes<F>,
        mut ops: Vec<RingOp>,
    ) {
        ops.sort_by(|a, b| (&a.pos, a.op).cmp(&(&b.pos, b.op)));

        // Operations at the same node only share a piece if no vertex lies
        // between them. Otherwise the ring leaves the node and comes back, and
        // the loop in between is a piece of its own.
        let adjacent = |a: &RingOp, b: &RingOp| {
            a.node == b.node && (a.pos == b.pos || walk_ring(ring, &a.pos, &b.pos).1.is_empty())
        };
        let mut groups: Vec<Vec<RingOp>> = Vec::new();
        for op in ops {
            match groups.last_mut() {
                Some(group) if adjacent(&group[group.len() - 1], &op) => group.push(op),
                _ => groups.push(vec![op]),
            }
        }
        if groups.len() > 1 {
            let last = &groups[groups.len() - 1];
            if adjacent(&last[last.len() - 1], &groups[0][0]) {
                if let Some(mut last) = groups.pop() {
                    last.append(&mut groups[0]);
                    groups[0] = last;
                }
            }
        }

        let owners: Vec<OpRef> = groups
            .iter()
            .map(|group| group.iter().map(|op| op.op).min().unwrap_or(group[0].op))
            .collect();
        for (group, owner) in groups.iter().zip(&owners) {
            for op in group {
                if op.op != *owner {
                    let (t, k) = op.op;
                    turns[t].operations[k].operation = Operation::Continue;
                }
            }
        }

        for g in 0..groups.len() {
            let next = (g + 1) % groups.len();
            let (Some(from), Some(to)) = (groups[g].last(), groups[next].first()) else {
                continue;
            };
            let (ranges, vertices) = walk_ring(ring, &from.pos, &to.pos);
            if ranges.is_empty() {
                log::debug!("empty piece on ring {ring_idx:?} at {:?}", from.pos);
                continue;
            }
            let mut points = Vec::with_capacity(vertices.len() + 2);
            points.push(nodes.points[from.node].clone());
            points.extend(vertices.iter().map(|&v| ring.point(v).clone()));
            points.push(nodes.points[to.node].clone());
            points.dedup();

            self.piece_of.insert(owners[g], self.pieces.len());
            self.pieces.push(Piece {
                ring: ring_idx,
                owner: owners[g],
                next_owner: owners[next],
                from_node: from.node,
                to_node: to.node,
                points,
                first_vertex: vertices.first().copied(),
                ranges,
                coverage_left: [0, 0],
                coverage_right: [0, 0],
                sampled: false,
                coincides_with: None,
                forward: None,
            });
        }
    }

    /// Decides which pieces are on the boundary of the result of `kind`, and
    /// sets the operations, ranks, and regions of the turns accordingly.
    pub fn assign(
        &mut self,
        kind: OverlayKind,
        turns: &mut [Turn<F>],
        rings: &Rings<F>,
        nodes: &mut Nodes<F>,
    ) {
        for piece in &mut self.pieces {
            let (t, k) = piece.owner;
            if piece.coincides_with.is_some() {
                turns[t].operations[k].operation = Operation::Continue;
                continue;
            }
            let ring = rings.get(piece.ring);
            let classified = match ring.kind {
                RingKind::Areal { interior_on_right } if !turns[t].is_self_turn() => {
                    let op = turns[t].operations[k].operation;
                    classified_direction(kind, ring.id.source, op, interior_on_right)
                }
                _ => None,
            };
            piece.forward = if piece.sampled {
                let left = kind.includes(piece.coverage_left);
                let right = kind.includes(piece.coverage_right);
                let sampled = (left != right).then_some(right);
                // Other polygons around the turn can legitimately disagree.
                if classified.is_some() && classified != sampled {
                    log::debug!(
                        "turn {t} says {classified:?} but the sides of its piece say {sampled:?}"
                    );
                }
                sampled
            } else {
                classified
            };
            turns[t].operations[k].operation = if piece.forward.is_some() {
                kind.target()
            } else {
                Operation::Blocked
            };
        }

        // Sort the traversable edges around every node.
        let mut outgoing: Vec<Vec<(usize, exact::Vector)>> = vec![Vec::new(); nodes.len()];
        for (i, piece) in self.pieces.iter().enumerate() {
            let ring = rings.get(piece.ring);
            match piece.forward {
                Some(true) => outgoing[piece.from_node].push((i, piece.start_direction(ring))),
                Some(false) => {
                    outgoing[piece.to_node].push((i, piece.end_direction(ring).reversed()))
                }
                None => {}
            }
        }
        let east = exact::Vector::east();
        for (node, edges) in outgoing.iter_mut().enumerate() {
            edges.sort_by(|a, b| cmp_clockwise(&east, &a.1, &b.1));
            let mut tied = vec![false; edges.len()];
            for j in 1..edges.len() {
                if cmp_clockwise(&east, &edges[j - 1].1, &edges[j].1).is_eq() {
                    tied[j - 1] = true;
                    tied[j] = true;
                }
            }
            if tied.iter().any(|&x| x) {
                log::warn!(
                    "inconsistent node {node} at {:?}: edges leave in the same direction",
                    nodes.points[node]
                );
            }
            let mut kept = Vec::with_capacity(edges.len());
            for ((piece_idx, _), tied) in edges.iter().zip(tied) {
                let piece = &mut self.pieces[*piece_idx];
                let (t, k) = piece.owner;
                if tied {
                    piece.forward = None;
                    turns[t].operations[k].operation = Operation::Blocked;
                } else {
                    turns[t].operations[k].enriched.rank = Some(kept.len());
                    kept.push(*piece_idx);
                }
            }
            self.out_edges[node] = kept;
        }

        let mut regions = Equiv::new(nodes.len());
        for piece in &self.pieces {
            regions.add_equivalence(piece.from_node, piece.to_node);
        }
        let mut region_of = vec![0; nodes.len()];
        for (region, class) in regions.equivalences().into_iter().enumerate() {
            for node in class {
                region_of[node] = region;
            }
        }
        for (t, turn) in turns.iter_mut().enumerate() {
            let node = nodes.node_of[t];
            for op in &mut turn.operations {
                op.enriched.region_id = Some(region_of[node]);
            }
            turn.is_traversable = !self.out_edges[node].is_empty();
        }
        for (node, cluster) in nodes.cluster_of.iter().enumerate() {
            if let Some(c) = cluster {
                nodes.clusters[*c].open_count = self.out_edges[node].len();
            }
        }
    }

    /// The traversable edges touching a node.
    pub fn connections(&self, node: usize, turns: &[Turn<F>]) -> Vec<Connection> {
        let mut ret = Vec::new();
        for (i, piece) in self.pieces.iter().enumerate() {
            let Some(forward) = piece.forward else {
                continue;
            };
            let (start, end) = if forward {
                (piece.from_node, piece.to_node)
            } else {
                (piece.to_node, piece.from_node)
            };
            for (outgoing, n) in [(true, start), (false, end)] {
                if n != node {
                    continue;
                }
                let (t, k) = piece.owner;
                let enriched = &turns[t].operations[k].enriched;
                ret.push(Connection {
                    turn: t,
                    op_index: k,
                    outgoing,
                    rank: if outgoing { enriched.rank } else { None },
                    count_left: enriched.count_left,
                    count_right: enriched.count_right,
                });
                debug_assert_eq!(self.piece_of.get(&(t, k)), Some(&i));
            }
        }
        ret
    }
}
