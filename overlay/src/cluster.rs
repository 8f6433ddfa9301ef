//! Merging turns that share a point.
//!
//! Two turns end up in the same node if their points are within the
//! clustering tolerance of one another, or if they lie at the same position
//! on the same ring. Nodes with more than one turn are clusters.

use std::collections::HashMap;

use crate::{
    equivalence::Equiv,
    geom::Point,
    num::Float,
    segments::{RingIdx, RingPosition, Rings},
    turn::{Cluster, Turn},
};

/// The nodes of the turn graph.
#[derive(Clone, Debug)]
pub struct Nodes<F: Float> {
    /// For each turn, the node it belongs to.
    pub node_of: Vec<usize>,
    /// For each node, its point.
    pub points: Vec<Point<F>>,
    /// For each node, its turns in increasing order.
    pub turns: Vec<Vec<usize>>,
    /// For each node, its cluster if it has more than one turn.
    pub cluster_of: Vec<Option<usize>>,
    pub clusters: Vec<Cluster<F>>,
}

impl<F: Float> Nodes<F> {
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

fn within<F: Float>(a: &F, b: &F, tolerance: &F) -> bool {
    let diff = if a < b {
        b.clone() - a
    } else {
        a.clone() - b
    };
    diff <= *tolerance
}

/// Groups turns into nodes, and snaps each cluster to a single point.
///
/// The point of a cluster is the point of its first turn lying exactly on an
/// input vertex, or of its first turn if there is none.
pub fn cluster_turns<F: Float>(turns: &mut [Turn<F>], rings: &Rings<F>, tolerance: &F) -> Nodes<F> {
    let mut equiv = Equiv::new(turns.len());

    let mut by_x: Vec<usize> = (0..turns.len()).collect();
    by_x.sort_by(|&i, &j| {
        (&turns[i].point.x, &turns[i].point.y, i).cmp(&(&turns[j].point.x, &turns[j].point.y, j))
    });
    for (k, &i) in by_x.iter().enumerate() {
        for &j in &by_x[(k + 1)..] {
            if !within(&turns[i].point.x, &turns[j].point.x, tolerance) {
                break;
            }
            if within(&turns[i].point.y, &turns[j].point.y, tolerance) {
                equiv.add_equivalence(i, j);
            }
        }
    }

    let mut by_position: HashMap<(RingIdx, RingPosition), usize> = HashMap::new();
    for (t, turn) in turns.iter().enumerate() {
        for op in &turn.operations {
            let ring = rings.ring_of(op.seg_id);
            let pos = rings.get(ring).position(op.seg_id.segment, &op.fraction);
            match by_position.get(&(ring, pos.clone())) {
                Some(&other) => equiv.add_equivalence(other, t),
                None => {
                    by_position.insert((ring, pos), t);
                }
            }
        }
    }

    let on_vertex = |turn: &Turn<F>| {
        turn.operations
            .iter()
            .any(|op| op.fraction.is_zero() || op.fraction.is_one())
    };

    let classes = equiv.equivalences();
    let mut nodes = Nodes {
        node_of: vec![0; turns.len()],
        points: Vec::with_capacity(classes.len()),
        turns: Vec::with_capacity(classes.len()),
        cluster_of: Vec::with_capacity(classes.len()),
        clusters: Vec::new(),
    };
    for (node, class) in classes.into_iter().enumerate() {
        let rep = class
            .iter()
            .copied()
            .find(|&t| on_vertex(&turns[t]))
            .unwrap_or(class[0]);
        let point = turns[rep].point.clone();
        for &t in &class {
            nodes.node_of[t] = node;
        }
        if class.len() > 1 {
            let cluster_id = nodes.clusters.len();
            for &t in &class {
                turns[t].point = point.clone();
                turns[t].cluster_id = Some(cluster_id);
            }
            nodes.clusters.push(Cluster {
                turns: class.clone(),
                point: point.clone(),
                open_count: 0,
            });
            nodes.cluster_of.push(Some(cluster_id));
        } else {
            nodes.cluster_of.push(None);
        }
        nodes.points.push(point);
        nodes.turns.push(class);
    }
    log::debug!(
        "{} turns in {} nodes, {} clusters",
        turns.len(),
        nodes.len(),
        nodes.clusters.len()
    );
    nodes
}
