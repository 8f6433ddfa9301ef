//! Walking the enriched turn graph to produce rings.

use std::collections::HashMap;

use crate::{
    enrich::{Graph, Piece},
    exact::{self, cmp_clockwise},
    geom::Point,
    num::Float,
    segments::Rings,
    turn::{SegmentId, Turn},
};

/// Where an output ring came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum RingOrigin {
    /// The `n`th walk of the turn graph.
    Traversed(usize),
    /// An input ring without turns, identified by its first segment.
    Original(SegmentId),
}

/// A ring produced by traversal or selection, not yet nested into polygons.
///
/// The points are open (the first point isn't repeated), and the interior of
/// the result is on the right.
#[derive(Clone, Debug)]
pub struct TraversedRing<F: Float> {
    pub points: Vec<Point<F>>,
    pub origin: RingOrigin,
}

struct Walker<'a, F: Float> {
    graph: &'a Graph<F>,
    rings: &'a Rings<F>,
}

impl<F: Float> Walker<'_, F> {
    fn piece(&self, edge: usize) -> &Piece<F> {
        &self.graph.pieces[edge]
    }

    fn forward(&self, edge: usize) -> bool {
        self.piece(edge).forward.unwrap_or(true)
    }

    fn start_node(&self, edge: usize) -> usize {
        let piece = self.piece(edge);
        if self.forward(edge) {
            piece.from_node
        } else {
            piece.to_node
        }
    }

    fn end_node(&self, edge: usize) -> usize {
        let piece = self.piece(edge);
        if self.forward(edge) {
            piece.to_node
        } else {
            piece.from_node
        }
    }

    /// The direction the edge leaves its start node in.
    fn leaving(&self, edge: usize) -> exact::Vector {
        let piece = self.piece(edge);
        let ring = self.rings.get(piece.ring);
        if self.forward(edge) {
            piece.start_direction(ring)
        } else {
            piece.end_direction(ring).reversed()
        }
    }

    /// The direction the edge arrives at its end node in.
    fn arriving(&self, edge: usize) -> exact::Vector {
        let piece = self.piece(edge);
        let ring = self.rings.get(piece.ring);
        if self.forward(edge) {
            piece.end_direction(ring)
        } else {
            piece.start_direction(ring).reversed()
        }
    }

    /// Chooses the edge to take after arriving along `edge`: the first one
    /// counter-clockwise from the way we came in.
    fn next(&self, edge: usize) -> Option<usize> {
        let back = self.arriving(edge).reversed();
        self.graph.out_edges[self.end_node(edge)]
            .iter()
            .map(|&e| (e, self.leaving(e)))
            .max_by(|a, b| cmp_clockwise(&back, &a.1, &b.1))
            .map(|(e, _)| e)
    }

    fn points(&self, edges: &[usize]) -> Vec<Point<F>> {
        let mut ret: Vec<Point<F>> = Vec::new();
        for &e in edges {
            let piece = self.piece(e);
            let oriented: Box<dyn Iterator<Item = &Point<F>>> = if self.forward(e) {
                Box::new(piece.points.iter())
            } else {
                Box::new(piece.points.iter().rev())
            };
            for p in oriented {
                if ret.last() != Some(p) {
                    ret.push(p.clone());
                }
            }
        }
        if ret.len() > 1 && ret.first() == ret.last() {
            ret.pop();
        }
        ret
    }
}

/// Walks every traversable edge of the graph exactly once, producing rings
/// with the result on their right.
///
/// Walks that don't close are discarded, with a warning.
pub fn traverse<F: Float>(
    graph: &Graph<F>,
    turns: &mut [Turn<F>],
    rings: &Rings<F>,
) -> Vec<TraversedRing<F>> {
    let walker = Walker { graph, rings };
    let mut visited = vec![false; graph.pieces.len()];
    let mut out: Vec<Vec<usize>> = Vec::new();
    let mut walks = 0;

    for t in 0..turns.len() {
        for k in 0..2 {
            let Some(&start) = graph.piece_of.get(&(t, k)) else {
                continue;
            };
            if visited[start] || !graph.pieces[start].is_traversable() {
                continue;
            }
            walks += 1;
            visited[start] = true;

            let mut edges = vec![start];
            // For every node on the current walk, the index of the edge leaving it.
            let mut leaving_at: HashMap<usize, usize> = HashMap::new();
            leaving_at.insert(walker.start_node(start), 0);
            let mut current = start;
            let mut steps = 0;
            loop {
                steps += 1;
                if steps > graph.pieces.len() + 1 {
                    log::warn!("walk from turn {t} doesn't terminate, discarding it");
                    break;
                }
                let node = walker.end_node(current);
                let Some(next) = walker.next(current) else {
                    log::warn!("walk from turn {t} reached a dead end at node {node}");
                    break;
                };
                if next == start {
                    out.push(edges);
                    break;
                }
                if visited[next] {
                    log::warn!("walk from turn {t} ran into a visited edge at node {node}");
                    break;
                }
                if let Some(&j) = leaving_at.get(&node) {
                    // We've been here before on this walk: split off the loop.
                    let looped = edges.split_off(j);
                    for &e in &looped {
                        leaving_at.remove(&walker.start_node(e));
                    }
                    out.push(looped);
                }
                leaving_at.insert(node, edges.len());
                edges.push(next);
                visited[next] = true;
                current = next;
            }
        }
    }

    let mut ret = Vec::with_capacity(out.len());
    for (i, edges) in out.into_iter().enumerate() {
        for &e in &edges {
            let (t, k) = graph.pieces[e].owner;
            turns[t].operations[k].visited = true;
        }
        ret.push(TraversedRing {
            points: walker.points(&edges),
            origin: RingOrigin::Traversed(i),
        });
    }
    log::debug!("{walks} walks produced {} rings", ret.len());
    ret
}
